use serde::{Deserialize, Serialize};

/// JSON alternative to the multipart upload.
#[derive(Debug, Deserialize)]
pub struct AnalyzeBase64Request {
    /// Plain base64, or a full `data:<type>;base64,...` URL.
    pub image_b64: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub key: &'static str,
    pub name: &'static str,
    pub configured: bool,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct ServicesResponse {
    pub active: &'static str,
    pub services: Vec<ServiceStatus>,
}
