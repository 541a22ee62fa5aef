mod api_types;
mod calorie_mama;
mod dto;
mod error;
pub mod handlers;
mod mock;
mod openai;
mod result;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use base64ct::{Base64, Encoding};
use bytes::Bytes;

use crate::config::{AnalysisConfig, AnalysisService};
use crate::state::AppState;

pub use calorie_mama::CalorieMamaAnalyzer;
pub use error::AnalysisError;
pub use mock::MockAnalyzer;
pub use openai::OpenAiAnalyzer;
pub use result::AnalysisResult;

/// Raw photo bytes handed to a provider.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub body: Bytes,
    pub content_type: String,
}

impl ImagePayload {
    pub fn new(body: Bytes, content_type: Option<&str>) -> Self {
        Self {
            body,
            content_type: content_type.unwrap_or("image/jpeg").to_string(),
        }
    }

    pub fn to_base64(&self) -> String {
        Base64::encode_string(&self.body)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.to_base64())
    }
}

/// A vision backend that turns a food photo into a nutrition estimate.
#[async_trait]
pub trait FoodAnalyzer: Send + Sync {
    fn name(&self) -> &'static str;
    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError>;
}

/// Build the analyzer selected in config. Only `mock` ever returns sample data.
pub fn from_config(cfg: &AnalysisConfig) -> anyhow::Result<Arc<dyn FoodAnalyzer>> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let analyzer: Arc<dyn FoodAnalyzer> = match cfg.service {
        AnalysisService::OpenAi => Arc::new(OpenAiAnalyzer::new(cfg.openai.clone(), timeout)?),
        AnalysisService::CalorieMama => {
            Arc::new(CalorieMamaAnalyzer::new(cfg.calorie_mama.clone(), timeout)?)
        }
        AnalysisService::Mock => Arc::new(MockAnalyzer::new(Duration::from_millis(cfg.mock_delay_ms))),
    };
    Ok(analyzer)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::analyze_routes())
        .merge(handlers::service_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_defaults_to_jpeg() {
        let p = ImagePayload::new(Bytes::from_static(b"abc"), None);
        assert_eq!(p.content_type, "image/jpeg");
        assert_eq!(p.to_base64(), "YWJj");
        assert_eq!(p.to_data_url(), "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn builds_selected_analyzer() {
        let mut cfg = crate::config::test_config().analysis;
        assert_eq!(from_config(&cfg).unwrap().name(), "mock");
        cfg.service = AnalysisService::OpenAi;
        assert_eq!(from_config(&cfg).unwrap().name(), "openai");
        cfg.service = AnalysisService::CalorieMama;
        assert_eq!(from_config(&cfg).unwrap().name(), "calorie_mama");
    }
}
