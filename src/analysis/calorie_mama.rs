use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use super::api_types::CalorieMamaRequest;
use super::{AnalysisError, AnalysisResult, FoodAnalyzer, ImagePayload};
use crate::config::CalorieMamaConfig;

const PROVIDER: &str = "Calorie Mama";
const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Food-recognition API that answers with flat numeric nutrition fields.
pub struct CalorieMamaAnalyzer {
    client: Client,
    config: CalorieMamaConfig,
}

impl CalorieMamaAnalyzer {
    pub fn new(config: CalorieMamaConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl FoodAnalyzer for CalorieMamaAnalyzer {
    fn name(&self) -> &'static str {
        "calorie_mama"
    }

    #[instrument(skip(self, image), fields(bytes = image.body.len()))]
    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AnalysisError::NotConfigured { provider: PROVIDER })?;

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&CalorieMamaRequest { image: image.to_base64() })
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AnalysisError::InvalidCredentials { provider: PROVIDER })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(AnalysisError::RateLimited { provider: PROVIDER })
            }
            s if !s.is_success() => {
                let message = response.text().await.unwrap_or_default();
                warn!(status = s.as_u16(), "Calorie Mama analysis failed");
                return Err(AnalysisError::Upstream {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
        let result = AnalysisResult::from_provider_json(&raw, DEFAULT_CONFIDENCE)?;
        debug!(food = %result.food_name, calories = result.calories, "Calorie Mama analysis done");
        Ok(result)
    }
}
