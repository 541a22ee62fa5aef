use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};

use super::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::result::strip_code_fences;
use super::{AnalysisError, AnalysisResult, FoodAnalyzer, ImagePayload};
use crate::config::OpenAiConfig;

const PROVIDER: &str = "OpenAI";
const DEFAULT_CONFIDENCE: f64 = 0.8;

pub(crate) const NUTRITION_PROMPT: &str = r#"You are an expert nutritionist with strong food recognition skills. Analyze this food image step by step.

1. IDENTIFY the specific food item(s) from colour, shape, texture, cooking method, visible ingredients and context (plate, packaging, utensils).
2. ESTIMATE the portion from visual cues such as plate size or utensils; fall back to typical home or restaurant servings.
3. ANALYZE the nutrition of that portion.

Be precise: a banana is "Banana", not "Apple". If several foods are visible, report combined totals. Prefer conservative estimates.

Reply with ONLY this JSON object and no other text:
{"foodName": "specific name", "calories": integer, "protein": "Xg", "carbs": "Xg", "fat": "Xg", "fiber": "Xg", "sugar": "Xg", "confidence": 0.0 to 1.0}

Example for a medium apple:
{"foodName":"Medium Apple","calories":95,"protein":"0.5g","carbs":"25g","fat":"0.3g","fiber":"4g","sugar":"19g","confidence":0.9}"#;

/// Chat-completions vision analyzer.
pub struct OpenAiAnalyzer {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiAnalyzer {
    pub fn new(config: OpenAiConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        info!(model = %config.model, configured = config.api_key.is_some(), "OpenAI analyzer ready");
        Ok(Self { client, config })
    }
}

#[async_trait]
impl FoodAnalyzer for OpenAiAnalyzer {
    fn name(&self) -> &'static str {
        "openai"
    }

    #[instrument(skip(self, image), fields(bytes = image.body.len()))]
    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AnalysisError::NotConfigured { provider: PROVIDER })?;

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user_with_image(NUTRITION_PROMPT, image.to_data_url())],
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_failure(status, &body);
            warn!(status = status.as_u16(), error = %err, "OpenAI analysis failed");
            return Err(err);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
        let result = parse_completion(&completion)?;
        debug!(food = %result.food_name, calories = result.calories, "OpenAI analysis done");
        Ok(result)
    }
}

pub(crate) fn classify_failure(status: StatusCode, body: &str) -> AnalysisError {
    match status {
        StatusCode::UNAUTHORIZED => AnalysisError::InvalidCredentials { provider: PROVIDER },
        StatusCode::TOO_MANY_REQUESTS => AnalysisError::RateLimited { provider: PROVIDER },
        _ => {
            let message = serde_json::from_str::<ApiError>(body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.to_string());
            AnalysisError::Upstream {
                status: status.as_u16(),
                message,
            }
        }
    }
}

pub(crate) fn parse_completion(
    completion: &ChatCompletionResponse,
) -> Result<AnalysisResult, AnalysisError> {
    let content = completion
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .ok_or_else(|| AnalysisError::InvalidResponse("empty completion".into()))?;
    let raw: serde_json::Value = serde_json::from_str(strip_code_fences(content))
        .map_err(|e| AnalysisError::InvalidResponse(format!("reply was not JSON: {e}")))?;
    AnalysisResult::from_provider_json(&raw, DEFAULT_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use bytes::Bytes;

    fn completion(content: &str) -> ChatCompletionResponse {
        let body = serde_json::json!({"choices":[{"message":{"role":"assistant","content":content}}]});
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn parses_fenced_reply() {
        let c = completion(
            "```json\n{\"foodName\":\"Hot Dog\",\"calories\":290,\"protein\":\"10g\",\"carbs\":\"24g\",\"fat\":\"17g\",\"fiber\":\"1g\",\"sugar\":\"4g\",\"confidence\":0.88}\n```",
        );
        let r = parse_completion(&c).unwrap();
        assert_eq!(r.food_name, "Hot Dog");
        assert_eq!(r.calories, 290);
        assert_eq!(r.fat, "17g");
    }

    #[test]
    fn prose_reply_is_invalid() {
        let c = completion("I think this is a sandwich.");
        assert!(matches!(parse_completion(&c), Err(AnalysisError::InvalidResponse(_))));
    }

    #[test]
    fn no_choices_is_invalid() {
        let c: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(parse_completion(&c), Err(AnalysisError::InvalidResponse(_))));
    }

    #[test]
    fn failures_are_classified() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            AnalysisError::InvalidCredentials { .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            AnalysisError::RateLimited { .. }
        ));
        match classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"image too large"}}"#,
        ) {
            AnalysisError::Upstream { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "image too large");
            }
            other => panic!("unexpected {other:?}"),
        }
        match classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "oops") {
            AnalysisError::Upstream { message, .. } => assert_eq!(message, "oops"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let cfg = test_config().analysis.openai;
        let analyzer = OpenAiAnalyzer::new(cfg, Duration::from_secs(1)).unwrap();
        let err = analyzer
            .analyze(ImagePayload::new(Bytes::from_static(b"\xff\xd8"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NotConfigured { provider: "OpenAI" }));
    }
}
