//! Error types for vision analysis.

use axum::http::StatusCode;
use thiserror::Error;

/// Why an analysis produced no result. None of these create a ledger entry.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No usable credentials for the selected provider.
    #[error("{provider} API key not configured")]
    NotConfigured { provider: &'static str },

    /// The provider rejected our credentials.
    #[error("{provider} rejected the API key")]
    InvalidCredentials { provider: &'static str },

    /// The provider asked us to slow down.
    #[error("{provider} rate limit exceeded, try again later")]
    RateLimited { provider: &'static str },

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("provider error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The provider answered but we could not read a nutrition estimate.
    #[error("unreadable analysis: {0}")]
    InvalidResponse(String),
}

impl AnalysisError {
    /// Whether the same request may succeed if the user simply tries again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotConfigured { .. } | Self::InvalidCredentials { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Network(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidCredentials { .. } | Self::Upstream { .. } | Self::InvalidResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability() {
        assert!(!AnalysisError::NotConfigured { provider: "OpenAI" }.is_retryable());
        assert!(!AnalysisError::InvalidCredentials { provider: "OpenAI" }.is_retryable());
        assert!(AnalysisError::RateLimited { provider: "OpenAI" }.is_retryable());
        assert!(AnalysisError::Network("reset".into()).is_retryable());
        assert!(AnalysisError::InvalidResponse("junk".into()).is_retryable());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            AnalysisError::RateLimited { provider: "x" }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AnalysisError::NotConfigured { provider: "x" }.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AnalysisError::Upstream { status: 500, message: "boom".into() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn messages_name_the_provider() {
        let msg = AnalysisError::NotConfigured { provider: "OpenAI" }.to_string();
        assert_eq!(msg, "OpenAI API key not configured");
    }
}
