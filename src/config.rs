use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisService {
    #[serde(rename = "openai")]
    OpenAi,
    CalorieMama,
    Mock,
}

impl AnalysisService {
    pub const ALL: [Self; 3] = [Self::OpenAi, Self::CalorieMama, Self::Mock];

    pub fn key(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::CalorieMama => "calorie_mama",
            Self::Mock => "mock",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI Vision",
            Self::CalorieMama => "Calorie Mama",
            Self::Mock => "Sample data",
        }
    }
}

impl FromStr for AnalysisService {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "calorie_mama" | "caloriemama" => Ok(Self::CalorieMama),
            "mock" => Ok(Self::Mock),
            other => anyhow::bail!("unknown AI_SERVICE {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalorieMamaConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub service: AnalysisService,
    pub timeout_secs: u64,
    pub mock_delay_ms: u64,
    pub openai: OpenAiConfig,
    pub calorie_mama: CalorieMamaConfig,
}

impl AnalysisConfig {
    pub fn has_credentials(&self, service: AnalysisService) -> bool {
        match service {
            AnalysisService::OpenAi => self.openai.api_key.is_some(),
            AnalysisService::CalorieMama => self.calorie_mama.api_key.is_some(),
            AnalysisService::Mock => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub storage: StorageBackend,
    pub environment: String,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://snackulator.db?mode=rwc".into());
        let storage = std::env::var("STORAGE_BACKEND")
            .ok()
            .map(|v| v.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Sqlite);
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let service = std::env::var("AI_SERVICE")
            .ok()
            .map(|v| v.parse::<AnalysisService>())
            .transpose()?
            .unwrap_or(AnalysisService::OpenAi);

        let analysis = AnalysisConfig {
            service,
            timeout_secs: env_number("ANALYSIS_TIMEOUT_SECS").unwrap_or(30),
            mock_delay_ms: env_number("MOCK_DELAY_MS").unwrap_or(2000),
            openai: OpenAiConfig {
                api_url: std::env::var("OPENAI_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".into()),
                api_key: api_key_from_env("OPENAI_API_KEY"),
                model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
                max_tokens: env_number("OPENAI_MAX_TOKENS").unwrap_or(500),
            },
            calorie_mama: CalorieMamaConfig {
                api_url: std::env::var("CALORIE_MAMA_API_URL")
                    .unwrap_or_else(|_| "https://api.caloriemama.ai/v1/analyze".into()),
                api_key: api_key_from_env("CALORIE_MAMA_API_KEY"),
            },
        };

        Ok(Self {
            database_url,
            storage,
            environment,
            analysis,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Non-fatal problems worth logging at startup.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let service = self.analysis.service;
        if !self.analysis.has_credentials(service) {
            warnings.push(format!(
                "{} API key not configured; photo analysis will fail until it is set",
                service.display_name()
            ));
        }
        if self.is_production() && service == AnalysisService::Mock {
            warnings.push("production environment is serving sample analysis data".into());
        }
        warnings
    }
}

fn env_number<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

fn api_key_from_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| normalize_api_key(&v))
}

/// Blank keys and "your-...-here" placeholders count as missing.
pub(crate) fn normalize_api_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.is_empty() || (key.starts_with("your-") && key.ends_with("-here")) {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        storage: StorageBackend::Memory,
        environment: "development".into(),
        analysis: AnalysisConfig {
            service: AnalysisService::Mock,
            timeout_secs: 5,
            mock_delay_ms: 0,
            openai: OpenAiConfig {
                api_url: "http://127.0.0.1:9/v1/chat/completions".into(),
                api_key: None,
                model: "gpt-4o-mini".into(),
                max_tokens: 500,
            },
            calorie_mama: CalorieMamaConfig {
                api_url: "http://127.0.0.1:9/v1/analyze".into(),
                api_key: None,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_keys_are_missing() {
        assert_eq!(normalize_api_key("your-openai-api-key-here"), None);
        assert_eq!(normalize_api_key("   "), None);
        assert_eq!(normalize_api_key(" sk-abc "), Some("sk-abc".into()));
    }

    #[test]
    fn service_names_parse() {
        assert_eq!("OpenAI".parse::<AnalysisService>().unwrap(), AnalysisService::OpenAi);
        assert_eq!("calorie_mama".parse::<AnalysisService>().unwrap(), AnalysisService::CalorieMama);
        assert_eq!("mock".parse::<AnalysisService>().unwrap(), AnalysisService::Mock);
        assert!("google_vision".parse::<AnalysisService>().is_err());
        for s in AnalysisService::ALL {
            assert_eq!(s.key().parse::<AnalysisService>().unwrap(), s);
        }
    }

    #[test]
    fn storage_backend_parses() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn validate_warns_about_missing_key_and_mock_in_production() {
        let mut cfg = test_config();
        assert!(cfg.validate().is_empty());

        cfg.environment = "production".into();
        assert_eq!(cfg.validate().len(), 1);

        cfg.analysis.service = AnalysisService::OpenAi;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("OpenAI"));

        cfg.analysis.openai.api_key = Some("sk-test".into());
        assert!(cfg.validate().is_empty());
    }
}
