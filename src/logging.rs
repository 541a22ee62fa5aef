use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "snackulator=debug,axum=info,tower_http=info";

/// Dependencies that are chatty at debug and rarely useful here.
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "reqwest=warn", "sqlx=warn"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// `RUST_LOG` and `LOG_FORMAT` (`json` or anything else for human output).
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("RUST_LOG").ok(),
            std::env::var("LOG_FORMAT").ok(),
        )
    }

    fn from_vars(rust_log: Option<String>, log_format: Option<String>) -> Self {
        let filter = rust_log
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let format = match log_format.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        Self { filter, format }
    }

    fn env_filter(&self) -> EnvFilter {
        QUIET_TARGETS
            .iter()
            .filter_map(|d| d.parse::<Directive>().ok())
            .fold(EnvFilter::new(&self.filter), EnvFilter::add_directive)
    }

    pub fn init(&self) {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        match self.format {
            LogFormat::Json => registry.with(fmt::layer().with_target(false).json()).init(),
            LogFormat::Pretty => registry.with(fmt::layer()).init(),
        }
    }
}
