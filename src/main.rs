mod analysis;
mod app;
mod clock;
mod config;
mod db;
mod ledger;
mod logging;
mod profile;
mod state;
mod storage;


use crate::logging::LoggingConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    LoggingConfig::from_env().init();

    let state = AppState::init().await?;
    let config = &state.config;
    for warning in config.validate() {
        tracing::warn!("{warning}");
    }
    tracing::info!(
        env = %config.environment,
        storage = ?config.storage,
        analyzer = state.analyzer.name(),
        "starting snackulator"
    );

    app::serve(app::build_app(state)).await
}
