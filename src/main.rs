use anyhow::Result;

use modboard::config::AppConfig;
use modboard::module::updater::StatusUpdater;

const DEFAULT_CONFIG_PATH: &str = "modboard.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("MODBOARD_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_or_default(&config_path)?;

    let _logging_guard = modboard::logging::init_logging("logs", "modboard", &config.log_level);

    tracing::info!("Mod status board updater starting...");
    tracing::info!("State file: {}", config.state_file);

    let updater = StatusUpdater::new(config)?;
    updater.run().await?;

    tracing::info!("Update cycle complete");
    Ok(())
}
