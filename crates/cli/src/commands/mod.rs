pub mod chat;
pub mod doctor;
pub mod gateway;
pub mod init;
pub mod status;

use anyhow::Context;
use tidewater_config::AppConfig;

/// Load `~/.tidewater/config.toml` with environment overrides applied.
pub fn load_config() -> anyhow::Result<AppConfig> {
    AppConfig::load().context("Failed to load config")
}
