mod config;

pub use config::{Config, FeedConfig, LoggingConfig, RedemptionConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the directory holding `config.toml`, creating it if needed.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Where `config.toml` lives, without touching the filesystem.
///
/// `REELFEED_CONFIG_DIR` wins when set. Otherwise `~/.config/reelfeed[-dev]/`
/// based on `REELFEED_ENV` (set `REELFEED_ENV=dev` for the development dir).
pub(crate) fn config_dir() -> PathBuf {
    match std::env::var_os("REELFEED_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("REELFEED_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("reelfeed-dev")
            } else {
                base_dir.join("reelfeed")
            }
        }
    }
}
