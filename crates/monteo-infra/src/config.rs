//! Server configuration loader.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`ServerConfig`]. Falls back to sensible defaults when the file is
//! missing or malformed.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration from `{data_dir}/config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Endpoint receiving status change events (SMS/e-mail gateway).
    pub notification_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8085,
            notification_url: None,
        }
    }
}

/// Resolve the data directory: `MONTEO_DATA_DIR` env var, falling back to
/// `~/.monteo`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MONTEO_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".monteo")
}

/// Load server configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns defaults.
/// - Unreadable or malformed file: logs a warning and returns defaults.
pub async fn load_config(data_dir: &Path) -> ServerConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config.toml at {}, using defaults", config_path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", config_path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("failed to parse {}: {err}, using defaults", config_path.display());
            ServerConfig::default()
        }
    }
}
