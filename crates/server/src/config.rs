use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::notifications::models::WebhookConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Optional alert delivery channel. Unset means fired alerts are
    /// persisted but not dispatched.
    pub webhook: Option<WebhookConfig>,
}

// Partial config for layering; environment variables override the file.
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    database_url: Option<String>,
    log_dir: Option<String>,
    webhook: Option<WebhookConfig>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite:argus.db".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)?;
                toml::from_str(&contents)?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Merge: environment overrides file, file overrides defaults
        let webhook = match (env::var("WEBHOOK_URL").ok(), file_config.webhook) {
            (Some(url), Some(mut webhook)) => {
                webhook.url = url;
                Some(webhook)
            }
            (Some(url), None) => Some(WebhookConfig {
                url,
                body_template: None,
            }),
            (None, webhook) => webhook,
        };

        Ok(ServerConfig {
            listen_addr: env::var("LISTEN_ADDR")
                .ok()
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            database_url: env::var("DATABASE_URL")
                .ok()
                .or(file_config.database_url)
                .unwrap_or_else(default_database_url),
            log_dir: env::var("LOG_DIR")
                .ok()
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            webhook,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = ServerConfig::load(Some("/nonexistent/argus.toml")).unwrap();
        assert_eq!(config.log_dir, default_log_dir());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "listen_addr = \"127.0.0.1:9000\"\n\n[webhook]\nurl = \"https://example.com/hook\""
        )
        .unwrap();

        let config = ServerConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.webhook.unwrap().url, "https://example.com/hook");
    }
}
