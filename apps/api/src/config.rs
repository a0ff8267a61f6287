use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every key has a default — the DeepSeek API key is NOT env config, it lives
/// in the flat-file key store and is managed via `/api/config/deepseek`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Flat `KEY=value` file backing the key store.
    pub config_file: PathBuf,
    /// Base URL of the WeChat official-account platform API.
    pub mp_base_url: String,
    /// Base URL of the DeepSeek completion API.
    pub deepseek_base_url: String,
    /// Directory for the daily-rolling log file.
    pub log_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            config_file: env_or("CONFIG_FILE", ".env").into(),
            mp_base_url: env_or("MP_BASE_URL", "https://mp.weixin.qq.com"),
            deepseek_base_url: env_or("DEEPSEEK_BASE_URL", "https://api.deepseek.com"),
            log_dir: env_or("LOG_DIR", "logs").into(),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            port: 5000,
            config_file: ".env".into(),
            mp_base_url: "https://mp.weixin.qq.com".to_string(),
            deepseek_base_url: "https://api.deepseek.com".to_string(),
            log_dir: "logs".into(),
            rust_log: "info".to_string(),
        }
    }
}
