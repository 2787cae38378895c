use std::collections::HashMap;
use std::env;
use std::fmt;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Config file read when `CONFIG_PATH` is not set
const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted webhook body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token, usually supplied through `TELEGRAM_TOKEN`
    #[serde(default)]
    pub token: String,
    /// Destination chats every rendered message is sent to
    #[serde(default)]
    pub chat_ids: Vec<i64>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout for Bot API calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// `parse_mode` sent with every message; empty disables formatting
    #[serde(default = "default_parse_mode")]
    pub parse_mode: String,
}

/// A webhook source as it appears in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_parse_mode() -> String {
    "Markdown".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "telegram-webhook-relay".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", 8080)?
            .set_default("telegram.api_base_url", default_api_base_url())?
            .set_default("telegram.request_timeout_secs", 10)?
            // Host definitions live in the YAML file
            .add_source(File::with_name(&config_path))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SERVER__PORT, TELEGRAM__PARSE_MODE, OTEL__ENABLED, etc.
            .add_source(Environment::default().separator("__").try_parsing(true));

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.apply_env_overrides(
            env::var("TELEGRAM_TOKEN").ok(),
            env::var("CHAT_IDS").ok(),
        )?;
        settings.validate()?;

        Ok(settings)
    }

    /// Apply the `TELEGRAM_TOKEN` and `CHAT_IDS` variables on top of file values.
    pub fn apply_env_overrides(
        &mut self,
        token: Option<String>,
        chat_ids: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.token = token.trim().to_string();
        }

        if let Some(raw) = chat_ids.filter(|c| !c.trim().is_empty()) {
            self.telegram.chat_ids = parse_chat_ids(&raw)?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.is_empty() {
            return Err(ConfigError::Message(
                "telegram token missing (set TELEGRAM_TOKEN)".to_string(),
            ));
        }

        if self.telegram.chat_ids.is_empty() {
            return Err(ConfigError::Message(
                "chat IDs missing (set CHAT_IDS)".to_string(),
            ));
        }

        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Parse a comma-separated list of chat IDs, skipping blank entries.
pub fn parse_chat_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| ConfigError::Message(format!("invalid chat ID '{}': {}", s, e)))
        })
        .collect()
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_ids", &self.chat_ids)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chat_ids: vec![],
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            parse_mode: default_parse_mode(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
