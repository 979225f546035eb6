use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const PRIMARY_KEY_ENV: &str = "CLOUDHOOK_PRIMARY_KEY";
pub const WEBHOOK_KEY_ENV: &str = "CLOUDHOOK_WEBHOOK_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Where this application is reachable from the backend servers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Address the HTTP listener binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// Backend servers hooks are registered with
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,

    #[serde(default = "default_application_id")]
    pub application_id: String,

    #[serde(default)]
    pub primary_key: String,

    #[serde(default)]
    pub webhook_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_delete_on_shutdown")]
    pub delete_hooks_on_shutdown: bool,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_body_limit() -> usize {
    16 * 1024
}

fn default_urls() -> Vec<String> {
    vec!["http://localhost:1337/parse".to_string()]
}

fn default_application_id() -> String {
    "applicationId".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_delete_on_shutdown() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: default_port(),
            bind: default_bind(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            application_id: default_application_id(),
            primary_key: String::new(),
            webhook_key: None,
            request_timeout_secs: default_timeout(),
            delete_hooks_on_shutdown: default_delete_on_shutdown(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Parse TOML config text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply secrets from the environment over file values
    pub fn apply_env(mut self) -> Self {
        if let Ok(key) = std::env::var(PRIMARY_KEY_ENV) {
            self.backend.primary_key = key;
        }
        if let Ok(key) = std::env::var(WEBHOOK_KEY_ENV) {
            self.backend.webhook_key = Some(key);
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.backend.urls.is_empty() {
            anyhow::bail!("backend.urls must list at least one server");
        }
        for url in &self.backend.urls {
            reqwest::Url::parse(url).context(format!("Invalid backend url: {}", url))?;
        }
        Ok(())
    }
}

/// Load config from file or use defaults, then apply environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = path {
        let content =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
        Config::from_toml(&content)?
    } else {
        Config::default()
    };

    Ok(config.apply_env())
}
