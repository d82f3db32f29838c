use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use audit_domain::RuntimeConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub database_path: String,
    pub webhook_url: Option<String>,
    pub webhook_template: Option<String>,
    pub webhook_token: Option<String>,
    pub request_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub cleanup_batch_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3461".to_string(),
            api_token: None,
            database_path: "./warden.db".to_string(),
            webhook_url: None,
            webhook_template: None,
            webhook_token: None,
            request_timeout_seconds: 15,
            max_body_bytes: 8 * 1024 * 1024,
            cleanup_batch_size: 500,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("WARDEN_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.resolve_paths(base_dir);
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(api_token) = &self.api_token {
            if api_token.trim().is_empty() {
                self.api_token = None;
            }
        }
        if let Some(webhook_url) = &self.webhook_url {
            if webhook_url.trim().is_empty() {
                self.webhook_url = None;
            }
        }
        if let Some(template) = &self.webhook_template {
            if template.trim().is_empty() {
                self.webhook_template = None;
            }
        }
        if let Some(token) = &self.webhook_token {
            if token.trim().is_empty() {
                self.webhook_token = None;
            }
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.database_path = resolve_path(base, &self.database_path);
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.database_path.trim().is_empty() {
            return Err(anyhow!("database_path must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.cleanup_batch_size == 0 {
            return Err(anyhow!("cleanup_batch_size must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            webhook_url: self.webhook_url.clone(),
            webhook_template: self.webhook_template.clone(),
            webhook_token: self.webhook_token.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
            max_body_bytes: self.max_body_bytes,
            cleanup_batch_size: self.cleanup_batch_size,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("WARDEN_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("WARDEN_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_DATABASE_PATH") {
            self.database_path = value;
        }
        if let Ok(value) = env::var("WARDEN_WEBHOOK_URL") {
            self.webhook_url = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_WEBHOOK_TEMPLATE") {
            self.webhook_template = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_WEBHOOK_TOKEN") {
            self.webhook_token = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("WARDEN_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("WARDEN_CLEANUP_BATCH_SIZE") {
            self.cleanup_batch_size = value.parse().unwrap_or(self.cleanup_batch_size);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
