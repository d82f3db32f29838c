// Process-level runtime configuration
//
// Derived from AppConfig at startup; immutable for the process lifetime.
// The runtime-mutable engine thresholds live in MonitoringConfig instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_template: Option<String>,
    pub webhook_token: Option<String>,
    pub request_timeout_seconds: u64,
    pub max_body_bytes: u64,
    /// Rows deleted per cleanup batch; cleanup loops until no batch is full.
    pub cleanup_batch_size: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3461".to_string(),
            api_token: None,
            webhook_url: None,
            webhook_template: None,
            webhook_token: None,
            request_timeout_seconds: 15,
            max_body_bytes: 8 * 1024 * 1024,
            cleanup_batch_size: 500,
        }
    }
}
