// Admin webhook notifications for suspicious transfers.
//
// Fire-and-forget: delivery runs on a spawned task and failures only
// produce a warning, the ingest path never waits on the webhook.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, warn};

use audit_domain::ports::NotificationSink;
use audit_domain::{RuntimeConfig, SuspiciousAlert};

const MAX_ALERT_LINES: usize = 8;
const DEFAULT_TEMPLATE: &str = r#"{"message":"Suspicious transfers: {total}\n{lines}"}"#;

pub struct WebhookNotifier {
    config: RuntimeConfig,
}

impl WebhookNotifier {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    fn spawn_notifications(&self, alerts: Vec<SuspiciousAlert>) {
        if alerts.is_empty() {
            return;
        }
        if self.config.webhook_url.is_none() {
            debug!("webhook url not configured, dropping {} alerts", alerts.len());
            return;
        }
        let config = self.config.clone();
        tokio::spawn(async move {
            if let Err(err) = send_notifications(&config, &alerts).await {
                warn!("admin webhook failed: {}", err);
            }
        });
    }

    async fn check_target(&self) -> Result<()> {
        let url = resolve_webhook_url(&self.config)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.request_timeout_seconds.max(3)))
            .build()?;
        let mut request = client.get(&url);
        if let Some(token) = &self.config.webhook_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            anyhow::bail!("webhook responded {}", response.status());
        }
        Ok(())
    }
}

async fn send_notifications(config: &RuntimeConfig, alerts: &[SuspiciousAlert]) -> Result<()> {
    let url = resolve_webhook_url(config)?;
    let template = config.webhook_template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    let payload = build_payload(alerts, template);
    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
        .build()?;

    let mut request = client
        .post(&url)
        .header("Content-Type", "application/json")
        .body(payload);
    if let Some(token) = &config.webhook_token {
        request = request.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    request.send().await?.error_for_status()?;
    Ok(())
}

fn resolve_webhook_url(config: &RuntimeConfig) -> Result<String> {
    if let Some(url) = &config.webhook_url {
        if !url.trim().is_empty() {
            return Ok(url.clone());
        }
    }
    anyhow::bail!("webhook url not configured")
}

fn build_payload(alerts: &[SuspiciousAlert], template: &str) -> String {
    let lines = alerts
        .iter()
        .take(MAX_ALERT_LINES)
        .map(|alert| {
            format!(
                "{} -> {} | {} {} | {}/{} in {}h",
                alert.from_player,
                alert.to_player,
                alert.transfer_type,
                alert.value,
                alert.cumulative_value,
                alert.threshold,
                alert.window_hours,
            )
        })
        .collect::<Vec<_>>();
    let mut line_text = lines.join("\\n");
    if alerts.len() > MAX_ALERT_LINES {
        line_text.push_str(&format!("\\n... {} more", alerts.len() - MAX_ALERT_LINES));
    }
    template
        .replace("{total}", &alerts.len().to_string())
        .replace("{lines}", &line_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(from: &str, value: i64) -> SuspiciousAlert {
        SuspiciousAlert {
            from_player: from.to_string(),
            to_player: "bob".to_string(),
            transfer_type: "currency".to_string(),
            quantity: value,
            value,
            cumulative_value: value,
            threshold: 100_000,
            window_hours: 24,
            reason: "cumulative value over threshold".to_string(),
        }
    }

    #[test]
    fn payload_fills_template_placeholders() {
        let payload = build_payload(&[alert("alice", 150_000)], DEFAULT_TEMPLATE);
        assert!(payload.contains("Suspicious transfers: 1"));
        assert!(payload.contains("alice -> bob | currency 150000 | 150000/100000 in 24h"));
    }

    #[test]
    fn payload_truncates_long_batches() {
        let alerts: Vec<_> = (0..12).map(|i| alert(&format!("p{}", i), 1)).collect();
        let payload = build_payload(&alerts, "{total}|{lines}");
        assert!(payload.starts_with("12|"));
        assert!(payload.contains("... 4 more"));
        assert!(!payload.contains("p9 ->"));
    }
}
