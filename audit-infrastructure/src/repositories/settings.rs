// Settings rows: the monitoring-config singleton (stored as JSON under a
// fixed key) and the tracked-item list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;

use audit_domain::ports::SettingsRepository;
use audit_domain::utils::current_millis;
use audit_domain::{MonitoringConfig, TrackedItem};

use crate::repositories::sqlite_store::SqliteStore;

const MONITORING_CONFIG_KEY: &str = "monitoring_config";

#[async_trait]
impl SettingsRepository for SqliteStore {
    async fn load_monitoring_config(&self) -> Result<Option<MonitoringConfig>> {
        let row = sqlx::query("SELECT value FROM audit_settings WHERE key = ?")
            .bind(MONITORING_CONFIG_KEY)
            .fetch_optional(self.pool())
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row.try_get("value")?;
        let config = serde_json::from_str(&value).context("stored monitoring config is invalid")?;
        Ok(Some(config))
    }

    async fn save_monitoring_config(&self, config: &MonitoringConfig) -> Result<()> {
        let value = serde_json::to_string(config)?;
        sqlx::query(
            "INSERT INTO audit_settings (key, value, updated_ms) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET \
                 value = excluded.value, updated_ms = excluded.updated_ms",
        )
        .bind(MONITORING_CONFIG_KEY)
        .bind(value)
        .bind(current_millis())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn add_tracked_item(&self, item: &TrackedItem) -> Result<()> {
        sqlx::query(
            "INSERT INTO tracked_items (item_name, active) VALUES (?, ?) \
             ON CONFLICT(item_name) DO UPDATE SET active = excluded.active",
        )
        .bind(item.item_name.trim().to_lowercase())
        .bind(item.active)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn remove_tracked_item(&self, item_name: &str) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM tracked_items WHERE item_name = ?")
            .bind(item_name.trim().to_lowercase())
            .execute(self.pool())
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    async fn list_tracked_items(&self) -> Result<Vec<TrackedItem>> {
        let rows = sqlx::query("SELECT item_name, active FROM tracked_items ORDER BY item_name")
            .fetch_all(self.pool())
            .await?;
        rows.iter()
            .map(|row| {
                Ok(TrackedItem {
                    item_name: row.try_get("item_name")?,
                    active: row.try_get("active")?,
                })
            })
            .collect()
    }
}
