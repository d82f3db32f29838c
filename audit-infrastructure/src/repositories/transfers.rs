// Transfer log: append-only event rows plus the read-model queries
// built over them.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use audit_domain::ports::TransferLogRepository;
use audit_domain::{IpFunnelRow, IpRouteRow, TopParticipantRow, TransferEvent};

use crate::repositories::sqlite_store::SqliteStore;

// Query hard caps; the clamped day windows bound time, these bound rows.
const MAX_EVENT_ROWS: i64 = 1_000;
const MAX_REPORT_ROWS: i64 = 100;

fn event_from_row(row: &SqliteRow) -> Result<TransferEvent> {
    Ok(TransferEvent {
        event_id: row.try_get("event_id")?,
        transfer_type: row.try_get("transfer_type")?,
        from_player: row.try_get("from_player")?,
        to_player: row.try_get("to_player")?,
        from_account: row.try_get("from_account")?,
        to_account: row.try_get("to_account")?,
        item_name: row.try_get("item_name")?,
        quantity: row.try_get("quantity")?,
        value: row.try_get("value")?,
        occurred_at_ms: row.try_get("occurred_at_ms")?,
        from_account_created_ms: row.try_get("from_account_created_ms")?,
        to_account_created_ms: row.try_get("to_account_created_ms")?,
        from_character_created_ms: row.try_get("from_character_created_ms")?,
        to_character_created_ms: row.try_get("to_character_created_ms")?,
        from_ip: row.try_get("from_ip")?,
        to_ip: row.try_get("to_ip")?,
        details: row.try_get("details")?,
        suspicious: row.try_get("suspicious")?,
    })
}

#[async_trait]
impl TransferLogRepository for SqliteStore {
    async fn insert_event(&self, event: &TransferEvent) -> Result<()> {
        sqlx::query(
            "INSERT INTO transfer_events ( \
                 event_id, transfer_type, from_player, to_player, \
                 from_account, to_account, item_name, quantity, value, \
                 occurred_at_ms, from_account_created_ms, to_account_created_ms, \
                 from_character_created_ms, to_character_created_ms, \
                 from_ip, to_ip, details, suspicious \
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.event_id)
        .bind(&event.transfer_type)
        .bind(&event.from_player)
        .bind(&event.to_player)
        .bind(&event.from_account)
        .bind(&event.to_account)
        .bind(&event.item_name)
        .bind(event.quantity)
        .bind(event.value)
        .bind(event.occurred_at_ms)
        .bind(event.from_account_created_ms)
        .bind(event.to_account_created_ms)
        .bind(event.from_character_created_ms)
        .bind(event.to_character_created_ms)
        .bind(&event.from_ip)
        .bind(&event.to_ip)
        .bind(&event.details)
        .bind(event.suspicious)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn fetch_history(&self, player: &str, since_ms: i64) -> Result<Vec<TransferEvent>> {
        let rows = sqlx::query(
            "SELECT * FROM transfer_events \
             WHERE (from_player = ? OR to_player = ?) AND occurred_at_ms >= ? \
             ORDER BY occurred_at_ms DESC LIMIT ?",
        )
        .bind(player)
        .bind(player)
        .bind(since_ms)
        .bind(MAX_EVENT_ROWS)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn fetch_suspicious(&self, since_ms: i64) -> Result<Vec<TransferEvent>> {
        let rows = sqlx::query(
            "SELECT * FROM transfer_events \
             WHERE suspicious = 1 AND occurred_at_ms >= ? \
             ORDER BY occurred_at_ms DESC LIMIT ?",
        )
        .bind(since_ms)
        .bind(MAX_EVENT_ROWS)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn top_participants(
        &self,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<TopParticipantRow>> {
        let rows = sqlx::query(
            "SELECT player, COUNT(*) AS transfer_count, \
                    COUNT(DISTINCT partner) AS unique_partners, \
                    SUM(quantity) AS total_quantity \
             FROM ( \
                 SELECT from_player AS player, to_player AS partner, quantity \
                 FROM transfer_events WHERE occurred_at_ms >= ? \
                 UNION ALL \
                 SELECT to_player AS player, from_player AS partner, quantity \
                 FROM transfer_events WHERE occurred_at_ms >= ? \
             ) \
             GROUP BY player \
             ORDER BY transfer_count DESC, total_quantity DESC \
             LIMIT ?",
        )
        .bind(since_ms)
        .bind(since_ms)
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await?;
        rows.iter()
            .map(|row| {
                Ok(TopParticipantRow {
                    player: row.try_get("player")?,
                    transfer_count: row.try_get("transfer_count")?,
                    unique_partners: row.try_get("unique_partners")?,
                    total_quantity: row.try_get("total_quantity")?,
                })
            })
            .collect()
    }

    async fn ip_routes(&self, player: &str, since_ms: i64) -> Result<Vec<IpRouteRow>> {
        let rows = sqlx::query(
            "SELECT from_ip, to_ip, COUNT(*) AS transfer_count, \
                    SUM(quantity) AS total_quantity \
             FROM transfer_events \
             WHERE (from_player = ? OR to_player = ?) AND occurred_at_ms >= ? \
               AND from_ip IS NOT NULL AND to_ip IS NOT NULL \
             GROUP BY from_ip, to_ip \
             ORDER BY transfer_count DESC, total_quantity DESC \
             LIMIT ?",
        )
        .bind(player)
        .bind(player)
        .bind(since_ms)
        .bind(MAX_REPORT_ROWS)
        .fetch_all(self.pool())
        .await?;
        rows.iter()
            .map(|row| {
                Ok(IpRouteRow {
                    from_ip: row.try_get("from_ip")?,
                    to_ip: row.try_get("to_ip")?,
                    transfer_count: row.try_get("transfer_count")?,
                    total_quantity: row.try_get("total_quantity")?,
                })
            })
            .collect()
    }

    async fn ip_funnels(&self, player: &str, since_ms: i64) -> Result<Vec<IpFunnelRow>> {
        let rows = sqlx::query(
            "SELECT to_player, COUNT(DISTINCT from_ip) AS distinct_source_ips, \
                    COUNT(*) AS transfer_count \
             FROM transfer_events \
             WHERE (from_player = ? OR to_player = ?) AND occurred_at_ms >= ? \
               AND from_ip IS NOT NULL AND to_ip IS NOT NULL AND from_ip <> to_ip \
             GROUP BY to_player \
             ORDER BY distinct_source_ips DESC, transfer_count DESC \
             LIMIT ?",
        )
        .bind(player)
        .bind(player)
        .bind(since_ms)
        .bind(MAX_REPORT_ROWS)
        .fetch_all(self.pool())
        .await?;
        rows.iter()
            .map(|row| {
                Ok(IpFunnelRow {
                    to_player: row.try_get("to_player")?,
                    distinct_source_ips: row.try_get("distinct_source_ips")?,
                    transfer_count: row.try_get("transfer_count")?,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}
