// Summary aggregates: one upserted row per (from, to, transfer_type).

use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;

use audit_domain::ports::SummaryRepository;
use audit_domain::utils::current_millis;
use audit_domain::{SummaryDelta, SummaryKey, TransferSummary};

use crate::repositories::sqlite_store::SqliteStore;

const MAX_SUMMARY_ROWS: i64 = 500;

#[async_trait]
impl SummaryRepository for SqliteStore {
    async fn upsert(&self, key: &SummaryKey, delta: &SummaryDelta) -> Result<()> {
        let now_ms = current_millis();
        // MAX keeps the suspicious flag sticky once any transfer in the
        // pair has been flagged.
        sqlx::query(
            "INSERT INTO transfer_summaries ( \
                 from_player, to_player, transfer_type, transfer_count, \
                 total_quantity, total_value, suspicious_count, is_suspicious, \
                 first_transfer_ms, last_transfer_ms, created_ms, updated_ms \
             ) VALUES (?, ?, ?, 1, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(from_player, to_player, transfer_type) DO UPDATE SET \
                 transfer_count = transfer_count + 1, \
                 total_quantity = total_quantity + excluded.total_quantity, \
                 total_value = total_value + excluded.total_value, \
                 suspicious_count = suspicious_count + excluded.suspicious_count, \
                 is_suspicious = MAX(is_suspicious, excluded.is_suspicious), \
                 first_transfer_ms = MIN(first_transfer_ms, excluded.first_transfer_ms), \
                 last_transfer_ms = MAX(last_transfer_ms, excluded.last_transfer_ms), \
                 updated_ms = excluded.updated_ms",
        )
        .bind(&key.from_player)
        .bind(&key.to_player)
        .bind(&key.transfer_type)
        .bind(delta.quantity)
        .bind(delta.value)
        .bind(i64::from(delta.suspicious))
        .bind(delta.suspicious)
        .bind(delta.occurred_at_ms)
        .bind(delta.occurred_at_ms)
        .bind(now_ms)
        .bind(now_ms)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn fetch_for_player(
        &self,
        player: &str,
        since_ms: i64,
    ) -> Result<Vec<TransferSummary>> {
        let rows = sqlx::query(
            "SELECT from_player, to_player, transfer_type, transfer_count, \
                    total_quantity, total_value, suspicious_count, is_suspicious, \
                    first_transfer_ms, last_transfer_ms, created_ms, updated_ms \
             FROM transfer_summaries \
             WHERE (from_player = ? OR to_player = ?) AND last_transfer_ms >= ? \
             ORDER BY last_transfer_ms DESC LIMIT ?",
        )
        .bind(player)
        .bind(player)
        .bind(since_ms)
        .bind(MAX_SUMMARY_ROWS)
        .fetch_all(self.pool())
        .await?;
        rows.iter()
            .map(|row| {
                Ok(TransferSummary {
                    from_player: row.try_get("from_player")?,
                    to_player: row.try_get("to_player")?,
                    transfer_type: row.try_get("transfer_type")?,
                    transfer_count: row.try_get("transfer_count")?,
                    total_quantity: row.try_get("total_quantity")?,
                    total_value: row.try_get("total_value")?,
                    suspicious_count: row.try_get("suspicious_count")?,
                    is_suspicious: row.try_get("is_suspicious")?,
                    first_transfer_ms: row.try_get("first_transfer_ms")?,
                    last_transfer_ms: row.try_get("last_transfer_ms")?,
                    created_ms: row.try_get("created_ms")?,
                    updated_ms: row.try_get("updated_ms")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::sqlite_store::testing::memory_store;

    fn delta(quantity: i64, value: i64, suspicious: bool, at_ms: i64) -> SummaryDelta {
        SummaryDelta {
            quantity,
            value,
            suspicious,
            occurred_at_ms: at_ms,
        }
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_key_and_accumulates() {
        let store = memory_store().await;
        let key = SummaryKey::new("alice", "bob", "currency");
        store.upsert(&key, &delta(100, 100, false, 1_000)).await.unwrap();
        store.upsert(&key, &delta(50, 50, false, 2_000)).await.unwrap();
        store
            .upsert(&SummaryKey::new("alice", "bob", "item"), &delta(1, 500, false, 3_000))
            .await
            .unwrap();

        let summaries = store.fetch_for_player("alice", 0).await.unwrap();
        assert_eq!(summaries.len(), 2);
        let currency = summaries
            .iter()
            .find(|s| s.transfer_type == "currency")
            .unwrap();
        assert_eq!(currency.transfer_count, 2);
        assert_eq!(currency.total_quantity, 150);
        assert_eq!(currency.total_value, 150);
        assert_eq!(currency.first_transfer_ms, 1_000);
        assert_eq!(currency.last_transfer_ms, 2_000);
    }

    #[tokio::test]
    async fn suspicious_flag_is_sticky() {
        let store = memory_store().await;
        let key = SummaryKey::new("alice", "bob", "currency");
        store.upsert(&key, &delta(100, 100, true, 1_000)).await.unwrap();
        store.upsert(&key, &delta(10, 10, false, 2_000)).await.unwrap();

        let summaries = store.fetch_for_player("bob", 0).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].is_suspicious);
        assert_eq!(summaries[0].suspicious_count, 1);
    }

    #[tokio::test]
    async fn window_filters_on_last_transfer() {
        let store = memory_store().await;
        let key = SummaryKey::new("alice", "bob", "currency");
        store.upsert(&key, &delta(100, 100, false, 1_000)).await.unwrap();

        assert!(store.fetch_for_player("alice", 5_000).await.unwrap().is_empty());
        store.upsert(&key, &delta(10, 10, false, 9_000)).await.unwrap();
        assert_eq!(store.fetch_for_player("alice", 5_000).await.unwrap().len(), 1);
    }
}
