// Identity lookups against the transfer log. A name is "known" once it
// has appeared on either side of any logged transfer.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use audit_domain::ports::IdentityResolver;

pub struct StoreIdentityResolver {
    pool: SqlitePool,
}

impl StoreIdentityResolver {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityResolver for StoreIdentityResolver {
    async fn player_exists(&self, name: &str) -> Result<bool> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Ok(false);
        }
        let row = sqlx::query(
            "SELECT 1 FROM transfer_events WHERE from_player = ? OR to_player = ? LIMIT 1",
        )
        .bind(&name)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn account_exists(&self, name: &str) -> Result<bool> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Ok(false);
        }
        let row = sqlx::query(
            "SELECT 1 FROM transfer_events WHERE from_account = ? OR to_account = ? LIMIT 1",
        )
        .bind(&name)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::sqlite_store::testing::memory_store;
    use audit_domain::ports::TransferLogRepository;
    use audit_domain::TransferEvent;

    #[tokio::test]
    async fn names_resolve_after_first_logged_transfer() {
        let store = memory_store().await;
        let resolver = StoreIdentityResolver::new(store.pool().clone());
        assert!(!resolver.player_exists("alice").await.unwrap());

        let event = TransferEvent {
            event_id: "e1".to_string(),
            transfer_type: "currency".to_string(),
            from_player: "alice".to_string(),
            to_player: "bob".to_string(),
            from_account: "acc_a".to_string(),
            to_account: String::new(),
            item_name: None,
            quantity: 10,
            value: 10,
            occurred_at_ms: 1_000,
            from_account_created_ms: None,
            to_account_created_ms: None,
            from_character_created_ms: None,
            to_character_created_ms: None,
            from_ip: None,
            to_ip: None,
            details: None,
            suspicious: false,
        };
        store.insert_event(&event).await.unwrap();

        assert!(resolver.player_exists("Alice").await.unwrap());
        assert!(resolver.player_exists("bob").await.unwrap());
        assert!(resolver.account_exists("acc_a").await.unwrap());
        assert!(!resolver.account_exists("").await.unwrap());
        assert!(!resolver.account_exists("acc_x").await.unwrap());
    }
}
