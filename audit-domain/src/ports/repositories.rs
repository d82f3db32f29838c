use async_trait::async_trait;

use crate::entities::{
    BankBanEntry,
    IpFunnelRow,
    IpRouteRow,
    MigrationReport,
    MonitoringConfig,
    SummaryDelta,
    SummaryKey,
    SummaryRepairReport,
    TopParticipantRow,
    TrackedItem,
    TransferEvent,
    TransferSummary,
    WatchSet,
};
use crate::value_objects::WatchSubject;

/// Durable append-and-query log of transfer events.
#[async_trait]
pub trait TransferLogRepository: Send + Sync {
    async fn insert_event(&self, event: &TransferEvent) -> anyhow::Result<()>;
    /// Transfers involving the player since the cutoff, newest first.
    async fn fetch_history(&self, player: &str, since_ms: i64) -> anyhow::Result<Vec<TransferEvent>>;
    async fn fetch_suspicious(&self, since_ms: i64) -> anyhow::Result<Vec<TransferEvent>>;
    async fn top_participants(
        &self,
        since_ms: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<TopParticipantRow>>;
    async fn ip_routes(&self, player: &str, since_ms: i64) -> anyhow::Result<Vec<IpRouteRow>>;
    async fn ip_funnels(&self, player: &str, since_ms: i64) -> anyhow::Result<Vec<IpFunnelRow>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

/// Upsert-based aggregate store, one row per (from, to, type).
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    /// Find-or-create the row for the key and apply the delta atomically.
    async fn upsert(&self, key: &SummaryKey, delta: &SummaryDelta) -> anyhow::Result<()>;
    async fn fetch_for_player(
        &self,
        player: &str,
        since_ms: i64,
    ) -> anyhow::Result<Vec<TransferSummary>>;
}

#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    /// Returns false when the subject was already listed.
    async fn add_watch(&self, subject: &WatchSubject) -> anyhow::Result<bool>;
    /// Returns false when the subject was not listed.
    async fn remove_watch(&self, subject: &WatchSubject) -> anyhow::Result<bool>;
    async fn list_watches(&self) -> anyhow::Result<Vec<WatchSubject>>;
    async fn load_watch_set(&self) -> anyhow::Result<WatchSet>;

    async fn add_bank_ban(&self, entry: &BankBanEntry) -> anyhow::Result<()>;
    async fn remove_bank_ban(&self, subject: &WatchSubject) -> anyhow::Result<bool>;
    /// All entries, expired and active alike, with full metadata.
    async fn list_bank_bans(&self) -> anyhow::Result<Vec<BankBanEntry>>;
    async fn find_bank_bans(&self, subjects: &[WatchSubject]) -> anyhow::Result<Vec<BankBanEntry>>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// None when the store has never been seeded.
    async fn load_monitoring_config(&self) -> anyhow::Result<Option<MonitoringConfig>>;
    async fn save_monitoring_config(&self, config: &MonitoringConfig) -> anyhow::Result<()>;

    async fn add_tracked_item(&self, item: &TrackedItem) -> anyhow::Result<()>;
    async fn remove_tracked_item(&self, item_name: &str) -> anyhow::Result<bool>;
    async fn list_tracked_items(&self) -> anyhow::Result<Vec<TrackedItem>>;
}

/// Online schema evolution and data repair. Every operation is idempotent
/// and probes for the expected object before creating it.
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<Vec<MigrationReport>>;
    /// Collapse duplicate summary rows (keep the newest identity), then
    /// install the uniqueness constraint.
    async fn repair_summaries(&self) -> anyhow::Result<SummaryRepairReport>;
    /// Delete one bounded batch of events older than the cutoff. Returns
    /// the number of rows removed; callers loop until it reports zero.
    async fn purge_events(&self, cutoff_ms: i64, batch_size: u32) -> anyhow::Result<u64>;
}
