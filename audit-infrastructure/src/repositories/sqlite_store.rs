// SQLite persistence
//
// One pool, one store struct, trait impls split per concern. Schema
// evolution is online: every object is probed before creation so a
// restart against an existing database only reports what it found.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{info, warn};

use audit_domain::ports::MaintenanceRepository;
use audit_domain::{MigrationReport, MigrationStatus, SummaryRepairReport};

pub(crate) const CREATE_TRANSFER_EVENTS: &str = "\
CREATE TABLE transfer_events (
    event_id TEXT PRIMARY KEY,
    transfer_type TEXT NOT NULL,
    from_player TEXT NOT NULL,
    to_player TEXT NOT NULL,
    from_account TEXT NOT NULL DEFAULT '',
    to_account TEXT NOT NULL DEFAULT '',
    item_name TEXT,
    quantity INTEGER NOT NULL,
    value INTEGER NOT NULL,
    occurred_at_ms INTEGER NOT NULL,
    from_account_created_ms INTEGER,
    to_account_created_ms INTEGER,
    from_character_created_ms INTEGER,
    to_character_created_ms INTEGER,
    from_ip TEXT,
    to_ip TEXT,
    details TEXT
)";

pub(crate) const CREATE_TRANSFER_SUMMARIES: &str = "\
CREATE TABLE transfer_summaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_player TEXT NOT NULL,
    to_player TEXT NOT NULL,
    transfer_type TEXT NOT NULL,
    transfer_count INTEGER NOT NULL DEFAULT 0,
    total_quantity INTEGER NOT NULL DEFAULT 0,
    total_value INTEGER NOT NULL DEFAULT 0,
    suspicious_count INTEGER NOT NULL DEFAULT 0,
    is_suspicious INTEGER NOT NULL DEFAULT 0,
    first_transfer_ms INTEGER NOT NULL,
    last_transfer_ms INTEGER NOT NULL,
    created_ms INTEGER NOT NULL,
    updated_ms INTEGER NOT NULL
)";

const CREATE_WATCHLIST: &str = "\
CREATE TABLE watchlist (
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    created_ms INTEGER NOT NULL,
    PRIMARY KEY (kind, name)
)";

const CREATE_BANK_BANS: &str = "\
CREATE TABLE bank_bans (
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    reason TEXT NOT NULL,
    issued_by TEXT NOT NULL,
    created_ms INTEGER NOT NULL,
    expires_ms INTEGER,
    active INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (kind, name)
)";

const CREATE_TRACKED_ITEMS: &str = "\
CREATE TABLE tracked_items (
    item_name TEXT PRIMARY KEY,
    active INTEGER NOT NULL DEFAULT 1
)";

const CREATE_AUDIT_SETTINGS: &str = "\
CREATE TABLE audit_settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_ms INTEGER NOT NULL
)";

const CREATE_UNIQUE_SUMMARY_INDEX: &str =
    "CREATE UNIQUE INDEX uq_transfer_summaries_key \
     ON transfer_summaries (from_player, to_player, transfer_type)";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{}?mode=rwc", database_path);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&url)
            .await?;
        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A failed probe is treated as "does not exist"; the create that
    /// follows will surface any real problem with the database.
    async fn object_exists(&self, kind: &str, name: &str) -> bool {
        let probe = sqlx::query("SELECT 1 FROM sqlite_master WHERE type = ? AND name = ?")
            .bind(kind)
            .bind(name)
            .fetch_optional(&self.pool)
            .await;
        match probe {
            Ok(row) => row.is_some(),
            Err(err) => {
                warn!("schema probe for {} {} failed: {}", kind, name, err);
                false
            }
        }
    }

    async fn column_exists(&self, table: &str, column: &str) -> bool {
        let probe = sqlx::query("SELECT 1 FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_optional(&self.pool)
            .await;
        match probe {
            Ok(row) => row.is_some(),
            Err(err) => {
                warn!("column probe for {}.{} failed: {}", table, column, err);
                false
            }
        }
    }

    async fn ensure_table(&self, name: &str, ddl: &str) -> Result<MigrationReport> {
        let object = format!("table {}", name);
        if self.object_exists("table", name).await {
            return Ok(MigrationReport::new(&object, MigrationStatus::AlreadyExists));
        }
        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(MigrationReport::new(&object, MigrationStatus::Created))
    }

    async fn ensure_index(&self, name: &str, ddl: &str) -> Result<MigrationReport> {
        let object = format!("index {}", name);
        if self.object_exists("index", name).await {
            return Ok(MigrationReport::new(&object, MigrationStatus::AlreadyExists));
        }
        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(MigrationReport::new(&object, MigrationStatus::Created))
    }

    async fn ensure_column(&self, table: &str, column: &str, ddl: &str) -> Result<MigrationReport> {
        let object = format!("column {}.{}", table, column);
        if self.column_exists(table, column).await {
            return Ok(MigrationReport::new(&object, MigrationStatus::AlreadyExists));
        }
        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(MigrationReport::new(&object, MigrationStatus::Created))
    }
}

#[async_trait]
impl MaintenanceRepository for SqliteStore {
    async fn ensure_schema(&self) -> Result<Vec<MigrationReport>> {
        let mut reports = Vec::new();
        reports.push(
            self.ensure_table("transfer_events", CREATE_TRANSFER_EVENTS)
                .await?,
        );
        // Older deployments predate the classification flag on the log.
        reports.push(
            self.ensure_column(
                "transfer_events",
                "suspicious",
                "ALTER TABLE transfer_events \
                 ADD COLUMN suspicious INTEGER NOT NULL DEFAULT 0",
            )
            .await?,
        );
        reports.push(
            self.ensure_index(
                "idx_transfer_events_time",
                "CREATE INDEX idx_transfer_events_time ON transfer_events (occurred_at_ms)",
            )
            .await?,
        );
        reports.push(
            self.ensure_index(
                "idx_transfer_events_from",
                "CREATE INDEX idx_transfer_events_from \
                 ON transfer_events (from_player, occurred_at_ms)",
            )
            .await?,
        );
        reports.push(
            self.ensure_index(
                "idx_transfer_events_to",
                "CREATE INDEX idx_transfer_events_to \
                 ON transfer_events (to_player, occurred_at_ms)",
            )
            .await?,
        );
        reports.push(
            self.ensure_table("transfer_summaries", CREATE_TRANSFER_SUMMARIES)
                .await?,
        );
        // The uniqueness constraint cannot be installed over legacy
        // duplicate rows, so the index goes through the repair path.
        let repair = self.repair_summaries().await?;
        if repair.rows_removed > 0 {
            info!(
                "summary repair during migration removed {} duplicate rows",
                repair.rows_removed
            );
        }
        reports.push(MigrationReport::new(
            "index uq_transfer_summaries_key",
            repair.index_status,
        ));
        reports.push(self.ensure_table("watchlist", CREATE_WATCHLIST).await?);
        reports.push(self.ensure_table("bank_bans", CREATE_BANK_BANS).await?);
        reports.push(
            self.ensure_table("tracked_items", CREATE_TRACKED_ITEMS)
                .await?,
        );
        reports.push(
            self.ensure_table("audit_settings", CREATE_AUDIT_SETTINGS)
                .await?,
        );
        Ok(reports)
    }

    async fn repair_summaries(&self) -> Result<SummaryRepairReport> {
        let duplicate_groups: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ( \
                 SELECT 1 FROM transfer_summaries \
                 GROUP BY from_player, to_player, transfer_type \
                 HAVING COUNT(*) > 1 \
             )",
        )
        .fetch_one(&self.pool)
        .await?;

        // Keep the newest row of each group; older rows predate the
        // uniqueness constraint and hold stale aggregates.
        let rows_removed = sqlx::query(
            "DELETE FROM transfer_summaries WHERE id NOT IN ( \
                 SELECT MAX(id) FROM transfer_summaries \
                 GROUP BY from_player, to_player, transfer_type \
             )",
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        let index_status = if self.object_exists("index", "uq_transfer_summaries_key").await {
            MigrationStatus::AlreadyExists
        } else {
            sqlx::query(CREATE_UNIQUE_SUMMARY_INDEX)
                .execute(&self.pool)
                .await?;
            MigrationStatus::Created
        };

        Ok(SummaryRepairReport {
            duplicate_groups: duplicate_groups as u64,
            rows_removed,
            index_status,
        })
    }

    async fn purge_events(&self, cutoff_ms: i64, batch_size: u32) -> Result<u64> {
        let removed = sqlx::query(
            "DELETE FROM transfer_events WHERE rowid IN ( \
                 SELECT rowid FROM transfer_events \
                 WHERE occurred_at_ms < ? LIMIT ? \
             )",
        )
        .bind(cutoff_ms)
        .bind(i64::from(batch_size))
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(removed)
    }
}
