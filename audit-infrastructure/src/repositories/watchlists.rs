// Monitoring blacklist and bank-ban rows.
//
// Removing a ban deactivates the row instead of deleting it, so the
// list endpoint keeps the issuer/reason history visible.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use audit_domain::ports::WatchlistRepository;
use audit_domain::utils::current_millis;
use audit_domain::{BankBanEntry, WatchSet, WatchSubject};

use crate::repositories::sqlite_store::SqliteStore;

fn ban_from_row(row: &SqliteRow) -> Result<Option<BankBanEntry>> {
    let kind: String = row.try_get("kind")?;
    let name: String = row.try_get("name")?;
    let Some(subject) = WatchSubject::from_kind(&kind, &name) else {
        warn!("bank ban row with unknown kind {:?} skipped", kind);
        return Ok(None);
    };
    Ok(Some(BankBanEntry {
        subject,
        reason: row.try_get("reason")?,
        issued_by: row.try_get("issued_by")?,
        created_ms: row.try_get("created_ms")?,
        expires_ms: row.try_get("expires_ms")?,
        active: row.try_get("active")?,
    }))
}

#[async_trait]
impl WatchlistRepository for SqliteStore {
    async fn add_watch(&self, subject: &WatchSubject) -> Result<bool> {
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO watchlist (kind, name, created_ms) VALUES (?, ?, ?)",
        )
        .bind(subject.kind())
        .bind(subject.name())
        .bind(current_millis())
        .execute(self.pool())
        .await?
        .rows_affected();
        Ok(inserted > 0)
    }

    async fn remove_watch(&self, subject: &WatchSubject) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM watchlist WHERE kind = ? AND name = ?")
            .bind(subject.kind())
            .bind(subject.name())
            .execute(self.pool())
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    async fn list_watches(&self) -> Result<Vec<WatchSubject>> {
        let rows = sqlx::query("SELECT kind, name FROM watchlist ORDER BY kind, name")
            .fetch_all(self.pool())
            .await?;
        let mut subjects = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind: String = row.try_get("kind")?;
            let name: String = row.try_get("name")?;
            match WatchSubject::from_kind(&kind, &name) {
                Some(subject) => subjects.push(subject),
                None => warn!("watchlist row with unknown kind {:?} skipped", kind),
            }
        }
        Ok(subjects)
    }

    async fn load_watch_set(&self) -> Result<WatchSet> {
        Ok(WatchSet::from_subjects(self.list_watches().await?))
    }

    async fn add_bank_ban(&self, entry: &BankBanEntry) -> Result<()> {
        // Re-banning a subject replaces the previous entry outright.
        sqlx::query(
            "INSERT INTO bank_bans ( \
                 kind, name, reason, issued_by, created_ms, expires_ms, active \
             ) VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(kind, name) DO UPDATE SET \
                 reason = excluded.reason, \
                 issued_by = excluded.issued_by, \
                 created_ms = excluded.created_ms, \
                 expires_ms = excluded.expires_ms, \
                 active = excluded.active",
        )
        .bind(entry.subject.kind())
        .bind(entry.subject.name())
        .bind(&entry.reason)
        .bind(&entry.issued_by)
        .bind(entry.created_ms)
        .bind(entry.expires_ms)
        .bind(entry.active)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn remove_bank_ban(&self, subject: &WatchSubject) -> Result<bool> {
        let changed = sqlx::query(
            "UPDATE bank_bans SET active = 0 WHERE kind = ? AND name = ? AND active = 1",
        )
        .bind(subject.kind())
        .bind(subject.name())
        .execute(self.pool())
        .await?
        .rows_affected();
        Ok(changed > 0)
    }

    async fn list_bank_bans(&self) -> Result<Vec<BankBanEntry>> {
        let rows = sqlx::query(
            "SELECT kind, name, reason, issued_by, created_ms, expires_ms, active \
             FROM bank_bans ORDER BY created_ms DESC",
        )
        .fetch_all(self.pool())
        .await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(entry) = ban_from_row(row)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn find_bank_bans(&self, subjects: &[WatchSubject]) -> Result<Vec<BankBanEntry>> {
        let mut entries = Vec::new();
        for subject in subjects {
            let row = sqlx::query(
                "SELECT kind, name, reason, issued_by, created_ms, expires_ms, active \
                 FROM bank_bans WHERE kind = ? AND name = ?",
            )
            .bind(subject.kind())
            .bind(subject.name())
            .fetch_optional(self.pool())
            .await?;
            if let Some(row) = row {
                if let Some(entry) = ban_from_row(&row)? {
                    entries.push(entry);
                }
            }
        }
        Ok(entries)
    }
}
