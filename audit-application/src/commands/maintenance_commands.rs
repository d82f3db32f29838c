use tracing::info;

use audit_domain::utils::{clamp_retention_days, current_millis, window_start_millis};
use audit_domain::{CleanupReport, MigrationReport, SummaryRepairReport};

use crate::{AppError, AppState};

/// Run schema migration. Safe to call any number of times: each object is
/// probed before creation and reported as created or already existing.
pub async fn run_migration(state: &AppState) -> Result<Vec<MigrationReport>, AppError> {
    let reports = state.maintenance.ensure_schema().await?;
    for report in &reports {
        info!("migration: {} {}", report.object, report.status.as_str());
    }
    Ok(reports)
}

/// Collapse duplicate summary rows and install the uniqueness constraint.
pub async fn repair_summaries(state: &AppState) -> Result<SummaryRepairReport, AppError> {
    let report = state
        .maintenance
        .repair_summaries()
        .await
        .map_err(|err| AppError::Integrity(err.to_string()))?;
    info!(
        "summary repair: {} duplicate groups, {} rows removed, index {}",
        report.duplicate_groups,
        report.rows_removed,
        report.index_status.as_str()
    );
    Ok(report)
}

/// Delete transfer events older than `days` (clamped to [1, 36500]),
/// batch by batch so the operation can be interrupted between batches and
/// never holds a long exclusive lock.
pub async fn cleanup_logs(state: &AppState, days: i64) -> Result<CleanupReport, AppError> {
    let days_kept = clamp_retention_days(days);
    let cutoff_ms = window_start_millis(current_millis(), days_kept);
    let batch_size = state.config.cleanup_batch_size.max(1);

    let mut rows_removed = 0u64;
    let mut batches = 0u32;
    loop {
        let removed = state.maintenance.purge_events(cutoff_ms, batch_size).await?;
        if removed == 0 {
            break;
        }
        rows_removed += removed;
        batches += 1;
        tokio::task::yield_now().await;
    }

    info!(
        "cleanup: kept {} days, removed {} rows in {} batches",
        days_kept, rows_removed, batches
    );
    Ok(CleanupReport {
        days_kept,
        rows_removed,
        batches,
    })
}
