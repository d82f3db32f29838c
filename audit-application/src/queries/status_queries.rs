use tracing::error;

use audit_domain::services::RateSnapshot;
use audit_domain::utils::current_millis;
use audit_domain::{BankBanEntry, MonitoringConfig, TrackedItem, WatchSubject};

use crate::{AppError, AppState};

/// Live dashboard rates from the in-memory monitor.
pub fn rates(state: &AppState) -> RateSnapshot {
    state.rate_monitor.snapshot(current_millis())
}

pub async fn monitoring_config(state: &AppState) -> MonitoringConfig {
    state.monitoring.read().await.clone()
}

pub async fn list_watches(state: &AppState) -> Result<Vec<WatchSubject>, AppError> {
    state.watchlists.list_watches().await.map_err(|err| {
        error!("failed to list watchlist: {}", err);
        AppError::Persistence(err)
    })
}

/// Full ban list, expired entries included, with original metadata.
pub async fn list_bank_bans(state: &AppState) -> Result<Vec<BankBanEntry>, AppError> {
    state.watchlists.list_bank_bans().await.map_err(|err| {
        error!("failed to list bank bans: {}", err);
        AppError::Persistence(err)
    })
}

pub async fn list_tracked_items(state: &AppState) -> Result<Vec<TrackedItem>, AppError> {
    state.settings.list_tracked_items().await.map_err(|err| {
        error!("failed to list tracked items: {}", err);
        AppError::Persistence(err)
    })
}
