use tracing::error;

use audit_domain::utils::{clamp_query_days, current_millis, window_start_millis};
use audit_domain::TransferEvent;

use crate::{AppError, AppState};

pub const DEFAULT_HISTORY_DAYS: i64 = 30;
pub const DEFAULT_PATTERN_DAYS: i64 = 7;
pub const DEFAULT_SUSPICIOUS_DAYS: i64 = 30;

/// Chronological transfers involving the player, newest first. Rows carry
/// the account/character age context captured at ingest.
pub async fn history(
    state: &AppState,
    player: &str,
    days: Option<i64>,
) -> Result<Vec<TransferEvent>, AppError> {
    fetch_involving(state, player, days.unwrap_or(DEFAULT_HISTORY_DAYS)).await
}

/// Repeat-transfer review: history over the shorter pattern window.
pub async fn patterns(
    state: &AppState,
    player: &str,
    days: Option<i64>,
) -> Result<Vec<TransferEvent>, AppError> {
    fetch_involving(state, player, days.unwrap_or(DEFAULT_PATTERN_DAYS)).await
}

/// Every event flagged suspicious inside the window.
pub async fn suspicious(
    state: &AppState,
    days: Option<i64>,
) -> Result<Vec<TransferEvent>, AppError> {
    let days = clamp_query_days(days.unwrap_or(DEFAULT_SUSPICIOUS_DAYS));
    let since_ms = window_start_millis(current_millis(), days);
    state
        .transfer_log
        .fetch_suspicious(since_ms)
        .await
        .map_err(|err| {
            error!("failed to fetch suspicious transfers: {}", err);
            AppError::Persistence(err)
        })
}

async fn fetch_involving(
    state: &AppState,
    player: &str,
    days: i64,
) -> Result<Vec<TransferEvent>, AppError> {
    let player = normalize_player(player)?;
    let days = clamp_query_days(days);
    let since_ms = window_start_millis(current_millis(), days);
    state
        .transfer_log
        .fetch_history(&player, since_ms)
        .await
        .map_err(|err| {
            error!("failed to fetch transfer history: {}", err);
            AppError::Persistence(err)
        })
}

pub(crate) fn normalize_player(player: &str) -> Result<String, AppError> {
    let trimmed = player.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "player name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_name_is_required() {
        assert!(matches!(
            normalize_player("  "),
            Err(AppError::Validation(_))
        ));
        assert_eq!(normalize_player(" Alice ").unwrap(), "alice");
    }
}
