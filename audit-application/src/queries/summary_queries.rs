use tracing::error;

use audit_domain::utils::{clamp_query_days, current_millis, window_start_millis};
use audit_domain::TransferSummary;

use crate::queries::transfer_queries::normalize_player;
use crate::{AppError, AppState};

pub const DEFAULT_SUMMARY_DAYS: i64 = 30;

/// Aggregate rows touching the player, each carrying its sticky
/// is_suspicious flag.
pub async fn summaries(
    state: &AppState,
    player: &str,
    days: Option<i64>,
) -> Result<Vec<TransferSummary>, AppError> {
    let player = normalize_player(player)?;
    let days = clamp_query_days(days.unwrap_or(DEFAULT_SUMMARY_DAYS));
    let since_ms = window_start_millis(current_millis(), days);
    state
        .summaries
        .fetch_for_player(&player, since_ms)
        .await
        .map_err(|err| {
            error!("failed to fetch transfer summaries: {}", err);
            AppError::Persistence(err)
        })
}
