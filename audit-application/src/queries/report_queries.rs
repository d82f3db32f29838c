use tracing::error;

use audit_domain::utils::{clamp_query_days, current_millis, window_start_millis};
use audit_domain::{IpCorrelationReport, TopParticipantRow};

use crate::queries::transfer_queries::normalize_player;
use crate::{AppError, AppState};

pub const DEFAULT_REPORT_DAYS: i64 = 30;
pub const DEFAULT_TOP_LIMIT: usize = 10;
const MAX_TOP_LIMIT: usize = 100;

/// Players ranked by transfer count, with unique-partner and total-quantity
/// statistics.
pub async fn top_participants(
    state: &AppState,
    days: Option<i64>,
    limit: Option<usize>,
) -> Result<Vec<TopParticipantRow>, AppError> {
    let days = clamp_query_days(days.unwrap_or(DEFAULT_REPORT_DAYS));
    let since_ms = window_start_millis(current_millis(), days);
    let limit = limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT);
    state
        .transfer_log
        .top_participants(since_ms, limit)
        .await
        .map_err(|err| {
            error!("failed to rank top participants: {}", err);
            AppError::Persistence(err)
        })
}

/// Repeated (from_ip, to_ip) routes for the player, plus destinations
/// receiving cross-IP transfers from several distinct source addresses.
pub async fn ip_correlation(
    state: &AppState,
    player: &str,
    days: Option<i64>,
) -> Result<IpCorrelationReport, AppError> {
    let player = normalize_player(player)?;
    let days = clamp_query_days(days.unwrap_or(DEFAULT_REPORT_DAYS));
    let since_ms = window_start_millis(current_millis(), days);

    let routes = state
        .transfer_log
        .ip_routes(&player, since_ms)
        .await
        .map_err(|err| {
            error!("failed to group ip routes: {}", err);
            AppError::Persistence(err)
        })?;
    let funnels = state
        .transfer_log
        .ip_funnels(&player, since_ms)
        .await
        .map_err(|err| {
            error!("failed to group ip funnels: {}", err);
            AppError::Persistence(err)
        })?;

    Ok(IpCorrelationReport { routes, funnels })
}
