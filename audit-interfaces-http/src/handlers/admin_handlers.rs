use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use audit_application::commands::{bank_ban_commands, config_commands, watchlist_commands};
use audit_application::queries::status_queries;
use audit_application::AppState;
use audit_domain::{BankBanEntry, MonitoringConfig, TrackedItem, WatchSubject};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Deserialize)]
pub struct SubjectPayload {
    pub kind: String,
    pub name: String,
}

#[derive(serde::Deserialize)]
pub struct BanPayload {
    pub kind: String,
    /// Subject name, optionally followed by a free-text reason.
    pub target: String,
    pub issued_by: String,
    pub duration_days: Option<i64>,
}

#[derive(serde::Deserialize)]
pub struct BanCheckQuery {
    pub player: Option<String>,
    pub account: Option<String>,
}

#[derive(serde::Serialize)]
pub struct BanCheckResponse {
    pub banned: bool,
}

#[derive(serde::Deserialize)]
pub struct SettingPayload {
    pub key: String,
    pub value: String,
}

#[derive(serde::Deserialize)]
pub struct ItemPayload {
    pub item_name: String,
}

pub async fn list_watches(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WatchSubject>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(status_queries::list_watches(&state).await?))
}

pub async fn add_watch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubjectPayload>,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let added = watchlist_commands::add_watch(&state, &payload.kind, &payload.name).await?;
    if added {
        Ok(StatusCode::CREATED)
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

pub async fn remove_watch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SubjectPayload>,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let removed = watchlist_commands::remove_watch(&state, &query.kind, &query.name).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound)
    }
}

pub async fn list_bank_bans(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BankBanEntry>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(status_queries::list_bank_bans(&state).await?))
}

pub async fn add_bank_ban(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BanPayload>,
) -> Result<Json<BankBanEntry>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let entry = bank_ban_commands::add_bank_ban(
        &state,
        &payload.kind,
        &payload.target,
        &payload.issued_by,
        payload.duration_days,
    )
    .await?;
    Ok(Json(entry))
}

pub async fn remove_bank_ban(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SubjectPayload>,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let removed = bank_ban_commands::remove_bank_ban(&state, &query.kind, &query.name).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound)
    }
}

/// Enforcement endpoint for the banking feature: checks both identities
/// of the caller in one round trip.
pub async fn check_bank_ban(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BanCheckQuery>,
) -> Result<Json<BanCheckResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let banned = bank_ban_commands::is_bank_banned(
        &state,
        query.player.as_deref().unwrap_or(""),
        query.account.as_deref().unwrap_or(""),
    )
    .await?;
    Ok(Json(BanCheckResponse { banned }))
}

pub async fn get_monitoring_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MonitoringConfig>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(status_queries::monitoring_config(&state).await))
}

pub async fn replace_monitoring_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<MonitoringConfig>,
) -> Result<Json<MonitoringConfig>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let config = config_commands::replace_monitoring_config(&state, payload).await?;
    Ok(Json(config))
}

pub async fn update_setting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SettingPayload>,
) -> Result<Json<MonitoringConfig>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let config = config_commands::update_setting(&state, &payload.key, &payload.value).await?;
    Ok(Json(config))
}

pub async fn list_tracked_items(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TrackedItem>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(status_queries::list_tracked_items(&state).await?))
}

pub async fn add_tracked_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ItemPayload>,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    config_commands::add_tracked_item(&state, &payload.item_name).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_tracked_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ItemPayload>,
) -> Result<StatusCode, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let removed = config_commands::remove_tracked_item(&state, &query.item_name).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound)
    }
}
