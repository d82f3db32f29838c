use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use audit_application::queries::{report_queries, status_queries, summary_queries, transfer_queries};
use audit_application::AppState;
use audit_domain::services::RateSnapshot;
use audit_domain::{IpCorrelationReport, TopParticipantRow, TransferEvent, TransferSummary};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Deserialize)]
pub struct WindowQuery {
    pub days: Option<i64>,
}

#[derive(serde::Deserialize)]
pub struct TopQuery {
    pub days: Option<i64>,
    pub limit: Option<usize>,
}

pub async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(player): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<TransferEvent>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let events = transfer_queries::history(&state, &player, query.days).await?;
    Ok(Json(events))
}

pub async fn patterns(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(player): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<TransferEvent>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let events = transfer_queries::patterns(&state, &player, query.days).await?;
    Ok(Json(events))
}

pub async fn suspicious(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<TransferEvent>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let events = transfer_queries::suspicious(&state, query.days).await?;
    Ok(Json(events))
}

pub async fn summaries(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(player): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<TransferSummary>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let rows = summary_queries::summaries(&state, &player, query.days).await?;
    Ok(Json(rows))
}

pub async fn top_participants(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<TopParticipantRow>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let rows = report_queries::top_participants(&state, query.days, query.limit).await?;
    Ok(Json(rows))
}

pub async fn ip_correlation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(player): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<IpCorrelationReport>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let report = report_queries::ip_correlation(&state, &player, query.days).await?;
    Ok(Json(report))
}

pub async fn rates(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RateSnapshot>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(status_queries::rates(&state)))
}
