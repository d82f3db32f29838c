use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tokio::time::{timeout, Duration};
use tracing::error;

use audit_application::commands::maintenance_commands;
use audit_application::AppState;
use audit_domain::{CleanupReport, MigrationReport, SummaryRepairReport};

use crate::error::HttpError;
use crate::middleware::authorize;

const DEFAULT_CLEANUP_DAYS: i64 = 90;

#[derive(serde::Deserialize)]
pub struct CleanupQuery {
    pub days: Option<i64>,
}

#[derive(serde::Serialize)]
struct WebhookStatus {
    status: String,
    mode: String,
}

pub async fn run_migration(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<MigrationReport>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let reports = maintenance_commands::run_migration(&state).await?;
    Ok(Json(reports))
}

pub async fn repair_summaries(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SummaryRepairReport>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let report = maintenance_commands::repair_summaries(&state).await?;
    Ok(Json(report))
}

pub async fn cleanup_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CleanupQuery>,
) -> Result<Json<CleanupReport>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let days = query.days.unwrap_or(DEFAULT_CLEANUP_DAYS);
    let report = maintenance_commands::cleanup_logs(&state, days).await?;
    Ok(Json(report))
}

pub async fn webhook_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(WebhookStatus {
                status: "unauthorized".to_string(),
                mode: "unset".to_string(),
            }),
        )
            .into_response();
    }

    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let mode = if state.config.webhook_url.is_some() {
        "http"
    } else {
        "unset"
    };

    match timeout(
        Duration::from_secs(timeout_secs),
        state.notifier.check_target(),
    )
    .await
    {
        Ok(Ok(_)) => (
            StatusCode::OK,
            Json(WebhookStatus {
                status: "ok".to_string(),
                mode: mode.to_string(),
            }),
        )
            .into_response(),
        Ok(Err(err)) => {
            error!("webhook check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(WebhookStatus {
                    status: "error".to_string(),
                    mode: mode.to_string(),
                }),
            )
                .into_response()
        }
        Err(_) => {
            error!("webhook check timeout after {}s", timeout_secs);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(WebhookStatus {
                    status: "timeout".to_string(),
                    mode: mode.to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    match timeout(Duration::from_secs(timeout_secs), state.transfer_log.ping()).await {
        Ok(Ok(_)) => StatusCode::OK,
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}
