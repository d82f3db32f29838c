use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::error;

use audit_application::commands::ingest_commands::{self, IngestOutcome};
use audit_application::AppState;

use crate::error::HttpError;
use crate::middleware::{authorize, parse_transfers};

pub async fn ingest_transfers(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<IngestOutcome>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let transfers = parse_transfers(&headers, &body).map_err(|err| {
        error!("failed to parse ingest body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;

    let outcome = ingest_commands::process_transfers(&state, transfers).await?;
    Ok(Json(outcome))
}
