use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed control-plane input. Rejected before any state change.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Duplicate rows or missing schema objects, surfaced only by the
    /// dedicated repair and migration operations.
    #[error("integrity: {0}")]
    Integrity(String),
    /// Store unavailable or a write failed on an administrative path.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}
