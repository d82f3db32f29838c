// Maintenance operation reports

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStatus {
    Created,
    AlreadyExists,
}

impl MigrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::Created => "created",
            MigrationStatus::AlreadyExists => "already exists",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub object: String,
    pub status: MigrationStatus,
}

impl MigrationReport {
    pub fn new(object: &str, status: MigrationStatus) -> Self {
        Self {
            object: object.to_string(),
            status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRepairReport {
    pub duplicate_groups: u64,
    pub rows_removed: u64,
    pub index_status: MigrationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupReport {
    pub days_kept: i64,
    pub rows_removed: u64,
    pub batches: u32,
}
