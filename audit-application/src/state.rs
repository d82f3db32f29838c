use std::sync::Arc;

use audit_domain::ports::{
    IdentityResolver,
    MaintenanceRepository,
    NotificationSink,
    SettingsRepository,
    SummaryRepository,
    TransferLogRepository,
    WatchlistRepository,
};
use audit_domain::services::{RateMonitor, TransferClassifier};
use audit_domain::{MonitoringConfig, RuntimeConfig, TrackedItemSet, WatchSet};
use tokio::sync::{Mutex, RwLock};

use crate::Metrics;

/// Shared application state.
///
/// The watch set and tracked-item set are stored as `Arc` snapshots behind
/// the lock: ingest clones the Arc under a short read guard and classifies
/// against the snapshot, so administrative writes never stall the hot path
/// beyond that bounded section.
#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub transfer_log: Arc<dyn TransferLogRepository>,
    pub summaries: Arc<dyn SummaryRepository>,
    pub watchlists: Arc<dyn WatchlistRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub maintenance: Arc<dyn MaintenanceRepository>,
    pub notifier: Arc<dyn NotificationSink>,
    pub identity: Arc<dyn IdentityResolver>,
    pub classifier: Arc<Mutex<TransferClassifier>>,
    pub rate_monitor: Arc<RateMonitor>,
    pub monitoring: Arc<RwLock<MonitoringConfig>>,
    pub watch_set: Arc<RwLock<Arc<WatchSet>>>,
    pub tracked_items: Arc<RwLock<Arc<TrackedItemSet>>>,
    pub metrics: Arc<Metrics>,
}
