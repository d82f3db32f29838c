use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Live dashboard rates, independent of persisted data. Counters reset on
/// process restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub transfers_last_minute: u64,
    pub transfers_per_minute: f64,
    pub suspicious_last_hour: u64,
    pub suspicious_per_hour: f64,
    pub high_value_last_day: u64,
    pub high_value_per_day: f64,
}

/// One fixed-horizon counter: timestamped samples, pruned on record and on
/// read. Each window has its own lock so ingest callers only contend over
/// the counter they touch, and only for the prune/push critical section.
#[derive(Debug)]
struct RateWindow {
    window_ms: i64,
    unit_ms: i64,
    samples: Mutex<VecDeque<i64>>,
}

impl RateWindow {
    fn new(window_ms: i64, unit_ms: i64) -> Self {
        Self {
            window_ms,
            unit_ms,
            samples: Mutex::new(VecDeque::new()),
        }
    }

    fn record(&self, now_ms: i64) {
        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        samples.push_back(now_ms);
        Self::prune(&mut samples, now_ms, self.window_ms);
    }

    fn count(&self, now_ms: i64) -> u64 {
        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        Self::prune(&mut samples, now_ms, self.window_ms);
        samples.len() as u64
    }

    fn rate(&self, count: u64) -> f64 {
        let units = self.window_ms as f64 / self.unit_ms as f64;
        if units <= 0.0 {
            return 0.0;
        }
        count as f64 / units
    }

    fn prune(samples: &mut VecDeque<i64>, now_ms: i64, window_ms: i64) {
        while let Some(front) = samples.front() {
            if now_ms - *front > window_ms {
                samples.pop_front();
            } else {
                break;
            }
        }
    }
}

#[derive(Debug)]
pub struct RateMonitor {
    transfers: RateWindow,
    suspicious: RateWindow,
    high_value: RateWindow,
}

impl Default for RateMonitor {
    fn default() -> Self {
        Self {
            transfers: RateWindow::new(MINUTE_MS, MINUTE_MS),
            suspicious: RateWindow::new(HOUR_MS, HOUR_MS),
            high_value: RateWindow::new(DAY_MS, DAY_MS),
        }
    }
}

impl RateMonitor {
    pub fn record_transfer(&self, now_ms: i64) {
        self.transfers.record(now_ms);
    }

    pub fn record_suspicious(&self, now_ms: i64) {
        self.suspicious.record(now_ms);
    }

    pub fn record_high_value(&self, now_ms: i64) {
        self.high_value.record(now_ms);
    }

    pub fn snapshot(&self, now_ms: i64) -> RateSnapshot {
        let transfers = self.transfers.count(now_ms);
        let suspicious = self.suspicious.count(now_ms);
        let high_value = self.high_value.count(now_ms);
        RateSnapshot {
            transfers_last_minute: transfers,
            transfers_per_minute: self.transfers.rate(transfers),
            suspicious_last_hour: suspicious,
            suspicious_per_hour: self.suspicious.rate(suspicious),
            high_value_last_day: high_value,
            high_value_per_day: self.high_value.rate(high_value),
        }
    }
}
