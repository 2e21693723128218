//! Counters describing what a run did.
//!
//! Shared between the detector and display loops, so every counter is atomic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for the current run.
#[derive(Debug)]
pub struct RunStats {
    /// Number of motion samples taken
    samples: AtomicU64,
    /// Number of windows classified
    windows_analyzed: AtomicU64,
    /// Number of windows dropped by outlier filtering
    windows_skipped: AtomicU64,
    /// Number of gestures published
    gestures_emitted: AtomicU64,
    /// Number of publications that failed
    publish_failures: AtomicU64,
    /// Number of events taken from the mailbox and applied
    events_consumed: AtomicU64,
    /// Number of stage frames shown
    stages_rendered: AtomicU64,
    /// Run start time
    run_start: DateTime<Utc>,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            samples: AtomicU64::new(0),
            windows_analyzed: AtomicU64::new(0),
            windows_skipped: AtomicU64::new(0),
            gestures_emitted: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
            events_consumed: AtomicU64::new(0),
            stages_rendered: AtomicU64::new(0),
            run_start: Utc::now(),
        }
    }

    pub fn record_sample(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_analyzed(&self) {
        self.windows_analyzed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_skipped(&self) {
        self.windows_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gesture_emitted(&self) {
        self.gestures_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_consumed(&self) {
        self.events_consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stages_rendered(&self, count: u64) {
        self.stages_rendered.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> RunStatsSnapshot {
        RunStatsSnapshot {
            samples: self.samples.load(Ordering::Relaxed),
            windows_analyzed: self.windows_analyzed.load(Ordering::Relaxed),
            windows_skipped: self.windows_skipped.load(Ordering::Relaxed),
            gestures_emitted: self.gestures_emitted.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            events_consumed: self.events_consumed.load(Ordering::Relaxed),
            stages_rendered: self.stages_rendered.load(Ordering::Relaxed),
            run_start: self.run_start,
            run_duration_secs: (Utc::now() - self.run_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Run Statistics:\n\
             - Motion samples: {}\n\
             - Windows analyzed: {}\n\
             - Windows skipped (outliers): {}\n\
             - Gestures emitted: {}\n\
             - Publish failures: {}\n\
             - Events consumed: {}\n\
             - Stage frames rendered: {}\n\
             - Run duration: {} seconds",
            stats.samples,
            stats.windows_analyzed,
            stats.windows_skipped,
            stats.gestures_emitted,
            stats.publish_failures,
            stats.events_consumed,
            stats.stages_rendered,
            stats.run_duration_secs
        )
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatsSnapshot {
    pub samples: u64,
    pub windows_analyzed: u64,
    pub windows_skipped: u64,
    pub gestures_emitted: u64,
    pub publish_failures: u64,
    pub events_consumed: u64,
    pub stages_rendered: u64,
    pub run_start: DateTime<Utc>,
    pub run_duration_secs: u64,
}

/// Thread-safe shared run statistics.
pub type SharedRunStats = Arc<RunStats>;

/// Create new shared run statistics.
pub fn create_shared_stats() -> SharedRunStats {
    Arc::new(RunStats::new())
}
