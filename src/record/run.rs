//! Run-scoped sample history.
//!
//! Owned by the detector loop for the lifetime of one run and written to disk
//! once at the end.

use crate::capture::types::Sample;
use crate::core::filter::FilteredWindow;
use crate::record::stats::RunStatsSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Every raw and filtered sample of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique identifier of this run
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub raw_x: Vec<i32>,
    pub raw_y: Vec<i32>,
    pub filtered_x: Vec<i32>,
    pub filtered_y: Vec<i32>,
    /// Counters at the end of the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStatsSnapshot>,
}

impl RunRecord {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            raw_x: Vec::new(),
            raw_y: Vec::new(),
            filtered_x: Vec::new(),
            filtered_y: Vec::new(),
            stats: None,
        }
    }

    pub fn push_raw(&mut self, sample: Sample) {
        self.raw_x.push(sample.x);
        self.raw_y.push(sample.y);
    }

    pub fn push_filtered(&mut self, window: &FilteredWindow) {
        self.filtered_x.extend_from_slice(&window.x);
        self.filtered_y.extend_from_slice(&window.y);
    }

    /// Stamp the end of the run.
    pub fn finish(&mut self, stats: RunStatsSnapshot) {
        self.finished_at = Some(Utc::now());
        self.stats = Some(stats);
    }

    /// Default dump location inside `data_dir`.
    pub fn dump_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!(
            "run_{}.json",
            self.started_at.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Write the record as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for RunRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::stats::RunStats;

    #[test]
    fn test_record_accumulates() {
        let mut record = RunRecord::new();
        record.push_raw(Sample::new(1, 2));
        record.push_raw(Sample::new(3, 4));
        record.push_filtered(&FilteredWindow {
            x: vec![3],
            y: vec![2, 4],
        });

        assert_eq!(record.raw_x, vec![1, 3]);
        assert_eq!(record.raw_y, vec![2, 4]);
        assert_eq!(record.filtered_x, vec![3]);
        assert_eq!(record.filtered_y, vec![2, 4]);
    }

    #[test]
    fn test_save_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = RunRecord::new();
        record.push_raw(Sample::new(10, 20));
        record.finish(RunStats::new().snapshot());

        let path = record.dump_path(dir.path());
        record.save(&path).unwrap();

        let loaded: RunRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.run_id, record.run_id);
        assert_eq!(loaded.raw_x, vec![10]);
        assert!(loaded.finished_at.is_some());
    }
}
