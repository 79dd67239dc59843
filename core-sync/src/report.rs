//! # Run Report
//!
//! Identity and outcome of one sync run.
//!
//! Every run gets a fresh [`RunId`] that tags all of its events, and produces
//! a [`RunReport`] summarizing what actually happened: files and bytes
//! transferred, the distinct folders that received files, and wall-clock
//! timing. A run that transfers nothing still yields a report; partial
//! success is the normal case and is not distinguished from full success
//! here (per-item failures are surfaced as events while the run is live).

use chrono::{DateTime, Utc};
use portal_traits::DownloadReceipt;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Summary of one sync run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub files_transferred: u64,
    pub bytes_transferred: u64,
    folders_touched: BTreeSet<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    /// Start a report for the given run; the clock starts now.
    pub fn begin(run_id: RunId) -> Self {
        Self {
            run_id,
            files_transferred: 0,
            bytes_transferred: 0,
            folders_touched: BTreeSet::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Account for one completed download.
    pub fn record_transfer(&mut self, receipt: &DownloadReceipt) {
        self.files_transferred += 1;
        self.bytes_transferred += receipt.bytes_written;
        if let Some(folder) = receipt.target.parent() {
            self.folders_touched.insert(folder.to_path_buf());
        }
    }

    /// Distinct folders that received at least one file, in sorted order.
    pub fn folders(&self) -> impl Iterator<Item = &PathBuf> {
        self.folders_touched.iter()
    }

    /// Number of distinct folders that received files.
    pub fn folders_touched(&self) -> u64 {
        self.folders_touched.len() as u64
    }

    /// Stop the clock.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration; measured up to now while the run is still live.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: {} file(s), {} in {} folder(s), {}s",
            self.run_id,
            self.files_transferred,
            human_size(self.bytes_transferred),
            self.folders_touched(),
            self.duration().num_seconds()
        )
    }
}

/// Render a byte count with a binary unit suffix.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(target: &str, bytes: u64) -> DownloadReceipt {
        DownloadReceipt {
            target: PathBuf::from(target),
            bytes_written: bytes,
        }
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn test_record_transfer_accumulates() {
        let mut report = RunReport::begin(RunId::new());
        report.record_transfer(&receipt("/tmp/s/2024/1S/OS/Slides/a.pdf", 100));
        report.record_transfer(&receipt("/tmp/s/2024/1S/OS/Slides/b.pdf", 50));
        report.record_transfer(&receipt("/tmp/s/2024/1S/OS/Exams/c.pdf", 25));

        assert_eq!(report.files_transferred, 3);
        assert_eq!(report.bytes_transferred, 175);
        assert_eq!(report.folders_touched(), 2);
    }

    #[test]
    fn test_folders_are_sorted_and_deduplicated() {
        let mut report = RunReport::begin(RunId::new());
        report.record_transfer(&receipt("/tmp/s/b/x.pdf", 1));
        report.record_transfer(&receipt("/tmp/s/a/y.pdf", 1));
        report.record_transfer(&receipt("/tmp/s/b/z.pdf", 1));

        let folders: Vec<_> = report.folders().collect();
        assert_eq!(
            folders,
            vec![&PathBuf::from("/tmp/s/a"), &PathBuf::from("/tmp/s/b")]
        );
    }

    #[test]
    fn test_empty_run_report() {
        let mut report = RunReport::begin(RunId::new());
        report.finish();

        assert_eq!(report.files_transferred, 0);
        assert_eq!(report.bytes_transferred, 0);
        assert_eq!(report.folders_touched(), 0);
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KiB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MiB");
    }
}
