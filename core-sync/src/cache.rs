//! # Cache Store
//!
//! Persisted per-course record of "counts as of the last successful sync".
//!
//! ## Overview
//!
//! One JSON record lives inside each course's local folder, holding the
//! category to document-count mapping last observed on the server. Records
//! are partitioned by course path, so concurrent stage calls from different
//! courses never contend on the same file and no locking is needed.
//!
//! ## Lifecycle
//!
//! - `load` reads the record, falling back to an empty mapping on a missing
//!   or corrupt file (every category then counts as new). A broken cache is
//!   never allowed to fail a run.
//! - `stage` overwrites the record with the live server counts *before* the
//!   implied downloads have completed. This optimistic write keeps the
//!   server diff small on retry; undelivered files are caught by the
//!   independent folder-vs-cache cross-check instead.
//! - `commit` is the end-of-run lifecycle boundary. Writes are already
//!   durable after `stage` (tmp file + rename), so commit only closes out
//!   the staged set; an alternative implementation may buffer in `stage`
//!   and flush here.
//!
//! An interrupted run leaves every record at its last staged state and the
//! previous run's committed records untouched elsewhere - records are only
//! ever overwritten whole, never incrementally merged.

use portal_traits::CategoryCounts;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::error::Result;

/// File name of the per-course cache record.
pub const CACHE_FILE_NAME: &str = ".catalog-cache.json";

/// Persisted category-count records, one per course folder.
#[derive(Debug, Default)]
pub struct CacheStore {
    staged: Mutex<Vec<PathBuf>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the cache record for one course folder.
    ///
    /// A missing file yields an empty mapping; an unreadable or corrupt file
    /// yields an empty mapping with a warning. Never fails the run.
    pub async fn load(&self, course_dir: &Path) -> CategoryCounts {
        let path = course_dir.join(CACHE_FILE_NAME);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache record at {}, starting fresh", path.display());
                return CategoryCounts::new();
            }
            Err(e) => {
                warn!("Could not read cache record {}: {}", path.display(), e);
                return CategoryCounts::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(counts) => counts,
            Err(e) => {
                warn!(
                    "Cache record {} is corrupt ({}); treating every category as new",
                    path.display(),
                    e
                );
                CategoryCounts::new()
            }
        }
    }

    /// Overwrite the cache record for one course folder with the live counts.
    ///
    /// Writes to a temporary sibling and renames it into place, so a crash
    /// mid-write never truncates the previous record.
    pub async fn stage(&self, counts: &CategoryCounts, course_dir: &Path) -> Result<()> {
        let path = course_dir.join(CACHE_FILE_NAME);
        let tmp = course_dir.join(format!("{}.tmp", CACHE_FILE_NAME));

        let raw = serde_json::to_vec_pretty(counts)?;
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Staged cache record {}", path.display());
        self.staged().push(path);
        Ok(())
    }

    /// Finalize all staged records for the run.
    pub fn commit(&self) {
        let mut staged = self.staged();
        info!("Committed {} cache record(s)", staged.len());
        staged.clear();
    }

    /// Number of records staged since the last commit.
    pub fn staged_len(&self) -> usize {
        self.staged().len()
    }

    fn staged(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
