//! Local resolution and byte-transfer contract.
//!
//! The engine decides *which categories* need attention; the transfer
//! collaborator decides *which files* within them are actually missing and
//! performs the download. The engine guarantees `resolve_local` is only ever
//! asked about files in categories the diff stage flagged as changed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::RemoteFileEntry;
use crate::error::Result;

/// A resolved, not-yet-downloaded remote file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Local path the file will be written to.
    pub target: PathBuf,
    /// Opaque remote locator.
    pub locator: String,
    /// Expected size in bytes.
    pub expected_size: u64,
    /// Remote last-modified timestamp.
    pub modified_at: DateTime<Utc>,
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target.display())
    }
}

/// Outcome of one completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    /// Local path the file was written to.
    pub target: PathBuf,
    /// Bytes actually transferred.
    pub bytes_written: u64,
}

/// Resolution and transfer of individual files.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// Compare a remote entry against `target_dir`.
    ///
    /// Returns `None` when the local copy already matches (skip), or a
    /// [`FileDescriptor`] for the fetch stage. The matching policy (name,
    /// size, timestamp) belongs to the implementation.
    async fn resolve_local(
        &self,
        entry: &RemoteFileEntry,
        target_dir: &Path,
    ) -> Result<Option<FileDescriptor>>;

    /// Fetch one resolved file.
    ///
    /// # Errors
    ///
    /// Fails with [`PortalError::Transfer`](crate::PortalError::Transfer),
    /// scoped to this file only.
    async fn download(&self, descriptor: &FileDescriptor) -> Result<DownloadReceipt>;
}
