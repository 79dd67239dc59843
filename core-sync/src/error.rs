use portal_traits::PortalError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Login failed after {attempts} attempts")]
    LoginFailed { attempts: u32 },

    #[error("Portal error: {0}")]
    Portal(#[from] PortalError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Target directory {path} is unusable: {source}")]
    TargetUnusable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cache record serialization failed: {0}")]
    Cache(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
