//! # Incremental Sync Engine
//!
//! Keeps a local directory tree synchronized with a remote course-document
//! catalog organized as year >> course >> category >> files.
//!
//! ## Overview
//!
//! Each run detects which categories contain documents not yet present
//! locally, fetches only those, and converges toward the server's state
//! without re-downloading unchanged content. Correctness under partial
//! failure (a crashed run, a failed download, a manually deleted file) comes
//! from comparing two independent sources against the persisted cache:
//! the live server counts and the actual on-disk file counts.
//!
//! ## Components
//!
//! - **Diff Engine** (`diff`): Pure comparison of two category-count mappings
//! - **Cache Store** (`cache`): Persisted per-course count record
//! - **Local Inventory** (`inventory`): On-disk file counts per category
//! - **Concurrent Executor** (`executor`): Bounded fan-out with per-item failure isolation
//! - **Sync Orchestrator** (`orchestrator`): The three-stage pipeline
//!
//! ## Pipeline
//!
//! 1. Course discovery: fetch each course's live category index, diff it
//!    against the cache and the local folder, and emit one task per flagged
//!    category.
//! 2. Listing resolution: fetch each flagged category's file listing and
//!    resolve each entry against the local folder.
//! 3. Download: fetch the resolved files under a smaller parallelism limit.
//!
//! Stages are sequential barriers; work within a stage is unordered and
//! concurrent. A failure anywhere below the run level is logged and skipped,
//! never fatal: partial success is the normal case.

pub mod cache;
pub mod diff;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod orchestrator;
pub mod report;
pub mod task;

pub use cache::{CacheStore, CACHE_FILE_NAME};
pub use diff::count_diff;
pub use error::{Result, SyncError};
pub use executor::ConcurrentExecutor;
pub use inventory::count_files_per_category;
pub use orchestrator::{SyncConfig, SyncOrchestrator};
pub use report::{RunId, RunReport};
pub use task::SyncTask;
