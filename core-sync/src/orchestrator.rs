//! # Sync Orchestrator
//!
//! Composes the collaborators into the three-stage pipeline and owns the
//! run lifecycle.
//!
//! ## Overview
//!
//! A run is scoped to one academic year. The orchestrator fetches the year's
//! course list, fans the courses out through discovery, the flagged
//! categories through listing resolution, and the resolved files through
//! download, then commits the cache and returns a [`RunReport`]. Stages are
//! sequential barriers; work within a stage is concurrent and unordered.
//!
//! ## Error Handling
//!
//! Only three things fail a run: login exhaustion, an unusable target
//! directory, and a failed course-list fetch (nothing can proceed without
//! it). Everything below that is per-item: a course whose index fetch fails,
//! a category whose listing fails, a file whose download fails - each is
//! logged, surfaced as an [`ItemFailed`](core_runtime::events::SyncEvent)
//! event, and skipped. Partial success is the normal case.

use core_runtime::events::{AuthEvent, EventBus, SyncEvent};
use portal_traits::{
    Authenticator, CatalogSource, Course, Credentials, FileDescriptor, FileTransfer, Session,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::cache::CacheStore;
use crate::diff::count_diff;
use crate::error::{Result, SyncError};
use crate::executor::ConcurrentExecutor;
use crate::inventory::count_files_per_category;
use crate::report::{RunId, RunReport};
use crate::task::SyncTask;

// ============================================================================
// Configuration
// ============================================================================

/// Tunables for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Root of the local directory tree.
    pub root: PathBuf,
    /// Parallelism for discovery and listing resolution.
    pub discovery_workers: usize,
    /// Parallelism for downloads; kept lower to avoid saturating the portal.
    pub download_workers: usize,
    /// Bounded login retry budget.
    pub login_attempts: u32,
}

impl SyncConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            discovery_workers: 8,
            download_workers: 4,
            login_attempts: 3,
        }
    }

    pub fn with_discovery_workers(mut self, workers: usize) -> Self {
        self.discovery_workers = workers;
        self
    }

    pub fn with_download_workers(mut self, workers: usize) -> Self {
        self.download_workers = workers;
        self
    }

    pub fn with_login_attempts(mut self, attempts: u32) -> Self {
        self.login_attempts = attempts;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(SyncError::InvalidConfig(
                "root directory must not be empty".to_string(),
            ));
        }
        if self.discovery_workers == 0 {
            return Err(SyncError::InvalidConfig(
                "discovery_workers must be at least 1".to_string(),
            ));
        }
        if self.download_workers == 0 {
            return Err(SyncError::InvalidConfig(
                "download_workers must be at least 1".to_string(),
            ));
        }
        if self.login_attempts == 0 {
            return Err(SyncError::InvalidConfig(
                "login_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// The sync pipeline.
///
/// Cheap to clone; clones share the collaborators, the cache store and the
/// event bus, which is how per-item workers get their own handle for
/// spawned futures.
#[derive(Clone)]
pub struct SyncOrchestrator {
    config: SyncConfig,
    authenticator: Arc<dyn Authenticator>,
    catalog: Arc<dyn CatalogSource>,
    transfer: Arc<dyn FileTransfer>,
    cache: Arc<CacheStore>,
    event_bus: EventBus,
}

impl SyncOrchestrator {
    pub fn new(
        config: SyncConfig,
        authenticator: Arc<dyn Authenticator>,
        catalog: Arc<dyn CatalogSource>,
        transfer: Arc<dyn FileTransfer>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            authenticator,
            catalog,
            transfer,
            cache: Arc::new(CacheStore::new()),
            event_bus: EventBus::default(),
        })
    }

    /// The bus this orchestrator reports progress on.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Establish a session, retrying rejected credentials up to the
    /// configured attempt budget.
    ///
    /// Only credential rejections are retried; fetch and parse faults during
    /// login propagate immediately.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let attempts = self.config.login_attempts;
        for attempt in 1..=attempts {
            self.event_bus
                .emit(
                    AuthEvent::SigningIn {
                        username: credentials.username.clone(),
                        attempt,
                    }
                    .into(),
                )
                .ok();

            match self.authenticator.login(credentials).await {
                Ok(session) => {
                    info!("Signed in as {}", session.username);
                    self.event_bus
                        .emit(
                            AuthEvent::SignedIn {
                                username: session.username.clone(),
                            }
                            .into(),
                        )
                        .ok();
                    return Ok(session);
                }
                Err(e) if e.is_auth() => {
                    warn!("Login attempt {}/{} rejected: {}", attempt, attempts, e);
                    self.event_bus
                        .emit(
                            AuthEvent::AuthError {
                                username: Some(credentials.username.clone()),
                                message: e.to_string(),
                                recoverable: attempt < attempts,
                            }
                            .into(),
                        )
                        .ok();
                }
                Err(e) => {
                    self.event_bus
                        .emit(
                            AuthEvent::AuthError {
                                username: Some(credentials.username.clone()),
                                message: e.to_string(),
                                recoverable: false,
                            }
                            .into(),
                        )
                        .ok();
                    return Err(e.into());
                }
            }
        }
        Err(SyncError::LoginFailed { attempts })
    }

    /// Run the full pipeline for one academic year.
    #[instrument(skip_all, fields(year = %year_key))]
    pub async fn run(&self, session: &Session, year_key: &str) -> Result<RunReport> {
        let run_id = RunId::new();
        let mut report = RunReport::begin(run_id.clone());
        info!("Starting sync run {} for year {}", run_id, year_key);

        tokio::fs::create_dir_all(&self.config.root)
            .await
            .map_err(|e| SyncError::TargetUnusable {
                path: self.config.root.clone(),
                source: e,
            })?;

        // Stage 1: course discovery.
        self.stage_started(&run_id, 1, "Discovering courses and diffing categories");
        let courses = self.catalog.list_courses(year_key, session).await?;
        debug!("{} course(s) listed for year {}", courses.len(), year_key);

        let discovery = ConcurrentExecutor::new(self.config.discovery_workers)
            .with_events(self.event_bus.clone(), run_id.to_string());
        let tasks = discovery
            .run("course discovery", courses, |course| {
                let this = self.clone();
                let run_id = run_id.clone();
                async move { this.plan_course(course, &run_id).await }
            })
            .await;

        // Stage 2: listing resolution.
        self.stage_started(&run_id, 2, "Resolving category listings");
        let descriptors = discovery
            .run("listing resolution", tasks, |task| {
                let this = self.clone();
                async move { this.resolve_category(task).await }
            })
            .await;

        // Stage 3: download.
        self.stage_started(&run_id, 3, "Downloading files");
        let downloads = ConcurrentExecutor::new(self.config.download_workers)
            .with_events(self.event_bus.clone(), run_id.to_string());
        let receipts = downloads
            .run("download", descriptors, |descriptor| {
                let this = self.clone();
                let run_id = run_id.clone();
                async move { this.download_file(descriptor, &run_id).await }
            })
            .await;
        for receipt in &receipts {
            report.record_transfer(receipt);
        }

        // Stage 4: cache commit.
        self.stage_started(&run_id, 4, "Committing cache records");
        self.cache.commit();

        report.finish();
        self.event_bus
            .emit(
                SyncEvent::Completed {
                    run_id: run_id.to_string(),
                    files_transferred: report.files_transferred,
                    bytes_transferred: report.bytes_transferred,
                    folders_touched: report.folders_touched(),
                    duration_secs: report.duration().num_seconds().max(0) as u64,
                }
                .into(),
            )
            .ok();
        info!("{}", report);
        Ok(report)
    }

    /// Discover one course: fetch its live index, diff it against the cache
    /// and the local folder, and emit one task per flagged category.
    #[instrument(skip_all, fields(course = %course))]
    async fn plan_course(&self, course: Course, run_id: &RunId) -> Result<Vec<SyncTask>> {
        let index = self.catalog.category_index(&course).await?;
        if index.is_empty() {
            debug!("{} has no documents, skipping", course);
            self.event_bus
                .emit(
                    SyncEvent::CourseSkipped {
                        run_id: run_id.to_string(),
                        course: course.to_string(),
                        reason: "no documents".to_string(),
                    }
                    .into(),
                )
                .ok();
            return Ok(Vec::new());
        }

        let course_dir = self
            .config
            .root
            .join(&course.year)
            .join(course.folder_name())
            .join(&course.name);
        tokio::fs::create_dir_all(&course_dir).await?;

        let cached = self.cache.load(&course_dir).await;

        // Server diff first; staging the live counts right away keeps the
        // next run's diff small even if this run is interrupted.
        let server_diff = count_diff(Some(index.counts()), Some(&cached));
        if !server_diff.is_empty() {
            self.cache.stage(index.counts(), &course_dir).await?;
        }

        // Folder diff compares the *pre-stage* cache against what is actually
        // on disk, so files lost to a crash or deleted by hand resurface.
        let inventory = count_files_per_category(&course_dir).await?;
        let folder_diff = count_diff(Some(&cached), Some(&inventory));
        if !folder_diff.is_empty() {
            warn!(
                "{}: local folder is behind the cache in {} categorie(s)",
                course,
                folder_diff.len()
            );
        }

        let mut categories: BTreeSet<String> = server_diff.into_keys().collect();
        categories.extend(folder_diff.into_keys());

        let mut tasks = Vec::new();
        for category in categories {
            let Some(category_id) = index.category_id(&category) else {
                warn!(
                    "{}: category {} flagged locally but no longer listed remotely",
                    course, category
                );
                continue;
            };
            self.event_bus
                .emit(
                    SyncEvent::CategoryQueued {
                        run_id: run_id.to_string(),
                        course: course.to_string(),
                        category: category.clone(),
                    }
                    .into(),
                )
                .ok();
            tasks.push(SyncTask {
                category_id: category_id.to_string(),
                category,
                course: course.clone(),
                course_dir: course_dir.clone(),
            });
        }
        debug!("{}: {} categorie(s) flagged", course, tasks.len());
        Ok(tasks)
    }

    /// Resolve one flagged category: fetch its file listing and keep the
    /// entries that are missing or stale locally.
    async fn resolve_category(&self, task: SyncTask) -> Result<Vec<FileDescriptor>> {
        let entries = self
            .catalog
            .category_files(&task.course, &task.category_id)
            .await?;
        let category_dir = task.course_dir.join(&task.category);
        tokio::fs::create_dir_all(&category_dir).await?;

        let mut descriptors = Vec::new();
        for entry in &entries {
            if let Some(descriptor) = self.transfer.resolve_local(entry, &category_dir).await? {
                descriptors.push(descriptor);
            }
        }
        debug!(
            "{}: {} of {} file(s) need fetching",
            task,
            descriptors.len(),
            entries.len()
        );
        Ok(descriptors)
    }

    async fn download_file(
        &self,
        descriptor: FileDescriptor,
        run_id: &RunId,
    ) -> Result<Vec<portal_traits::DownloadReceipt>> {
        let receipt = self.transfer.download(&descriptor).await?;
        self.event_bus
            .emit(
                SyncEvent::FileTransferred {
                    run_id: run_id.to_string(),
                    path: receipt.target.display().to_string(),
                    bytes: receipt.bytes_written,
                }
                .into(),
            )
            .ok();
        Ok(vec![receipt])
    }

    fn stage_started(&self, run_id: &RunId, stage: u8, message: &str) {
        info!("Stage {}: {}", stage, message);
        self.event_bus
            .emit(
                SyncEvent::StageStarted {
                    run_id: run_id.to_string(),
                    stage,
                    message: message.to_string(),
                }
                .into(),
            )
            .ok();
    }
}
