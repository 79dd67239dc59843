//! # Event Bus System
//!
//! Progress reporting for the sync pipeline using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The pipeline emits typed events as it moves through its stages; any number
//! of subscribers (a CLI progress printer, a test harness) can listen
//! independently. Emission is purely observational: the engine never waits on
//! a subscriber and ignores the "no subscribers" error.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, SyncEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Sync(SyncEvent::StageStarted {
//!         run_id: "run-1".to_string(),
//!         stage: 1,
//!         message: "Discovering enrolled courses".to_string(),
//!     }))
//!     .ok();
//! ```
//!
//! ## Error Handling
//!
//! Subscribers may see `RecvError::Lagged(n)` when they fall behind by more
//! than the buffer size; this is non-fatal and they can keep receiving.
//! `RecvError::Closed` signals shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tracing::trace;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Authentication-related events
    Auth(AuthEvent),
    /// Sync pipeline events
    Sync(SyncEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Sync(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthError { .. }) => EventSeverity::Error,
            CoreEvent::Sync(SyncEvent::ItemFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::SignedIn { .. }) => EventSeverity::Info,
            CoreEvent::Sync(SyncEvent::StageStarted { .. }) => EventSeverity::Info,
            CoreEvent::Sync(SyncEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

impl From<AuthEvent> for CoreEvent {
    fn from(event: AuthEvent) -> Self {
        CoreEvent::Auth(event)
    }
}

impl From<SyncEvent> for CoreEvent {
    fn from(event: SyncEvent) -> Self {
        CoreEvent::Sync(event)
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Events related to portal authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Login attempt in progress.
    SigningIn {
        /// Username being authenticated.
        username: String,
        /// Attempt number, starting at 1.
        attempt: u32,
    },
    /// Session established.
    SignedIn {
        /// Username the session belongs to.
        username: String,
    },
    /// Authentication error occurred.
    AuthError {
        /// Username if available.
        username: Option<String>,
        /// Human-readable error message.
        message: String,
        /// Whether another attempt will be made.
        recoverable: bool,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SigningIn { .. } => "Authentication in progress",
            AuthEvent::SignedIn { .. } => "Session established",
            AuthEvent::AuthError { .. } => "Authentication error",
        }
    }
}

// ============================================================================
// Sync Events
// ============================================================================

/// Events emitted by the sync pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A pipeline stage began.
    StageStarted {
        /// The run this event belongs to.
        run_id: String,
        /// Stage number (1 = course discovery, 2 = listing resolution,
        /// 3 = download, 4 = cache commit).
        stage: u8,
        /// Human-readable stage description.
        message: String,
    },
    /// A course was skipped (no documents, or its discovery failed).
    CourseSkipped {
        /// The run this event belongs to.
        run_id: String,
        /// Course display name.
        course: String,
        /// Why the course was skipped.
        reason: String,
    },
    /// A category was flagged for listing resolution.
    CategoryQueued {
        /// The run this event belongs to.
        run_id: String,
        /// Course display name.
        course: String,
        /// Category name.
        category: String,
    },
    /// One file finished downloading.
    FileTransferred {
        /// The run this event belongs to.
        run_id: String,
        /// Local path the file was written to.
        path: String,
        /// Bytes transferred.
        bytes: u64,
    },
    /// One item (course, category or file) failed and was skipped.
    ItemFailed {
        /// The run this event belongs to.
        run_id: String,
        /// Description of the failed item.
        item: String,
        /// Human-readable error message.
        message: String,
    },
    /// The run finished. Partial success is the normal case.
    Completed {
        /// The run this event belongs to.
        run_id: String,
        /// Number of files transferred.
        files_transferred: u64,
        /// Total bytes transferred.
        bytes_transferred: u64,
        /// Number of distinct folders that received files.
        folders_touched: u64,
        /// Wall-clock duration in seconds.
        duration_secs: u64,
    },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::StageStarted { .. } => "Pipeline stage started",
            SyncEvent::CourseSkipped { .. } => "Course skipped",
            SyncEvent::CategoryQueued { .. } => "Category flagged for sync",
            SyncEvent::FileTransferred { .. } => "File transferred",
            SyncEvent::ItemFailed { .. } => "Item failed and was skipped",
            SyncEvent::Completed { .. } => "Run completed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally: multiple producers (clone the
/// bus), multiple independent consumers, non-blocking sends, and lagging
/// detection for slow subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when there are none. Callers that treat events as fire-and-forget
    /// should discard the result with `.ok()`.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        trace!(severity = ?event.severity(), "{}", event.description());
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive future events.
    ///
    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_emission_without_subscribers_errors() {
        let bus = EventBus::new(10);
        let event = CoreEvent::Auth(AuthEvent::SignedIn {
            username: "student".to_string(),
        });

        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(10);
        let mut sub = bus.subscribe();

        let event = CoreEvent::Sync(SyncEvent::StageStarted {
            run_id: "run-1".to_string(),
            stage: 1,
            message: "Discovering enrolled courses".to_string(),
        });

        let result = bus.emit(event.clone());
        assert_eq!(result.unwrap(), 1);

        let received = sub.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Sync(SyncEvent::FileTransferred {
            run_id: "run-1".to_string(),
            path: "2024/1S/OS/Slides/lecture01.pdf".to_string(),
            bytes: 4096,
        });

        bus.emit(event.clone()).ok();

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Sync(SyncEvent::CategoryQueued {
                run_id: "run-1".to_string(),
                course: "OS".to_string(),
                category: format!("cat-{}", i),
            }))
            .ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let error_event = CoreEvent::Auth(AuthEvent::AuthError {
            username: None,
            message: "rejected".to_string(),
            recoverable: false,
        });
        assert_eq!(error_event.severity(), EventSeverity::Error);

        let warn_event = CoreEvent::Sync(SyncEvent::ItemFailed {
            run_id: "run-1".to_string(),
            item: "Slides of OS".to_string(),
            message: "listing fetch failed".to_string(),
        });
        assert_eq!(warn_event.severity(), EventSeverity::Warning);

        let info_event = CoreEvent::Sync(SyncEvent::Completed {
            run_id: "run-1".to_string(),
            files_transferred: 3,
            bytes_transferred: 12_288,
            folders_touched: 2,
            duration_secs: 4,
        });
        assert_eq!(info_event.severity(), EventSeverity::Info);
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = CoreEvent::Sync(SyncEvent::CourseSkipped {
            run_id: "run-1".to_string(),
            course: "Databases".to_string(),
            reason: "no documents".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("Databases"));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn test_event_description() {
        let event = CoreEvent::Sync(SyncEvent::Completed {
            run_id: "run-1".to_string(),
            files_transferred: 0,
            bytes_transferred: 0,
            folders_touched: 0,
            duration_secs: 0,
        });
        assert_eq!(event.description(), "Run completed");
    }
}
