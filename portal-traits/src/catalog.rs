//! Catalog discovery contract and the data model it produces.
//!
//! ## Overview
//!
//! The portal organizes documents as a three-level hierarchy:
//!
//! ```text
//! Academic year >> Course >> Document category >> Files
//! ```
//!
//! A [`CatalogSource`] implementation performs the network round trips and
//! page parsing that turn that hierarchy into typed values. The engine only
//! ever sees [`Course`], [`CatalogIndex`] and [`RemoteFileEntry`] - never a
//! URL or a DOM node.
//!
//! ## Invariant
//!
//! A category with zero remote documents is never present in a
//! [`CatalogIndex`]: absence of documents is not tracked, and the sync engine
//! will neither create a folder for it nor schedule it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::auth::Session;
use crate::error::Result;

/// Category-name to document-count mapping.
///
/// Shared between the live catalog index, the persisted cache record and the
/// local folder inventory, so the diff engine can compare any two of them.
pub type CategoryCounts = BTreeMap<String, u64>;

/// One course as discovered on the portal.
///
/// Immutable once discovered; owned by the discovery stage and consumed
/// read-only by the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Academic year label, e.g. "2024".
    pub year: String,
    /// Semester number within the year, e.g. "1".
    pub semester: String,
    /// Semester kind suffix, e.g. "s" (semester) or "t" (trimester).
    pub semester_kind: String,
    /// Opaque server identifier for the course.
    pub id: String,
    /// Display name, also used as the local folder name.
    pub name: String,
}

impl Course {
    /// Path component for the semester level, e.g. "1S".
    pub fn folder_name(&self) -> String {
        format!("{}{}", self.semester, self.semester_kind.to_uppercase())
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.year, self.folder_name())
    }
}

/// Live per-course snapshot of category document counts.
///
/// Built fresh from the portal every run and never persisted directly; it is
/// the source of truth the cache record is compared against. Alongside the
/// counts it carries the opaque category identifiers needed to fetch each
/// category's file listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    counts: CategoryCounts,
    ids: HashMap<String, String>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a category observation.
    ///
    /// Zero-count categories are dropped on insertion, upholding the module
    /// invariant that the index only tracks categories that contain documents.
    pub fn insert(&mut self, category: impl Into<String>, category_id: impl Into<String>, count: u64) {
        if count == 0 {
            return;
        }
        let category = category.into();
        self.ids.insert(category.clone(), category_id.into());
        self.counts.insert(category, count);
    }

    /// The category to document-count mapping.
    pub fn counts(&self) -> &CategoryCounts {
        &self.counts
    }

    /// Opaque identifier for a category's file listing, if tracked.
    pub fn category_id(&self, category: &str) -> Option<&str> {
        self.ids.get(category).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

/// One remote file entry from a category listing, not yet resolved locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileEntry {
    /// File name as shown in the listing.
    pub name: String,
    /// Opaque remote locator used by the transfer collaborator.
    pub locator: String,
    /// Expected size in bytes.
    pub size: u64,
    /// Remote last-modified timestamp.
    pub modified_at: DateTime<Utc>,
}

/// Discovery and listing round trips against the portal.
///
/// Every method is a single blocking network+parse round trip and may fail
/// with `Fetch` or `Parse`.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Academic years the session's user is enrolled in, label to year key.
    async fn list_years(&self, session: &Session) -> Result<BTreeMap<String, String>>;

    /// Courses for one academic year.
    async fn list_courses(&self, year_key: &str, session: &Session) -> Result<Vec<Course>>;

    /// The live category index for one course.
    async fn category_index(&self, course: &Course) -> Result<CatalogIndex>;

    /// The ordered file listing of one category.
    async fn category_files(
        &self,
        course: &Course,
        category_id: &str,
    ) -> Result<Vec<RemoteFileEntry>>;
}
