//! Unit of work flowing between pipeline stages.

use portal_traits::Course;
use std::fmt;
use std::path::PathBuf;

/// One category of one course flagged for listing resolution.
///
/// Produced by course discovery, consumed by listing resolution. Carries
/// everything the next stage needs so no shared lookup tables survive the
/// stage boundary.
#[derive(Debug, Clone)]
pub struct SyncTask {
    /// Category name as shown on the portal (becomes the subfolder name).
    pub category: String,
    /// Opaque portal identifier used to fetch the category's file listing.
    pub category_id: String,
    /// The course this category belongs to.
    pub course: Course,
    /// Absolute path of the course's local folder.
    pub course_dir: PathBuf,
}

impl fmt::Display for SyncTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.category, self.course.name)
    }
}
