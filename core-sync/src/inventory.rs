//! # Local Inventory
//!
//! Ground truth about what is actually on disk for one course folder.
//!
//! The inventory mirrors the cache's shape (category name to document count)
//! but is derived purely from the filesystem, so it catches divergence the
//! cache cannot see: downloads that never landed after a crash, and files the
//! user deleted by hand. Only regular files directly inside each immediate
//! subfolder are counted; nested directories are not descended into, matching
//! the flat category >> files layout the engine writes.

use portal_traits::CategoryCounts;
use std::io;
use std::path::Path;
use tracing::debug;

/// Count the regular files inside each immediate subfolder of `course_dir`.
///
/// Subfolder names become category keys; a subfolder with no files still
/// appears with count zero. Loose files at the top of `course_dir` (such as
/// the cache record) are ignored. A missing `course_dir` yields an empty
/// mapping, never an error.
pub async fn count_files_per_category(course_dir: &Path) -> io::Result<CategoryCounts> {
    let mut dirs = match tokio::fs::read_dir(course_dir).await {
        Ok(dirs) => dirs,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No local folder at {} yet", course_dir.display());
            return Ok(CategoryCounts::new());
        }
        Err(e) => return Err(e),
    };

    let mut counts = CategoryCounts::new();
    while let Some(entry) = dirs.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let category = entry.file_name().to_string_lossy().into_owned();

        let mut files = tokio::fs::read_dir(entry.path()).await?;
        let mut count = 0u64;
        while let Some(file) = files.next_entry().await? {
            if file.file_type().await?.is_file() {
                count += 1;
            }
        }
        counts.insert(category, count);
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_course_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("inventory-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_missing_folder_is_empty() {
        let dir = std::env::temp_dir().join(format!("inventory-missing-{}", Uuid::new_v4()));
        assert!(count_files_per_category(&dir).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counts_files_per_subfolder() {
        let dir = temp_course_dir();
        std::fs::create_dir(dir.join("Slides")).unwrap();
        std::fs::write(dir.join("Slides/week1.pdf"), b"x").unwrap();
        std::fs::write(dir.join("Slides/week2.pdf"), b"x").unwrap();
        std::fs::create_dir(dir.join("Exercises")).unwrap();
        std::fs::write(dir.join("Exercises/sheet1.pdf"), b"x").unwrap();

        let counts = count_files_per_category(&dir).await.unwrap();
        assert_eq!(counts.get("Slides"), Some(&2));
        assert_eq!(counts.get("Exercises"), Some(&1));
        assert_eq!(counts.len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_empty_subfolder_counts_zero() {
        let dir = temp_course_dir();
        std::fs::create_dir(dir.join("Exams")).unwrap();

        let counts = count_files_per_category(&dir).await.unwrap();
        assert_eq!(counts.get("Exams"), Some(&0));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_loose_files_and_nested_dirs_ignored() {
        let dir = temp_course_dir();
        std::fs::write(dir.join(".catalog-cache.json"), b"{}").unwrap();
        std::fs::create_dir_all(dir.join("Slides/archive")).unwrap();
        std::fs::write(dir.join("Slides/week1.pdf"), b"x").unwrap();
        std::fs::write(dir.join("Slides/archive/old.pdf"), b"x").unwrap();

        let counts = count_files_per_category(&dir).await.unwrap();
        // Loose top-level files produce no key; nested dirs do not add counts.
        assert_eq!(counts.get("Slides"), Some(&1));
        assert_eq!(counts.len(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
