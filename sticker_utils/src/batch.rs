//! Batch Processing Module
//!
//! Flat folder scans and per-stage success/failure tallies.

use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::common_utils::{display_name, has_extension};

pub const GIF_EXTENSIONS: &[&str] = &["gif"];

pub const WEBM_EXTENSIONS: &[&str] = &["webm"];

/// Regular files directly inside `dir`, sorted by file name. A missing or
/// unreadable folder yields nothing.
fn flat_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
}

/// Files in `dir` whose extension is one of `extensions` (case-insensitive).
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    flat_files(dir)
        .filter(|p| has_extension(p, extensions))
        .collect()
}

/// Every regular file in `dir`, regardless of extension.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    flat_files(dir).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFailure {
    pub file: String,
    pub error: String,
}

/// 单个阶段的统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<StageFailure>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn fail(&mut self, path: &Path, error: impl ToString) {
        self.total += 1;
        self.failed += 1;
        self.failures.push(StageFailure {
            file: display_name(path),
            error: error.to_string(),
        });
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| display_name(p)).collect()
    }

    #[test]
    fn test_collect_files_is_flat_sorted_and_case_insensitive() {
        let dir = TempDir::new().unwrap();
        for name in ["b.gif", "a.GIF", "c.webm", "notes.txt", "d.gif.bak"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.gif")).unwrap();
        fs::write(dir.path().join("nested.gif").join("e.gif"), b"x").unwrap();

        assert_eq!(names(&collect_files(dir.path(), GIF_EXTENSIONS)), vec!["a.GIF", "b.gif"]);
        assert_eq!(names(&collect_files(dir.path(), WEBM_EXTENSIONS)), vec!["c.webm"]);
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(collect_files(&dir.path().join("nope"), GIF_EXTENSIONS).is_empty());
        assert!(collect_all_files(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_collect_all_files_skips_folders() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("y.txt"), b"y").unwrap();
        fs::write(dir.path().join("x.webm"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert_eq!(names(&collect_all_files(dir.path())), vec!["x.webm", "y.txt"]);
    }

    #[test]
    fn test_batch_result_records_failures_by_name() {
        let mut result = BatchResult::new();
        result.success();
        assert!(result.all_succeeded());

        result.fail(Path::new("gifs/bad.gif"), "No frames found");
        assert_eq!((result.total, result.succeeded, result.failed), (2, 1, 1));
        assert!(!result.all_succeeded());
        assert_eq!(
            result.failures,
            vec![StageFailure {
                file: "bad.gif".to_string(),
                error: "No frames found".to_string(),
            }]
        );
    }
}
