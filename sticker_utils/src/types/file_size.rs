//! FileSize Type-Safe Wrapper

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// 类型安全的文件大小（字节）
///
/// # Examples
/// ```
/// use sticker_utils::types::file_size::FileSize;
///
/// let size = FileSize::from_kb(256);
/// assert_eq!(size.bytes(), 262144);
/// assert_eq!(size.display(), "256.00 KB");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSize(u64);

impl FileSize {
    pub const ZERO: FileSize = FileSize(0);

    pub const KB: u64 = 1024;
    pub const MB: u64 = 1024 * 1024;

    #[inline]
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn from_kb(kb: u64) -> Self {
        Self(kb * Self::KB)
    }

    #[inline]
    pub const fn bytes(&self) -> u64 {
        self.0
    }

    /// Size of the file at `path` as reported by the file system.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        std::fs::metadata(path).map(|m| Self(m.len()))
    }

    #[inline]
    pub fn fits_within(&self, budget: FileSize) -> bool {
        self.0 <= budget.0
    }

    /// 计算压缩比（处理零除）
    pub fn compression_ratio(&self, original: FileSize) -> Option<f64> {
        if original.0 == 0 {
            None
        } else {
            Some(self.0 as f64 / original.0 as f64)
        }
    }

    /// 格式化显示（自动选择单位）
    pub fn display(&self) -> String {
        if self.0 >= Self::MB {
            format!("{:.2} MB", self.0 as f64 / Self::MB as f64)
        } else if self.0 >= Self::KB {
            format!("{:.2} KB", self.0 as f64 / Self::KB as f64)
        } else {
            format!("{} B", self.0)
        }
    }
}

impl fmt::Debug for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileSize({})", self.0)
    }
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_within_is_inclusive() {
        let budget = FileSize::from_kb(256);
        assert!(FileSize::new(262_144).fits_within(budget));
        assert!(!FileSize::new(262_145).fits_within(budget));
        assert!(FileSize::ZERO.fits_within(budget));
    }

    #[test]
    fn test_display_units() {
        assert_eq!(FileSize::new(512).display(), "512 B");
        assert_eq!(FileSize::new(1536).display(), "1.50 KB");
        assert_eq!(FileSize::new(3 * FileSize::MB).display(), "3.00 MB");
    }

    #[test]
    fn test_compression_ratio_zero_original() {
        assert!(FileSize::new(10).compression_ratio(FileSize::ZERO).is_none());
        let ratio = FileSize::new(50).compression_ratio(FileSize::new(100)).unwrap();
        assert!((ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_of_reads_metadata() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("clip.webm");
        std::fs::write(&path, vec![0u8; 1234]).unwrap();
        assert_eq!(FileSize::of(&path).unwrap().bytes(), 1234);
        assert!(FileSize::of(&dir.path().join("missing.webm")).is_err());
    }
}
