//! Common Utilities Module
//!
//! 通用工具函数集合: extension matching and file-name helpers.

use std::path::Path;

/// 安全地获取文件扩展名（小写）
///
/// # Examples
/// ```
/// use std::path::Path;
/// use sticker_utils::common_utils::get_extension_lowercase;
///
/// assert_eq!(get_extension_lowercase(Path::new("cat.GIF")), "gif");
/// assert_eq!(get_extension_lowercase(Path::new("noext")), "");
/// ```
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// 检查文件扩展名是否在给定列表中（不区分大小写）
///
/// # Examples
/// ```
/// use std::path::Path;
/// use sticker_utils::common_utils::has_extension;
///
/// assert!(has_extension(Path::new("cat.GIF"), &["gif"]));
/// assert!(!has_extension(Path::new("cat.gif.txt"), &["gif"]));
/// ```
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = get_extension_lowercase(path);
    extensions.contains(&ext.as_str())
}

/// File name for log lines; never panics on odd paths.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
