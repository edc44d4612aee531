//! External tool detection

use crate::errors::{Result, StickerError};

pub fn is_tool_available(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Fails with `ToolNotFound` for the first missing tool.
pub fn require_tools(names: &[&str]) -> Result<()> {
    for name in names {
        if !is_tool_available(name) {
            return Err(StickerError::ToolNotFound(format!(
                "{} not found on PATH. Install with: brew install ffmpeg / apt install ffmpeg",
                name
            )));
        }
    }
    Ok(())
}
