//! Clipboard functionality

use crate::utils::error::TubeloaderError;
use arboard::Clipboard;

/// Get clipboard content
pub fn get_clipboard_content() -> Result<String, TubeloaderError> {
    let mut clipboard = Clipboard::new()
        .map_err(|e| TubeloaderError::Clipboard(format!("Failed to access clipboard: {}", e)))?;

    clipboard
        .get_text()
        .map_err(|e| TubeloaderError::Clipboard(format!("Failed to read clipboard: {}", e)))
}

/// Set clipboard content
pub fn set_clipboard_content(text: &str) -> Result<(), TubeloaderError> {
    let mut clipboard = Clipboard::new()
        .map_err(|e| TubeloaderError::Clipboard(format!("Failed to access clipboard: {}", e)))?;

    clipboard
        .set_text(text)
        .map_err(|e| TubeloaderError::Clipboard(format!("Failed to write clipboard: {}", e)))
}
