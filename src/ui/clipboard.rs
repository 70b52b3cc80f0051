//! Clipboard access for the edit actions
//!
//! The system clipboard uses the `arboard` crate for cross-platform support
//! (Windows, macOS, Linux). It is created fresh on each access to avoid
//! holding resources. Headless sessions fall back to an in-memory clipboard.

use anyhow::{Context, Result};

/// Somewhere to put and take text
pub trait Clipboard {
    fn get_text(&mut self) -> Option<String>;

    /// Returns false if the text could not be stored
    fn set_text(&mut self, text: &str) -> bool;
}

/// The system clipboard
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Whether a system clipboard is reachable at all
    pub fn available() -> bool {
        arboard::Clipboard::new().is_ok()
    }

    fn copy_to_clipboard(text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
        clipboard
            .set_text(text)
            .context("Failed to set clipboard text")?;
        Ok(())
    }

    fn paste_from_clipboard() -> Result<String> {
        let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
        clipboard.get_text().context("Failed to read clipboard text")
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        match Self::paste_from_clipboard() {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("Clipboard read failed: {:#}", e);
                None
            }
        }
    }

    fn set_text(&mut self, text: &str) -> bool {
        match Self::copy_to_clipboard(text) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Clipboard write failed: {:#}", e);
                false
            }
        }
    }
}

/// Process-local clipboard
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) -> bool {
        self.text = Some(text.to_string());
        true
    }
}

/// The best clipboard this session can offer
pub fn default_clipboard() -> Box<dyn Clipboard> {
    if SystemClipboard::available() {
        Box::new(SystemClipboard)
    } else {
        tracing::info!("No system clipboard; using an in-memory clipboard");
        Box::new(MemoryClipboard::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_roundtrip() {
        let mut clip = MemoryClipboard::new();
        assert_eq!(clip.get_text(), None);
        assert!(clip.set_text("0 (0123)"));
        assert_eq!(clip.get_text().as_deref(), Some("0 (0123)"));

        let mut seeded = MemoryClipboard::with_text("1 (013)");
        assert_eq!(seeded.get_text().as_deref(), Some("1 (013)"));
    }
}
