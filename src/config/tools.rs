//! External tool and editor settings
//!
//! Each section has a runtime struct with defaults and a `File*` twin where
//! every field is optional, mirroring how the file is parsed.

use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// PDF
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PdfConfig {
    /// Kill the external viewer when the pane closes (attached mode)
    pub auto_close: bool,
    /// Show document details inside the pane instead of launching a viewer on open
    pub embed: bool,
    /// External viewer command; empty means the platform default opener
    pub external_viewer: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            auto_close: true,
            embed: true,
            external_viewer: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FilePdf {
    pub auto_close: Option<bool>,
    pub embed: Option<bool>,
    pub external_viewer: Option<String>,
}

impl PdfConfig {
    pub fn from_file(file: Option<FilePdf>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            auto_close: file.auto_close.unwrap_or(defaults.auto_close),
            embed: file.embed.unwrap_or(defaults.embed),
            external_viewer: file.external_viewer.unwrap_or(defaults.external_viewer),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graphviz
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GraphvizConfig {
    /// Layout program; "neato" and "dot" are both understood
    pub executable: String,
    /// Label graph nodes with simplex numbers
    pub labels: bool,
}

impl Default for GraphvizConfig {
    fn default() -> Self {
        Self {
            executable: "neato".to_string(),
            labels: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileGraphviz {
    pub executable: Option<String>,
    pub labels: Option<bool>,
}

impl GraphvizConfig {
    pub fn from_file(file: Option<FileGraphviz>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            executable: file.executable.unwrap_or(defaults.executable),
            labels: file.labels.unwrap_or(defaults.labels),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GAP
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct GapConfig {
    pub executable: String,
    /// Seconds to wait for GAP before giving up
    pub timeout_secs: u64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            executable: "gap".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileGap {
    pub executable: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl GapConfig {
    pub fn from_file(file: Option<FileGap>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            executable: file.executable.unwrap_or(defaults.executable),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Track edits in text areas; when off, panes treat writable text as always dirty
    pub track_changes: bool,
    pub tab_width: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            track_changes: true,
            tab_width: 4,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileEditor {
    pub track_changes: Option<bool>,
    pub tab_width: Option<usize>,
}

impl EditorConfig {
    pub fn from_file(file: Option<FileEditor>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();
        Self {
            track_changes: file.track_changes.unwrap_or(defaults.track_changes),
            tab_width: file.tab_width.unwrap_or(defaults.tab_width).clamp(1, 16),
        }
    }
}
