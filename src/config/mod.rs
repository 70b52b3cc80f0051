//! Configuration for the packet workspace
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/regina-tui/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod preferences;
mod serialization;
mod tabs;
mod tools;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use preferences::{Preferences, TabFamily};
pub use tabs::{FileTabs, TabsConfig};
pub use tools::{
    EditorConfig, FileEditor, FileGap, FileGraphviz, FilePdf, GapConfig, GraphvizConfig,
    PdfConfig,
};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable names
pub const ENV_GRAPHVIZ: &str = "REGINA_TUI_GRAPHVIZ";
pub const ENV_GAP: &str = "REGINA_TUI_GAP";
pub const ENV_PDF_VIEWER: &str = "REGINA_TUI_PDF_VIEWER";
pub const ENV_READ_ONLY: &str = "REGINA_TUI_READ_ONLY";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Colour theme: "dark" or "light"
    pub theme: String,

    /// Open documents read-only (runtime flag, never persisted)
    pub read_only: bool,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// PDF viewer behaviour
    pub pdf: PdfConfig,

    /// Face pairing graph rendering
    pub graphviz: GraphvizConfig,

    /// Group presentation simplification
    pub gap: GapConfig,

    /// Text editing
    pub editor: EditorConfig,

    /// Last selected tab in each family of tabbed viewers
    pub tabs: TabsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            read_only: false,
            logging: LoggingConfig::default(),
            pdf: PdfConfig::default(),
            graphviz: GraphvizConfig::default(),
            gap: GapConfig::default(),
            editor: EditorConfig::default(),
            tabs: TabsConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub theme: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,

    /// Optional [pdf] section
    pub pdf: Option<FilePdf>,

    /// Optional [graphviz] section
    pub graphviz: Option<FileGraphviz>,

    /// Optional [gap] section
    pub gap: Option<FileGap>,

    /// Optional [editor] section
    pub editor: Option<FileEditor>,

    /// Optional [tabs] section
    pub tabs: Option<FileTabs>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/regina-tui/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("regina-tui").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load the config file if it exists
    ///
    /// A missing file yields defaults. A file that exists but cannot be read
    /// or parsed is an error: a broken config should fail loudly rather than
    /// silently fall back to defaults.
    fn load_file_config() -> Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn load() -> Result<Self> {
        let file = Self::load_file_config()?;
        Ok(Self::from_sources(file, |name| std::env::var(name).ok()))
    }

    /// Merge a parsed file with environment lookups
    pub(crate) fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let theme = file.theme.unwrap_or_else(|| "dark".to_string());

        // Read-only: env only (runtime flag)
        let read_only = env(ENV_READ_ONLY)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let logging = LoggingConfig::from_file(file.logging);
        let mut pdf = PdfConfig::from_file(file.pdf);
        let mut graphviz = GraphvizConfig::from_file(file.graphviz);
        let mut gap = GapConfig::from_file(file.gap);
        let editor = EditorConfig::from_file(file.editor);
        let tabs = TabsConfig::from_file(file.tabs);

        // Executable overrides: env > file > default
        if let Some(viewer) = env(ENV_PDF_VIEWER) {
            pdf.external_viewer = viewer;
        }
        if let Some(dot) = env(ENV_GRAPHVIZ) {
            graphviz.executable = dot;
        }
        if let Some(exe) = env(ENV_GAP) {
            gap.executable = exe;
        }

        Self {
            theme,
            read_only,
            logging,
            pdf,
            graphviz,
            gap,
            editor,
            tabs,
        }
    }

    /// Write the current settings back to the config file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("No home directory for config file")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, self.to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Saved preferences to {}", path.display());
        Ok(())
    }
}
