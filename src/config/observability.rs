//! `[logging]` section: filter level and the optional JSON log file

use serde::Deserialize;
use std::path::PathBuf;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// How often the JSON log file starts afresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    const ALL: [LogRotation; 3] = [Self::Hourly, Self::Daily, Self::Never];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter for the crate's own targets; RUST_LOG overrides it
    pub level: String,
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// File names are `<prefix>.<date>` unless rotation is `never`
    pub file_prefix: String,
}

/// Per-user data directory, falling back to a relative `logs` directory
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("regina-tui").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: default_log_dir(),
            file_rotation: LogRotation::Daily,
            file_prefix: "regina-tui".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    /// Resolve the file section; unknown level or rotation names keep the default
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let level = file
            .level
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| LEVELS.contains(&l.as_str()))
            .unwrap_or(defaults.level);
        let file_rotation = file
            .file_rotation
            .as_deref()
            .and_then(LogRotation::from_name)
            .unwrap_or(defaults.file_rotation);
        let file_prefix = file
            .file_prefix
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(defaults.file_prefix);

        Self {
            level,
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file.file_dir.map(PathBuf::from).unwrap_or(defaults.file_dir),
            file_rotation,
            file_prefix,
        }
    }
}
