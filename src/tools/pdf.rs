//! Handing PDF packets to a viewer

use super::{resolve_executable, ExternalProcess, LaunchMode, ToolError};
use crate::config::PdfConfig;
use regex::bytes::Regex;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tempfile::NamedTempFile;

/// Write PDF bytes to a fresh temp file that lives as long as the handle
pub fn write_temp(data: &[u8]) -> Result<NamedTempFile, ToolError> {
    let mut file = tempfile::Builder::new()
        .prefix("regina-")
        .suffix(".pdf")
        .tempfile()?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}

/// The platform's "open with default application" command
fn platform_opener() -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("open", vec![])
    } else if cfg!(windows) {
        ("cmd", vec!["/C".to_string(), "start".to_string(), String::new()])
    } else {
        ("xdg-open", vec![])
    }
}

/// Launch a viewer on `path`
///
/// A configured viewer runs attached when `auto_close` is set (so closing
/// the pane closes it) and detached otherwise. The platform opener hands
/// the file to another program and returns, so it always runs detached.
pub fn launch_viewer(config: &PdfConfig, path: &Path) -> Result<ExternalProcess, ToolError> {
    let file_arg = path.display().to_string();
    let configured = config.external_viewer.trim();

    if configured.is_empty() {
        let (opener, mut args) = platform_opener();
        let program = resolve_executable(opener)?;
        args.push(file_arg);
        return ExternalProcess::spawn(&program, &args, LaunchMode::Detached);
    }

    let mut words = configured.split_whitespace();
    let program = resolve_executable(words.next().unwrap_or(configured))?;
    let mut args: Vec<String> = words.map(str::to_string).collect();
    args.push(file_arg);

    let mode = if config.auto_close {
        LaunchMode::Attached
    } else {
        LaunchMode::Detached
    };
    ExternalProcess::spawn(&program, &args, mode)
}

/// PDF version from the file header, e.g. "1.7"
pub fn version(data: &[u8]) -> Option<String> {
    let header = data.get(..16)?;
    let text = String::from_utf8_lossy(header);
    let rest = text.strip_prefix("%PDF-")?;
    let version: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    (!version.is_empty()).then_some(version)
}

/// Rough page count from `/Type /Page` objects
pub fn page_count(data: &[u8]) -> usize {
    static PAGE: OnceLock<Option<Regex>> = OnceLock::new();
    PAGE.get_or_init(|| Regex::new(r"/Type\s*/Page([^s]|$)").ok())
        .as_ref()
        .map(|re| re.find_iter(data).count())
        .unwrap_or(0)
}
