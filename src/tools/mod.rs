//! External tools: PDF viewers, Graphviz and GAP
//!
//! Everything here runs outside the UI's control, so every entry point
//! returns a [`ToolError`] that the calling viewer turns into a dialog.
//! Synchronous runs are bounded by a timeout; long-lived viewers are wrapped
//! in [`ExternalProcess`] and owned by the pane that started them.

pub mod gap;
pub mod graphviz;
pub mod pdf;
mod process;

pub use process::{ExternalProcess, LaunchMode, ProcessState, STARTUP_TIMEOUT};

use crate::error::UiError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("could not find \"{program}\" on the search path")]
    NotFound { program: String },

    #[error("\"{path}\" does not exist")]
    NotExist { path: PathBuf },

    #[error("\"{path}\" is not an executable file")]
    NotExecutable { path: PathBuf },

    #[error("could not start {command}: {source}")]
    NotStartable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} did not finish within {seconds}s")]
    TimedOut { command: String, seconds: u64 },

    #[error("{command} exited with status {exit_code:?}")]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected output from {command}: {detail}")]
    BadOutput { command: String, detail: String },
}

impl From<ToolError> for UiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Failed {
                command,
                exit_code,
                stderr,
            } => UiError::ExternalTool {
                command,
                exit_code,
                detail: stderr.lines().next().unwrap_or_default().to_string(),
            },
            ToolError::NotStartable { command, source } => UiError::ExternalTool {
                command,
                exit_code: None,
                detail: source.to_string(),
            },
            ToolError::TimedOut { command, seconds } => UiError::ExternalTool {
                command,
                exit_code: None,
                detail: format!("It was stopped after {seconds} seconds."),
            },
            other => UiError::ExternalTool {
                command: other.program_hint(),
                exit_code: None,
                detail: other.to_string(),
            },
        }
    }
}

impl ToolError {
    fn program_hint(&self) -> String {
        match self {
            Self::NotFound { program } => program.clone(),
            Self::NotExist { path } | Self::NotExecutable { path } => path.display().to_string(),
            Self::BadOutput { command, .. } => command.clone(),
            _ => String::new(),
        }
    }
}

/// Turn a configured executable into a full path
///
/// Names without a directory component are searched for on `PATH`; explicit
/// paths must exist and be executable.
pub fn resolve_executable(program: &str) -> Result<PathBuf, ToolError> {
    let program = program.trim();
    let path = Path::new(program);
    if path.components().count() <= 1 && !path.is_absolute() {
        return which::which(program).map_err(|_| ToolError::NotFound {
            program: program.to_string(),
        });
    }

    let metadata = std::fs::metadata(path).map_err(|_| ToolError::NotExist {
        path: path.to_path_buf(),
    })?;
    if !metadata.is_file() || !is_executable(&metadata) {
        return Err(ToolError::NotExecutable {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Human-readable command line for messages
pub fn command_line(program: &Path, args: &[String]) -> String {
    std::iter::once(program.display().to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Output of a finished synchronous run
#[derive(Debug, Clone)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Run a program to completion with a deadline, feeding `stdin` and capturing output
///
/// Output pipes are drained on helper threads so a chatty child cannot block
/// on a full pipe while we wait for it. A run that misses the deadline is
/// killed.
pub fn run_captured(
    program: &Path,
    args: &[String],
    stdin: Option<&str>,
    timeout: Duration,
) -> Result<Captured, ToolError> {
    let command = command_line(program, args);
    tracing::debug!("Running {}", command);

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolError::NotStartable {
            command: command.clone(),
            source,
        })?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        // Dropping the pipe afterwards closes the child's stdin.
        pipe.write_all(input.as_bytes())?;
    }

    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::TimedOut {
                command,
                seconds: timeout.as_secs(),
            });
        }
    };

    let collect = |handle: Option<std::thread::JoinHandle<String>>| {
        handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default()
    };
    Ok(Captured {
        stdout: collect(stdout),
        stderr: collect(stderr),
        exit_code: status.code(),
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}
