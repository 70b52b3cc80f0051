//! Long-lived external viewer processes owned by a pane

use super::{command_line, ToolError};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// How long a child has to keep running before it counts as started
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// What happens to the child when its owner goes away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Killed when the owning pane is torn down
    Attached,
    /// Left running; we only remember that we started it
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    /// Exited cleanly
    Finished,
    /// Exited with a non-zero status, or was killed by a signal
    Failed { exit_code: Option<i32> },
}

/// A spawned viewer process
#[derive(Debug)]
pub struct ExternalProcess {
    command: String,
    mode: LaunchMode,
    child: Option<Child>,
    started: Instant,
    startup_timeout: Duration,
}

impl ExternalProcess {
    pub fn spawn(program: &Path, args: &[String], mode: LaunchMode) -> Result<Self, ToolError> {
        let command = command_line(program, args);
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ToolError::NotStartable {
                command: command.clone(),
                source,
            })?;
        tracing::info!("Started {:?} viewer: {}", mode, command);
        Ok(Self {
            command,
            mode,
            child: Some(child),
            started: Instant::now(),
            startup_timeout: STARTUP_TIMEOUT,
        })
    }

    /// Replace the default startup window
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    /// Whether the child has stayed up for the whole startup window
    pub fn is_started(&self) -> bool {
        self.child.is_some() && self.started.elapsed() >= self.startup_timeout
    }

    /// Check on the child without blocking
    pub fn poll(&mut self) -> ProcessState {
        let Some(child) = self.child.as_mut() else {
            return ProcessState::Finished;
        };
        match child.try_wait() {
            Ok(None) => ProcessState::Running,
            Ok(Some(status)) => {
                self.child = None;
                if status.success() {
                    ProcessState::Finished
                } else {
                    tracing::warn!(
                        command = %self.command,
                        code = ?status.code(),
                        "External program failed"
                    );
                    ProcessState::Failed {
                        exit_code: status.code(),
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Lost track of {}: {}", self.command, e);
                self.child = None;
                ProcessState::Finished
            }
        }
    }

    /// Stop the child now, whatever the launch mode
    pub fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("Killed {}", self.command);
        }
    }
}

impl Drop for ExternalProcess {
    fn drop(&mut self) {
        match self.mode {
            LaunchMode::Attached => self.kill(),
            LaunchMode::Detached => {
                // Dropping a std Child does not kill it.
                if self.child.take().is_some() {
                    tracing::debug!("Disowning {}", self.command);
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::tools::resolve_executable;

    #[test]
    fn test_quick_failure_is_reported() {
        let Ok(sh) = resolve_executable("sh") else {
            return;
        };
        let mut proc = ExternalProcess::spawn(
            &sh,
            &["-c".to_string(), "exit 3".to_string()],
            LaunchMode::Attached,
        )
        .expect("spawn sh");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut state = proc.poll();
        while state == ProcessState::Running && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            state = proc.poll();
        }
        assert_eq!(state, ProcessState::Failed { exit_code: Some(3) });
    }

    #[test]
    fn test_failure_after_startup_is_reported() {
        let Ok(sh) = resolve_executable("sh") else {
            return;
        };
        let mut proc = ExternalProcess::spawn(
            &sh,
            &["-c".to_string(), "sleep 1; exit 3".to_string()],
            LaunchMode::Attached,
        )
        .expect("spawn sh")
        .with_startup_timeout(Duration::from_millis(100));
        assert!(!proc.is_started());

        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(proc.poll(), ProcessState::Running);
        assert!(proc.is_started());

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut state = proc.poll();
        while state == ProcessState::Running && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            state = proc.poll();
        }
        assert_eq!(state, ProcessState::Failed { exit_code: Some(3) });
        assert!(!proc.is_started());
    }

    #[test]
    fn test_clean_exit_is_finished() {
        let Ok(sh) = resolve_executable("sh") else {
            return;
        };
        let mut proc = ExternalProcess::spawn(
            &sh,
            &["-c".to_string(), "exit 0".to_string()],
            LaunchMode::Detached,
        )
        .expect("spawn sh");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut state = proc.poll();
        while state == ProcessState::Running && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            state = proc.poll();
        }
        assert_eq!(state, ProcessState::Finished);
    }

    #[test]
    fn test_attached_child_is_killed_on_drop() {
        let Ok(sleep) = resolve_executable("sleep") else {
            return;
        };
        let proc = ExternalProcess::spawn(&sleep, &["30".to_string()], LaunchMode::Attached)
            .expect("spawn sleep");
        let started = Instant::now();
        drop(proc);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
