//! External tool invocation
//!
//! This module provides:
//! - A process runner with a timeout budget and a fire-and-forget mode
//! - Typed wrappers for the `dotnet` commands the tool needs
//! - Parsing of `dotnet list package --outdated` output

mod dotnet;
mod pending;

pub use dotnet::{Dotnet, ADD_TIMEOUT, LIST_TIMEOUT, SHUTDOWN_TIMEOUT};
pub use pending::{parse_updates, parse_with_updates, PendingUpdate};

use crate::error::ProcessError;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// A command line plus the directory and time budget to run it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path
    pub program: String,
    /// Arguments, passed without shell interpretation
    pub args: Vec<String>,
    /// Working directory
    pub directory: PathBuf,
    /// Time budget; zero starts the process without waiting for it
    pub timeout: Duration,
}

impl Invocation {
    /// Create an invocation
    pub fn new<I, S>(program: &str, args: I, directory: &Path, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            directory: directory.to_path_buf(),
            timeout,
        }
    }

    /// Returns true when the caller does not wait for completion
    pub fn is_fire_and_forget(&self) -> bool {
        self.timeout.is_zero()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Trait for running external commands
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the command and return its non-blank stdout lines
    ///
    /// A fire-and-forget invocation returns an empty list as soon as the
    /// process has started.
    async fn run(&self, invocation: &Invocation) -> Result<Vec<String>, ProcessError>;
}

/// Runner that spawns real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Vec<String>, ProcessError> {
        let command_line = invocation.to_string();
        let spawn_error = |source| ProcessError::Spawn {
            command: command_line.clone(),
            directory: invocation.directory.clone(),
            source,
        };

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.directory)
            .stdin(Stdio::null());

        if invocation.is_fire_and_forget() {
            command.stdout(Stdio::null()).stderr(Stdio::null());
            let child = command.spawn().map_err(spawn_error)?;
            debug!(command = %command_line, pid = ?child.id(), "started without waiting");
            return Ok(Vec::new());
        }

        let child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;
        debug!(command = %command_line, directory = %invocation.directory.display(), "running");

        // Dropping the pending wait kills the child
        let output = match tokio::time::timeout(invocation.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(spawn_error)?,
            Err(_) => {
                return Err(ProcessError::Timeout {
                    command: command_line,
                    directory: invocation.directory.clone(),
                    timeout: invocation.timeout,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(ProcessError::NonZeroExit {
                command: command_line,
                directory: invocation.directory.clone(),
                exit_code: output.status.code(),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted runner for unit tests

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Runner that records invocations and replays canned responses
    ///
    /// Responses are matched by the first argument (`list`, `add`, `build`).
    #[derive(Default)]
    pub struct MockRunner {
        responses: Mutex<Vec<(String, VecDeque<Result<Vec<String>, String>>)>>,
        pub calls: Mutex<Vec<Invocation>>,
    }

    impl MockRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, verb: &str, lines: &[&str]) -> Self {
            self.push(verb, Ok(lines.iter().map(|l| l.to_string()).collect()));
            self
        }

        pub fn fail(self, verb: &str, message: &str) -> Self {
            self.push(verb, Err(message.to_string()));
            self
        }

        fn push(&self, verb: &str, response: Result<Vec<String>, String>) {
            let mut responses = self.responses.lock().unwrap();
            match responses.iter_mut().find(|(v, _)| v == verb) {
                Some((_, queue)) => queue.push_back(response),
                None => responses.push((verb.to_string(), VecDeque::from([response]))),
            }
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        pub fn command_lines(&self) -> Vec<String> {
            self.calls().iter().map(|c| c.to_string()).collect()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockRunner {
        async fn run(&self, invocation: &Invocation) -> Result<Vec<String>, ProcessError> {
            self.calls.lock().unwrap().push(invocation.clone());
            let verb = invocation.args.first().cloned().unwrap_or_default();
            let next = self
                .responses
                .lock()
                .unwrap()
                .iter_mut()
                .find(|(v, _)| *v == verb)
                .and_then(|(_, queue)| queue.pop_front());
            match next {
                Some(Ok(lines)) => Ok(lines),
                Some(Err(message)) => Err(ProcessError::NonZeroExit {
                    command: invocation.to_string(),
                    directory: invocation.directory.clone(),
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: message,
                }),
                None => Ok(Vec::new()),
            }
        }
    }
}
