//! External command execution
//!
//! Every call out to `gcloud` or `helm` goes through a [`Runner`] handed to
//! the component at construction, so tests can swap in [`MockRunner`].

use std::collections::HashMap;
use std::process::Command;
use std::sync::{Arc, RwLock};

use crate::error::CommandError;

/// Runs an external program and captures its standard output
pub trait Runner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, CommandError>;
}

/// Render a command line for logs and error messages
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs real child processes, blocking until they exit
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, CommandError> {
        tracing::debug!(command = %command_line(program, args), "running command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: command_line(program, args),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[derive(Debug, Clone)]
enum MockResponse {
    Output(Vec<u8>),
    Failure(String),
}

/// In-memory runner returning canned output, useful for unit tests
///
/// Responses are keyed by the full command line (`program arg1 arg2 ...`).
/// Unregistered commands fail with [`CommandError::Unexpected`].
#[derive(Clone, Default)]
pub struct MockRunner {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    /// Every invocation, in order, as `[program, args...]`
    calls: Arc<RwLock<Vec<Vec<String>>>>,
}

impl MockRunner {
    /// Create a runner with no registered commands
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the output of a command
    pub fn with_output(self, command: &str, output: impl Into<Vec<u8>>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(command.to_string(), MockResponse::Output(output.into()));
        self
    }

    /// Register a command that exits with an error
    pub fn with_failure(self, command: &str, stderr: &str) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(command.to_string(), MockResponse::Failure(stderr.to_string()));
        self
    }

    /// Recorded invocations
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

impl Runner for MockRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, CommandError> {
        {
            let mut call = vec![program.to_string()];
            call.extend(args.iter().cloned());
            self.calls.write().unwrap().push(call);
        }

        let command = command_line(program, args);
        match self.responses.read().unwrap().get(&command) {
            Some(MockResponse::Output(out)) => Ok(out.clone()),
            Some(MockResponse::Failure(stderr)) => Err(CommandError::Failed {
                command,
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Err(CommandError::Unexpected { command }),
        }
    }
}
