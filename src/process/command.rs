// ABOUTME: Command description, captured output, and the runner trait.
// ABOUTME: Deployers only describe invocations; runners decide how they execute.

use async_trait::async_trait;
use std::fmt;

/// A single external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables added to the child's environment only, never to ours.
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            envs: Vec::new(),
        }
    }

    /// Add an environment variable for this invocation.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// The command line without environment values, safe to log.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful exit with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed exit with the given stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}", exit_display(.exit_code))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn exit_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

/// Runs external commands on behalf of the deployers.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Spawn the command and capture its output, whatever the exit status.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError>;

    /// Like `run`, but a non-zero exit is an error.
    async fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        let output = self.run(spec).await?;
        if output.success() {
            Ok(output)
        } else {
            let stderr = if output.stderr.trim().is_empty() {
                output.stdout.trim().to_string()
            } else {
                output.stderr.trim().to_string()
            };
            Err(ProcessError::Failed {
                command: spec.command_line(),
                exit_code: output.exit_code,
                stderr,
            })
        }
    }
}
