// ABOUTME: CommandRunner backed by tokio::process.
// ABOUTME: Captures stdout/stderr and scopes env vars to the spawned child.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::command::{CommandOutput, CommandRunner, CommandSpec, ProcessError};

/// Runs commands on the local machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        tracing::debug!("Running {}", spec);

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success() {
            tracing::debug!("{} exited with {:?}", spec.program, result.exit_code);
        }

        Ok(result)
    }
}
