// ABOUTME: CommandRunner that replays canned replies instead of spawning processes.
// ABOUTME: Records every invocation; used by tests and by `keel deploy --dry-run`.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;

use super::command::{CommandOutput, CommandRunner, CommandSpec, ProcessError};

#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    NotFound,
}

#[derive(Debug, Clone)]
struct Rule {
    prefix: Vec<String>,
    reply: Reply,
}

impl Rule {
    fn matches(&self, spec: &CommandSpec) -> bool {
        let words = std::iter::once(&spec.program).chain(spec.args.iter());
        self.prefix.len() <= spec.args.len() + 1
            && self.prefix.iter().zip(words).all(|(p, w)| p == w)
    }
}

/// Replies to commands from a table of rules keyed by command-line prefix.
///
/// The rule with the longest matching prefix wins; commands that match no
/// rule succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to commands starting with `prefix` (whitespace separated).
    pub fn respond(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.rules.push(Rule {
            prefix: split(prefix),
            reply: Reply::Output(output),
        });
        self
    }

    /// Commands starting with `prefix` exit with code 1 and `stderr`.
    pub fn fail(self, prefix: &str, stderr: &str) -> Self {
        self.respond(prefix, CommandOutput::failed(1, stderr))
    }

    /// Commands starting with `prefix` cannot be spawned at all.
    pub fn missing(mut self, prefix: &str) -> Self {
        self.rules.push(Rule {
            prefix: split(prefix),
            reply: Reply::NotFound,
        });
        self
    }

    /// Every invocation so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Command lines of every invocation so far, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.lock().iter().map(CommandSpec::command_line).collect()
    }

    fn reply_for(&self, spec: &CommandSpec) -> Reply {
        self.rules
            .iter()
            .filter(|rule| rule.matches(spec))
            .max_by_key(|rule| rule.prefix.len())
            .map(|rule| rule.reply.clone())
            .unwrap_or_else(|| Reply::Output(CommandOutput::ok("")))
    }
}

fn split(prefix: &str) -> Vec<String> {
    prefix.split_whitespace().map(str::to_string).collect()
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        self.calls.lock().push(spec.clone());

        match self.reply_for(spec) {
            Reply::Output(output) => Ok(output),
            Reply::NotFound => Err(ProcessError::Spawn {
                program: spec.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unmatched_commands_succeed_and_are_recorded() {
        let runner = ScriptedRunner::new();
        let spec = CommandSpec::new("docker", ["ps"]);

        let output = runner.run(&spec).await.unwrap();
        assert!(output.success());
        assert_eq!(runner.command_lines(), vec!["docker ps"]);
    }

    #[tokio::test]
    async fn longest_prefix_wins() {
        let runner = ScriptedRunner::new()
            .fail("docker", "daemon down")
            .respond("docker image inspect", CommandOutput::ok("[]"));

        let inspect = CommandSpec::new("docker", ["image", "inspect", "nginx"]);
        assert!(runner.run(&inspect).await.unwrap().success());

        let ps = CommandSpec::new("docker", ["ps"]);
        assert!(!runner.run(&ps).await.unwrap().success());
    }

    #[tokio::test]
    async fn prefix_longer_than_command_does_not_match() {
        let runner = ScriptedRunner::new().fail("docker rename a b", "nope");
        let spec = CommandSpec::new("docker", ["rename"]);
        assert!(runner.run(&spec).await.unwrap().success());
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let runner = ScriptedRunner::new().missing("kubectl");
        let spec = CommandSpec::new("kubectl", ["version", "--client"]);

        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
