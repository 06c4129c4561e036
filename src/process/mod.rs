// ABOUTME: Invocation seam for the external platform tools (docker, kubectl, serverless).
// ABOUTME: Exports the CommandRunner trait, the tokio-backed runner, and a scripted runner.

mod command;
mod scripted;
mod system;

pub use command::{CommandOutput, CommandRunner, CommandSpec, ProcessError};
pub use scripted::ScriptedRunner;
pub use system::SystemRunner;
