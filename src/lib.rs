// ABOUTME: Library root for keel - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod types;
