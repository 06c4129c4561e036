// ABOUTME: Validated domain types shared across modules.
// ABOUTME: Resource names for app/environment and per-attempt deployment IDs.

mod id;
mod name;

pub use id::DeploymentId;
pub use name::{NameError, ResourceName};
