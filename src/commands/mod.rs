// ABOUTME: Command module aggregator for the keel CLI.
// ABOUTME: Re-exports deploy, rollback, and check handlers plus shared config loading.

mod check;
mod deploy;
mod rollback;

use keel::config::{ConfigLayer, DeploymentConfig};
use keel::error::Result;
use std::env;
use std::path::Path;

use crate::cli::Settings;

pub use check::check;
pub use deploy::deploy;
pub use rollback::rollback;

/// Merge the config file (explicit or discovered) with flags and env, then validate.
pub fn load_config(path: Option<&Path>, settings: Settings) -> Result<DeploymentConfig> {
    DeploymentConfig::from_layer(file_layer(path)?.merge(settings.into_layer()))
}

/// The explicit config file, or the one discovered in the working directory.
pub fn file_layer(path: Option<&Path>) -> Result<ConfigLayer> {
    match path {
        Some(path) => ConfigLayer::load(path),
        None => Ok(ConfigLayer::discover(&env::current_dir()?)?.unwrap_or_default()),
    }
}
