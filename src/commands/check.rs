// ABOUTME: Check command implementation.
// ABOUTME: Validates configuration and runs the platform's pre-flight checks without deploying.

use keel::config::DeploymentConfig;
use keel::deploy::DeploymentCoordinator;
use keel::error::Result;
use keel::output::Output;
use keel::process::{CommandRunner, SystemRunner};
use std::sync::Arc;

pub async fn check(config: DeploymentConfig, output: Output) -> Result<()> {
    output.progress(&format!(
        "Configuration valid for {} in {}",
        config.application, config.environment
    ));

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let coordinator = DeploymentCoordinator::new(Arc::new(config), runner);
    coordinator.preflight().await?;

    output.success(&format!("{} pre-flight checks passed", coordinator.platform()));
    Ok(())
}
