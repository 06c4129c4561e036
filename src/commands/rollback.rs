// ABOUTME: Rollback command implementation.
// ABOUTME: Restores the previous version using the platform's naming conventions.

use keel::config::DeploymentConfig;
use keel::error::Result;
use keel::notify::Notifier;
use keel::output::Output;
use keel::pipeline::Pipeline;
use keel::process::{CommandRunner, SystemRunner};
use std::sync::Arc;

/// Roll back the configured application in its environment.
pub async fn rollback(config: DeploymentConfig, mut output: Output) -> Result<()> {
    output.start_timer();

    output.progress(&format!(
        "Rolling back {} in {} ({})",
        config.application,
        config.environment,
        config.platform()
    ));

    let notifier = Notifier::new(
        config.application.to_string(),
        config.environment.to_string(),
    );
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let pipeline = Pipeline::new(Arc::new(config), runner, notifier)?;

    let outcome = pipeline.rollback().await?;

    output.success(&format!("Rollback complete: {}", outcome.deployment_url));
    Ok(())
}
