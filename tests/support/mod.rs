// ABOUTME: Test support utilities.
// ABOUTME: Provides config builders and tracing setup for integration tests.

use std::sync::{Arc, Once};

use keel::config::{Artifact, DeploymentConfig};
use keel::types::ResourceName;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("keel=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// `shop` in `prod` with the given artifact and default settings.
#[allow(dead_code)]
pub fn config(artifact: Artifact) -> DeploymentConfig {
    DeploymentConfig::new(
        ResourceName::new("shop").unwrap(),
        ResourceName::new("prod").unwrap(),
        artifact,
    )
}

#[allow(dead_code)]
pub fn container_config() -> Arc<DeploymentConfig> {
    Arc::new(config(Artifact::Container {
        image: "shop:1.4.2".to_string(),
    }))
}
