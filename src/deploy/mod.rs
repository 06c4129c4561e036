// ABOUTME: Platform deployers and the coordinator that sequences them.
// ABOUTME: Exports the Deployer contract, its three implementations, and outcome types.

mod cluster;
mod container;
mod coordinator;
mod error;
mod function;
mod outcome;
mod strategy;

pub use cluster::{CLUSTER_DOMAIN, ClusterDeployer, KEPT_REVISIONS, ROLLOUT_TIMEOUT};
pub use container::{BACKUP_SUFFIX, ContainerDeployer, INSTANCE_LABEL};
pub use coordinator::DeploymentCoordinator;
pub use error::{DeployError, DeployErrorKind, ProcessErrorExt};
pub use function::{FunctionDeployer, PROVIDER_DOMAIN, ROLLBACK_UNSUPPORTED, endpoint_from_output};
pub use outcome::DeploymentOutcome;
pub use strategy::{Deployer, deployer_for};
