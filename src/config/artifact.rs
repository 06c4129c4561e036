// ABOUTME: The platform-specific artifact a deployment ships.
// ABOUTME: One variant per platform, so exactly one reference is ever populated.

use std::fmt;
use std::path::PathBuf;

use super::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Image reference handed to `docker run`.
    Container { image: String },
    /// Manifest path handed to `kubectl apply -f`.
    Cluster { manifest: PathBuf },
    /// Config path handed to `serverless deploy --config`.
    Function { config: PathBuf },
}

impl Artifact {
    pub fn platform(&self) -> Platform {
        match self {
            Artifact::Container { .. } => Platform::Container,
            Artifact::Cluster { .. } => Platform::Cluster,
            Artifact::Function { .. } => Platform::Function,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Container { image } => write!(f, "{}", image),
            Artifact::Cluster { manifest } => write!(f, "{}", manifest.display()),
            Artifact::Function { config } => write!(f, "{}", config.display()),
        }
    }
}
