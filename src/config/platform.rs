// ABOUTME: Deployment platform kinds.
// ABOUTME: Parses canonical names (container, cluster, function) and the docker/kubernetes/serverless aliases.

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::deploy::DeployError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// A single container managed through the docker CLI.
    Container,
    /// A workload applied to an orchestrated cluster through kubectl.
    Cluster,
    /// A function-as-a-service stack deployed through the serverless CLI.
    Function,
}

impl Platform {
    /// The external tool this platform drives.
    pub fn tool(&self) -> &'static str {
        match self {
            Platform::Container => "docker",
            Platform::Cluster => "kubectl",
            Platform::Function => "serverless",
        }
    }
}

impl FromStr for Platform {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "container" | "docker" => Ok(Platform::Container),
            "cluster" | "kubernetes" | "k8s" => Ok(Platform::Cluster),
            "function" | "serverless" => Ok(Platform::Function),
            _ => Err(DeployError::UnsupportedPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Container => write!(f, "container"),
            Platform::Cluster => write!(f, "cluster"),
            Platform::Function => write!(f, "function"),
        }
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
