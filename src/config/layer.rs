// ABOUTME: Unvalidated configuration layer read from a file or from CLI flags.
// ABOUTME: Layers merge field by field before validation builds a DeploymentConfig.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::deserialize::{deserialize_non_blank, non_blank};
use crate::error::{Error, Result};

pub const CONFIG_FILENAME: &str = "keel.yml";
pub const CONFIG_FILENAME_ALT: &str = "keel.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".keel/config.yml";

/// Raw deployment settings, every field optional.
///
/// Field names follow the CI action inputs; the legacy input names
/// (`app_name`, `docker_image`, `k8s_manifest`, `serverless_config`) are
/// accepted as aliases.
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(deserialize_with = "deserialize_non_blank")]
    pub environment: Option<String>,

    #[serde(alias = "deployment_type", deserialize_with = "deserialize_non_blank")]
    pub platform: Option<String>,

    #[serde(alias = "app_name", deserialize_with = "deserialize_non_blank")]
    pub application: Option<String>,

    #[serde(deserialize_with = "deserialize_non_blank")]
    pub github_token: Option<String>,

    #[serde(alias = "docker_image", deserialize_with = "deserialize_non_blank")]
    pub image: Option<String>,

    #[serde(alias = "k8s_manifest", deserialize_with = "deserialize_non_blank")]
    pub manifest: Option<String>,

    #[serde(alias = "serverless_config", deserialize_with = "deserialize_non_blank")]
    pub function_config: Option<String>,

    #[serde(deserialize_with = "deserialize_non_blank")]
    pub health_check_url: Option<String>,

    pub health_check_timeout: Option<u64>,

    #[serde(with = "humantime_serde")]
    pub health_check_retry_delay: Option<Duration>,

    pub rollback_on_failure: Option<bool>,

    #[serde(deserialize_with = "deserialize_non_blank")]
    pub notification_webhook: Option<String>,

    #[serde(deserialize_with = "deserialize_non_blank")]
    pub slack_token: Option<String>,

    #[serde(deserialize_with = "deserialize_non_blank")]
    pub slack_channel: Option<String>,

    #[serde(deserialize_with = "deserialize_non_blank")]
    pub aws_region: Option<String>,

    #[serde(deserialize_with = "deserialize_non_blank")]
    pub aws_access_key_id: Option<String>,

    #[serde(deserialize_with = "deserialize_non_blank")]
    pub aws_secret_access_key: Option<String>,

    pub host_port: Option<u16>,

    pub container_port: Option<u16>,
}

impl ConfigLayer {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`, if any.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return Self::load(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Merge `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            environment: overrides.environment.or(self.environment),
            platform: overrides.platform.or(self.platform),
            application: overrides.application.or(self.application),
            github_token: overrides.github_token.or(self.github_token),
            image: overrides.image.or(self.image),
            manifest: overrides.manifest.or(self.manifest),
            function_config: overrides.function_config.or(self.function_config),
            health_check_url: overrides.health_check_url.or(self.health_check_url),
            health_check_timeout: overrides.health_check_timeout.or(self.health_check_timeout),
            health_check_retry_delay: overrides
                .health_check_retry_delay
                .or(self.health_check_retry_delay),
            rollback_on_failure: overrides.rollback_on_failure.or(self.rollback_on_failure),
            notification_webhook: overrides.notification_webhook.or(self.notification_webhook),
            slack_token: overrides.slack_token.or(self.slack_token),
            slack_channel: overrides.slack_channel.or(self.slack_channel),
            aws_region: overrides.aws_region.or(self.aws_region),
            aws_access_key_id: overrides.aws_access_key_id.or(self.aws_access_key_id),
            aws_secret_access_key: overrides
                .aws_secret_access_key
                .or(self.aws_secret_access_key),
            host_port: overrides.host_port.or(self.host_port),
            container_port: overrides.container_port.or(self.container_port),
        }
    }

    /// Drop blank string values, as serde does for files.
    pub(crate) fn normalized(self) -> ConfigLayer {
        let clean = |v: Option<String>| v.and_then(non_blank);
        ConfigLayer {
            environment: clean(self.environment),
            platform: clean(self.platform),
            application: clean(self.application),
            github_token: clean(self.github_token),
            image: clean(self.image),
            manifest: clean(self.manifest),
            function_config: clean(self.function_config),
            health_check_url: clean(self.health_check_url),
            notification_webhook: clean(self.notification_webhook),
            slack_token: clean(self.slack_token),
            slack_channel: clean(self.slack_channel),
            aws_region: clean(self.aws_region),
            aws_access_key_id: clean(self.aws_access_key_id),
            aws_secret_access_key: clean(self.aws_secret_access_key),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legacy_input_names() {
        let layer = ConfigLayer::from_yaml(
            r#"
app_name: shop
deployment_type: docker
docker_image: shop:1.0
"#,
        )
        .unwrap();
        assert_eq!(layer.application.as_deref(), Some("shop"));
        assert_eq!(layer.platform.as_deref(), Some("docker"));
        assert_eq!(layer.image.as_deref(), Some("shop:1.0"));
    }

    #[test]
    fn blank_strings_are_absent() {
        let layer = ConfigLayer::from_yaml("image: \"  \"\nmanifest: \"\"\n").unwrap();
        assert!(layer.image.is_none());
        assert!(layer.manifest.is_none());
    }

    #[test]
    fn retry_delay_uses_humantime() {
        let layer = ConfigLayer::from_yaml("health_check_retry_delay: 1m 30s\n").unwrap();
        assert_eq!(
            layer.health_check_retry_delay,
            Some(Duration::from_secs(90))
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ConfigLayer::from_yaml("enviroment: prod\n").err().unwrap();
        assert!(err.to_string().contains("enviroment"));
    }

    #[test]
    fn overrides_win_when_set() {
        let file = ConfigLayer {
            environment: Some("staging".to_string()),
            image: Some("shop:1.0".to_string()),
            ..Default::default()
        };
        let flags = ConfigLayer {
            image: Some("shop:2.0".to_string()),
            ..Default::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.environment.as_deref(), Some("staging"));
        assert_eq!(merged.image.as_deref(), Some("shop:2.0"));
    }

    #[test]
    fn discover_returns_none_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLayer::discover(dir.path()).unwrap().is_none());
    }

    #[test]
    fn load_reports_missing_explicit_path() {
        let err = ConfigLayer::load(Path::new("/nonexistent/keel.yml")).err().unwrap();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}
