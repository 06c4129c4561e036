// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use keel::config::ConfigLayer;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keel")]
#[command(about = "Deploy an application to a container, cluster, or function platform")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to keel.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy, verify health, and roll back on failure
    Deploy {
        #[command(flatten)]
        settings: Settings,

        /// Record platform commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Restore the previous version
    Rollback {
        #[command(flatten)]
        settings: Settings,
    },

    /// Validate configuration and run pre-flight checks
    Check {
        #[command(flatten)]
        settings: Settings,
    },
}

/// Deployment settings; flags override environment variables, which override the file.
#[derive(Args, Default)]
pub struct Settings {
    /// Target environment name
    #[arg(long, env = "KEEL_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Platform: container, cluster, or function
    #[arg(long, env = "KEEL_PLATFORM")]
    pub platform: Option<String>,

    /// Application name
    #[arg(long = "app-name", env = "KEEL_APP_NAME")]
    pub application: Option<String>,

    /// Token for deployment status updates
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Container image reference
    #[arg(long, env = "KEEL_IMAGE")]
    pub image: Option<String>,

    /// Cluster manifest path
    #[arg(long, env = "KEEL_MANIFEST")]
    pub manifest: Option<String>,

    /// Function framework config path
    #[arg(long, env = "KEEL_FUNCTION_CONFIG")]
    pub function_config: Option<String>,

    /// URL probed after deployment
    #[arg(long, env = "KEEL_HEALTH_CHECK_URL")]
    pub health_check_url: Option<String>,

    /// Per-attempt health check timeout in seconds
    #[arg(long, env = "KEEL_HEALTH_CHECK_TIMEOUT")]
    pub health_check_timeout: Option<u64>,

    /// Roll back when the health check fails
    #[arg(
        long,
        env = "KEEL_ROLLBACK_ON_FAILURE",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub rollback_on_failure: Option<bool>,

    /// Webhook receiving JSON status payloads
    #[arg(long, env = "KEEL_NOTIFICATION_WEBHOOK")]
    pub notification_webhook: Option<String>,

    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: Option<String>,

    #[arg(long, env = "SLACK_CHANNEL")]
    pub slack_channel: Option<String>,

    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub aws_access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,
}

impl Settings {
    pub fn into_layer(self) -> ConfigLayer {
        ConfigLayer {
            environment: self.environment,
            platform: self.platform,
            application: self.application,
            github_token: self.github_token,
            image: self.image,
            manifest: self.manifest,
            function_config: self.function_config,
            health_check_url: self.health_check_url,
            health_check_timeout: self.health_check_timeout,
            rollback_on_failure: self.rollback_on_failure,
            notification_webhook: self.notification_webhook,
            slack_token: self.slack_token,
            slack_channel: self.slack_channel,
            aws_region: self.aws_region,
            aws_access_key_id: self.aws_access_key_id,
            aws_secret_access_key: self.aws_secret_access_key,
            ..ConfigLayer::default()
        }
    }
}
