// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

use crate::notify::NotifyError;

/// Collects non-fatal warnings during deployment operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a post-deployment cleanup warning.
    pub fn cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Cleanup,
            message: message.into(),
        }
    }

    /// Create a notification delivery warning.
    pub fn notification(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Notification,
            message: message.into(),
        }
    }
}

impl From<NotifyError> for Warning {
    fn from(e: NotifyError) -> Self {
        Warning::notification(e.to_string())
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Post-deployment cleanup failed; old resources may remain.
    Cleanup,
    /// A notification channel did not accept the message.
    Notification,
}
