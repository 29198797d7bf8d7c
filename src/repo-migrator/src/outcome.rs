//! Uniform result of a mutating driver call.

use serde::Serialize;

/// Outcome returned by every driver.
///
/// Drivers never raise past their boundary; failures become `had_error`
/// with a message, and advisory problems that did not fail the operation
/// are kept in `warnings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    /// Whether the operation failed.
    pub had_error: bool,

    /// Human-readable result or error description.
    pub message: String,

    /// URL of the created or renamed resource, if any.
    pub new_url: Option<String>,

    /// Non-fatal problems met along the way.
    pub warnings: Vec<String>,
}

impl OperationOutcome {
    /// A successful outcome.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            had_error: false,
            message: message.into(),
            ..Default::default()
        }
    }

    /// A failed outcome.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            had_error: true,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Attaches the URL of the resulting resource.
    #[must_use]
    pub fn with_new_url(mut self, url: impl Into<String>) -> Self {
        self.new_url = Some(url.into());
        self
    }

    /// Attaches advisory warnings.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}
