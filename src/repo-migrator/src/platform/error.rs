//! Platform error types.

use thiserror::Error;

/// Errors raised by the source and destination platform clients.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// GitLab transport or decoding error.
    #[error("GitLab API error: {0}")]
    GitLabError(#[from] reqwest::Error),

    /// GitLab answered with a non-success status.
    #[error("GitLab returned HTTP {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// The requested resource does not exist or is not visible.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Invalid client configuration.
    #[error("Invalid platform configuration: {message}")]
    InvalidConfig { message: String },
}

impl PlatformError {
    /// Returns true when the resource does not exist or is not visible.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status == 404,
            Self::GitHubError(octocrab::Error::GitHub { source, .. }) => {
                source.status_code.as_u16() == 404
            }
            _ => false,
        }
    }
}
