//! URL error types.

use thiserror::Error;

/// Errors that can occur while interpreting a repository URL.
#[derive(Debug, Error)]
pub enum UrlError {
    /// The host is neither a GitLab nor a GitHub host.
    #[error("'{url}' does not belong to a known GitLab or GitHub host")]
    UnknownHost { url: String },

    /// The URL has no usable `<namespace>/<name>` path.
    #[error("'{url}' has no <namespace>/<name> repository path")]
    MissingPath { url: String },

    /// The URL could not be parsed at all.
    #[error("'{url}' is not a valid repository URL: {message}")]
    Malformed { url: String, message: String },
}
