//! Remote rewrite error types.

use thiserror::Error;

/// Errors that stop a remote rewrite before any directory is processed.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The root directory could not be listed.
    #[error("Failed to list directory '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
