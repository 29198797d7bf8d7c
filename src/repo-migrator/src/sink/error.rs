//! Result sink error types.

use thiserror::Error;

/// Errors raised while recording results.
#[derive(Debug, Error)]
pub enum SinkError {
    /// A result file or the output directory could not be written.
    #[error("Failed to write '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
