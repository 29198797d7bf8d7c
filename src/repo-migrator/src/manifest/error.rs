//! Manifest error types.

use thiserror::Error;

/// Errors that can occur while loading a manifest.
///
/// Every variant is fatal for the run: a manifest is either loaded in full
/// or not at all.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read the file.
    #[error("Failed to read manifest '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid tab-separated text.
    #[error("Failed to parse manifest '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The header row lacks a required column.
    #[error("Manifest '{path}' has no '{column}' column in its header")]
    MissingColumn { path: String, column: String },

    /// A data row lacks a required field.
    #[error("Manifest '{path}', line {line}: missing value for '{column}'")]
    MissingField {
        path: String,
        line: usize,
        column: String,
    },

    /// A URL field does not parse.
    #[error("Manifest '{path}', line {line}: '{value}' is not a valid URL")]
    InvalidUrl {
        path: String,
        line: usize,
        value: String,
    },

    /// The manifest has a header but no data rows.
    #[error("Manifest '{path}' contains no entries")]
    Empty { path: String },
}
