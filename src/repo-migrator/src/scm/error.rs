//! Build descriptor error types.

use thiserror::Error;

/// Errors raised while rewriting the SCM block of a `pom.xml`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PomError {
    /// The document is not well-formed XML.
    #[error("Failed to parse pom.xml at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// The rewritten document could not be serialised.
    #[error("Failed to write pom.xml: {0}")]
    Write(String),

    /// The root `<project>` has no `<scm>` element.
    #[error("pom.xml has no <scm> section")]
    MissingScm,

    /// The `<scm>` element lacks one of the fields to rewrite.
    #[error("pom.xml <scm> section has no <{0}> element")]
    MissingField(&'static str),
}
