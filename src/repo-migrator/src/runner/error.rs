//! Runner error types.

/// Errors that abort a run.
///
/// Per-project failures never surface here; they are recorded in the
/// project's outcome instead.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A manifest could not be loaded.
    #[error(transparent)]
    Manifest(#[from] crate::manifest::ManifestError),

    /// A result could not be recorded.
    #[error(transparent)]
    Sink(#[from] crate::sink::SinkError),

    /// The remote rewrite root could not be listed.
    #[error(transparent)]
    Remote(#[from] crate::remotes::RemoteError),

    /// A platform client could not be built.
    #[error(transparent)]
    Platform(#[from] crate::platform::PlatformError),

    /// A configured URL is not a repository URL.
    #[error(transparent)]
    Url(#[from] crate::urls::UrlError),

    /// A required setting was not provided.
    #[error("Missing required setting: {name}")]
    MissingConfig { name: &'static str },
}
