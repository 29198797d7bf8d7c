//! Where per-project results are recorded.

mod error;
mod file;
mod memory;

pub use error::SinkError;
pub use file::{
    output_directory_name, timestamped_output_directory, FileResultSink, FAILED_FILE, LOG_FILE,
    PARTIAL_FILE, REMOTES_FILE, SERVICES_FILE, SUCCESS_FILE,
};
pub use memory::MemoryResultSink;

use crate::remotes::RemoteRewriteResult;
use crate::summary::ProjectOutcome;

/// Receives each project's outcome once all its steps have run.
///
/// A project is recorded in a single call, so its result is never split
/// across destinations.
pub trait ResultSink: Send + Sync {
    /// Records one finished project.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the result could not be persisted.
    fn record(&self, project: &ProjectOutcome) -> Result<(), SinkError>;

    /// Records what happened to one local working copy.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the result could not be persisted.
    fn record_remote(&self, result: &RemoteRewriteResult) -> Result<(), SinkError>;
}
