//! In-memory result sink.

use super::{ResultSink, SinkError};
use crate::remotes::RemoteRewriteResult;
use crate::summary::ProjectOutcome;
use std::sync::{Mutex, PoisonError};

/// Collects outcomes in memory.
#[derive(Debug, Default)]
pub struct MemoryResultSink {
    projects: Mutex<Vec<ProjectOutcome>>,
    remotes: Mutex<Vec<RemoteRewriteResult>>,
}

impl MemoryResultSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes recorded so far, in recording order.
    #[must_use]
    pub fn projects(&self) -> Vec<ProjectOutcome> {
        self.projects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remote rewrite results recorded so far, in recording order.
    #[must_use]
    pub fn remotes(&self) -> Vec<RemoteRewriteResult> {
        self.remotes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultSink for MemoryResultSink {
    fn record(&self, project: &ProjectOutcome) -> Result<(), SinkError> {
        self.projects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(project.clone());
        Ok(())
    }

    fn record_remote(&self, result: &RemoteRewriteResult) -> Result<(), SinkError> {
        self.remotes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }
}
