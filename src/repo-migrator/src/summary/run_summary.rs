//! Run summary types.

use super::result::{ProjectOutcome, ProjectStatus, Step};
use crate::remotes::{RemoteRewriteResult, RemoteStatus};

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of projects processed.
    pub projects_processed: usize,

    /// Projects whose steps all succeeded.
    pub projects_succeeded: usize,

    /// Projects with a mix of failed and successful steps.
    pub projects_partial: usize,

    /// Projects whose steps all failed.
    pub projects_failed: usize,

    /// Number of pull requests created.
    pub pull_requests_created: usize,

    /// Number of pull requests that failed to create.
    pub pull_requests_failed: usize,

    /// Number of pull requests created with advisory warnings.
    pub pull_requests_with_warnings: usize,

    /// Number of working copies whose origin was rewritten.
    pub remotes_rewritten: usize,

    /// Number of directories skipped (not a repository, no origin, no match).
    pub remotes_skipped: usize,

    /// Number of working copies whose rewrite failed.
    pub remotes_failed: usize,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the summary with a project's outcome.
    pub fn record_project(&mut self, project: &ProjectOutcome) {
        self.projects_processed += 1;
        match project.status() {
            ProjectStatus::Success => self.projects_succeeded += 1,
            ProjectStatus::PartialSuccess => self.projects_partial += 1,
            ProjectStatus::Failure => self.projects_failed += 1,
        }

        for step in &project.steps {
            if !matches!(step.step, Step::PullRequest(_)) {
                continue;
            }
            if step.outcome.had_error {
                self.pull_requests_failed += 1;
            } else {
                self.pull_requests_created += 1;
                if !step.outcome.warnings.is_empty() {
                    self.pull_requests_with_warnings += 1;
                }
            }
        }
    }

    /// Updates the summary with one directory of a remote rewrite.
    pub fn record_remote(&mut self, result: &RemoteRewriteResult) {
        match result.status {
            RemoteStatus::Rewritten { .. } => self.remotes_rewritten += 1,
            RemoteStatus::Failed(_) => self.remotes_failed += 1,
            RemoteStatus::NotARepository | RemoteStatus::NoOrigin | RemoteStatus::NoMatch { .. } => {
                self.remotes_skipped += 1;
            }
        }
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.projects_partial > 0 || self.projects_failed > 0 || self.remotes_failed > 0
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}
