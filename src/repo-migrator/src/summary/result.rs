//! Per-project result types.

use crate::outcome::OperationOutcome;
use std::fmt;

/// A step run for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Repository rename.
    Rename,
    /// `pom.xml` rewrite across branches.
    ScmRewrite,
    /// Pipeline configuration rewrite.
    PipelineRewrite,
    /// Fetching open merge requests.
    FetchMergeRequests,
    /// Creating the pull request for a merge request, by source id.
    PullRequest(u64),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename => f.write_str("rename"),
            Self::ScmRewrite => f.write_str("scm"),
            Self::PipelineRewrite => f.write_str("pipeline"),
            Self::FetchMergeRequests => f.write_str("fetch-merge-requests"),
            Self::PullRequest(id) => write!(f, "pull-request-{id}"),
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    pub outcome: OperationOutcome,
}

/// Classification of a project after all its steps ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Every step succeeded.
    Success,
    /// Some steps failed, some succeeded.
    PartialSuccess,
    /// Every step failed.
    Failure,
}

/// Everything that happened to one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    /// Source repository URL from the manifest.
    pub old_url: String,
    /// Destination repository URL, after any rename.
    pub new_url: String,
    /// Steps in the order they ran.
    pub steps: Vec<StepOutcome>,
    /// Pipeline lines that referenced this project.
    pub updated_services: Vec<String>,
}

impl ProjectOutcome {
    /// Creates an outcome with no steps yet.
    #[must_use]
    pub fn new(old_url: impl Into<String>, new_url: impl Into<String>) -> Self {
        Self {
            old_url: old_url.into(),
            new_url: new_url.into(),
            steps: Vec::new(),
            updated_services: Vec::new(),
        }
    }

    /// Appends a step outcome.
    pub fn push(&mut self, step: Step, outcome: OperationOutcome) {
        self.steps.push(StepOutcome { step, outcome });
    }

    /// Steps that failed, in order.
    #[must_use]
    pub fn failed_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|s| s.outcome.had_error)
            .map(|s| s.step)
            .collect()
    }

    /// All-ok is success, all-failed is failure, anything else is partial.
    ///
    /// A project with no steps counts as a success.
    #[must_use]
    pub fn status(&self) -> ProjectStatus {
        let failed = self.steps.iter().filter(|s| s.outcome.had_error).count();
        if failed == 0 {
            ProjectStatus::Success
        } else if failed == self.steps.len() {
            ProjectStatus::Failure
        } else {
            ProjectStatus::PartialSuccess
        }
    }
}
