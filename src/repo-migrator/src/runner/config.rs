//! Runner configuration.

use crate::pipeline::PipelineFile;
use std::path::{Path, PathBuf};

/// Default source platform base URL.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// Which `refactor` steps run for each project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefactorSteps {
    /// Rename the destination repository when `New_Repo_Name` asks for it.
    pub rename: bool,
    /// Rewrite `pom.xml` SCM coordinates on every branch.
    pub scm: bool,
    /// Rewrite the project URL in the pipeline configuration file.
    pub pipeline: bool,
}

impl Default for RefactorSteps {
    fn default() -> Self {
        Self {
            rename: true,
            scm: true,
            pipeline: true,
        }
    }
}

/// Configuration for a migration run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the project manifest.
    project_list_path: PathBuf,
    /// Path to the member manifest.
    members_list_path: Option<PathBuf>,
    /// GitHub token, also used to clone for the SCM rewrite.
    github_token: String,
    /// Owner every destination repository lives under, overriding the URL.
    github_org: Option<String>,
    /// Pipeline configuration file rewritten by `refactor`.
    pipeline: Option<PipelineFile>,
    /// Steps enabled for `refactor`.
    steps: RefactorSteps,
    /// Maximum projects renamed and rewritten at once.
    concurrency: usize,
    /// Open pull requests as drafts when the merge request is one.
    draft_pull_requests: bool,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(project_list_path: PathBuf, github_token: String) -> Self {
        Self {
            project_list_path,
            members_list_path: None,
            github_token,
            github_org: None,
            pipeline: None,
            steps: RefactorSteps::default(),
            concurrency: 1,
            draft_pull_requests: false,
        }
    }

    /// Sets the member manifest path.
    pub fn with_members_list_path(mut self, path: PathBuf) -> Self {
        self.members_list_path = Some(path);
        self
    }

    /// Sets the destination organisation.
    pub fn with_github_org(mut self, org: impl Into<String>) -> Self {
        self.github_org = Some(org.into());
        self
    }

    /// Sets the pipeline configuration file.
    pub fn with_pipeline(mut self, pipeline: PipelineFile) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Sets the enabled `refactor` steps.
    pub fn with_steps(mut self, steps: RefactorSteps) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the number of projects processed at once; zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enables draft pull requests.
    pub fn with_draft_pull_requests(mut self, draft: bool) -> Self {
        self.draft_pull_requests = draft;
        self
    }

    /// Returns the project manifest path.
    pub fn project_list_path(&self) -> &Path {
        &self.project_list_path
    }

    /// Returns the member manifest path.
    pub fn members_list_path(&self) -> Option<&Path> {
        self.members_list_path.as_deref()
    }

    /// Returns the configured GitHub token.
    pub fn github_token(&self) -> &str {
        &self.github_token
    }

    /// Returns the destination organisation.
    pub fn github_org(&self) -> Option<&str> {
        self.github_org.as_deref()
    }

    /// Returns the pipeline configuration file.
    pub fn pipeline(&self) -> Option<&PipelineFile> {
        self.pipeline.as_ref()
    }

    /// Returns the enabled `refactor` steps.
    pub fn steps(&self) -> RefactorSteps {
        self.steps
    }

    /// Returns the number of projects processed at once.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns whether draft pull requests are enabled.
    pub fn draft_pull_requests(&self) -> bool {
        self.draft_pull_requests
    }
}
