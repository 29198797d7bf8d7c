#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub(crate) mod git;
pub mod manifest;
pub mod merge_requests;
pub mod outcome;
pub mod pipeline;
pub mod platform;
pub mod pull_requests;
pub mod remotes;
pub mod rename;
pub mod runner;
pub mod scm;
pub mod sink;
pub mod summary;
pub mod urls;

#[cfg(test)]
pub(crate) mod test_support;

pub use manifest::{
    get_member_list, get_project_list, ManifestError, MemberMap, MemberRecord, ProjectRecord,
};
pub use merge_requests::{fetch_open_merge_requests, FetchOutcome, MergeRequestRecord};
pub use outcome::OperationOutcome;
pub use pipeline::{update_pipeline_file, PipelineFile, PipelineOutcome};
pub use platform::{GitHubHost, GitLabSource, MergeRequestSource, PlatformError, RepositoryHost};
pub use pull_requests::create_pull_request;
pub use remotes::{
    rewrite_remotes, RemoteError, RemoteMode, RemoteRewriteOptions, RemoteRewriteResult,
    RemoteStatus,
};
pub use rename::rename_repository;
pub use runner::{RefactorSteps, Runner, RunnerConfig, RunnerError, DEFAULT_GITLAB_URL};
pub use scm::{rewrite_scm, update_scm_connections, PomError, ScmCoordinates};
pub use sink::{
    timestamped_output_directory, FileResultSink, MemoryResultSink, ResultSink, SinkError, LOG_FILE,
    REMOTES_FILE,
};
pub use summary::{ProjectOutcome, ProjectStatus, RunSummary, Step, StepOutcome};
pub use urls::{extract_repository_path, Platform, RepositoryPath, UrlError};
