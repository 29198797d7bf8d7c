//! Seams to the two hosting platforms.
//!
//! Drivers talk to the source platform through [`MergeRequestSource`] and to
//! the destination platform through [`RepositoryHost`]. The production
//! implementations are [`GitLabSource`] and [`GitHubHost`]; tests substitute
//! in-memory doubles.

mod error;
pub mod github;
pub mod gitlab;

pub use error::PlatformError;
pub use github::GitHubHost;
pub use gitlab::{
    GitLabSource, SourceMergeRequest, SourceMilestone, SourceNote, SourceProject, SourceUser,
    TimeStats,
};

use crate::urls::RepositoryPath;
use async_trait::async_trait;

/// Read access to merge requests on the source platform.
#[async_trait]
pub trait MergeRequestSource: Send + Sync {
    /// Verifies the configured credentials.
    async fn authenticate(&self) -> Result<(), PlatformError>;

    /// Resolves a repository path to a project.
    async fn resolve_project(&self, path: &RepositoryPath) -> Result<SourceProject, PlatformError>;

    /// Returns one page of open merge requests; an empty page ends the listing.
    async fn list_open_merge_requests(
        &self,
        project: &SourceProject,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SourceMergeRequest>, PlatformError>;

    /// Returns the notes of a merge request, oldest first.
    async fn list_notes(
        &self,
        project: &SourceProject,
        merge_request_iid: u64,
    ) -> Result<Vec<SourceNote>, PlatformError>;

    /// Returns the time-tracking totals of a merge request.
    async fn time_stats(
        &self,
        project: &SourceProject,
        merge_request_iid: u64,
    ) -> Result<TimeStats, PlatformError>;
}

/// A pull request to open on the destination platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Title.
    pub title: String,
    /// Body.
    pub body: String,
    /// Branch holding the changes.
    pub head: String,
    /// Branch the changes go into.
    pub base: String,
    /// Whether to open it as a draft.
    pub draft: bool,
}

/// A pull request that was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPullRequest {
    /// Pull request number.
    pub number: u64,
    /// Web URL.
    pub url: String,
}

/// A repository on the destination platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedRepository {
    /// `<owner>/<name>`.
    pub full_name: String,
    /// Web URL.
    pub html_url: String,
}

/// A file read from a branch, with the hash needed to update it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Decoded UTF-8 content.
    pub content: String,
    /// Blob hash of the current content.
    pub sha: String,
}

/// A single-file commit.
#[derive(Debug, Clone, Copy)]
pub struct FileUpdate<'a> {
    /// Branch to commit to.
    pub branch: &'a str,
    /// File path inside the repository.
    pub path: &'a str,
    /// Commit message.
    pub message: &'a str,
    /// New file content.
    pub content: &'a str,
    /// Hash of the content being replaced.
    pub sha: &'a str,
}

/// Write access to repositories on the destination platform.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Opens a pull request.
    async fn create_pull_request(
        &self,
        repo: &RepositoryPath,
        request: &NewPullRequest,
    ) -> Result<CreatedPullRequest, PlatformError>;

    /// Returns true when `username` is a collaborator on the repository.
    async fn is_collaborator(
        &self,
        repo: &RepositoryPath,
        username: &str,
    ) -> Result<bool, PlatformError>;

    /// Assigns a user to a pull request.
    async fn add_assignee(
        &self,
        repo: &RepositoryPath,
        number: u64,
        username: &str,
    ) -> Result<(), PlatformError>;

    /// Requests a review from a user.
    async fn request_reviewer(
        &self,
        repo: &RepositoryPath,
        number: u64,
        username: &str,
    ) -> Result<(), PlatformError>;

    /// Adds labels to a pull request.
    async fn add_labels(
        &self,
        repo: &RepositoryPath,
        number: u64,
        labels: &[String],
    ) -> Result<(), PlatformError>;

    /// Sets the milestone with the given title.
    async fn set_milestone(
        &self,
        repo: &RepositoryPath,
        number: u64,
        title: &str,
    ) -> Result<(), PlatformError>;

    /// Posts a comment on a pull request.
    async fn create_comment(
        &self,
        repo: &RepositoryPath,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError>;

    /// Looks a repository up; `None` when it does not exist or is not visible.
    async fn get_repository(
        &self,
        repo: &RepositoryPath,
    ) -> Result<Option<HostedRepository>, PlatformError>;

    /// Renames a repository within its owner.
    async fn rename_repository(
        &self,
        repo: &RepositoryPath,
        new_name: &str,
    ) -> Result<HostedRepository, PlatformError>;

    /// Reads a file from a branch.
    async fn get_file(
        &self,
        repo: &RepositoryPath,
        branch: &str,
        path: &str,
    ) -> Result<FileContent, PlatformError>;

    /// Commits new content for a file.
    async fn update_file(
        &self,
        repo: &RepositoryPath,
        update: FileUpdate<'_>,
    ) -> Result<(), PlatformError>;
}
