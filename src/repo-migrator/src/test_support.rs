//! In-memory platform doubles shared by unit tests.

use crate::platform::{
    CreatedPullRequest, FileContent, FileUpdate, HostedRepository, MergeRequestSource,
    NewPullRequest, PlatformError, RepositoryHost, SourceMergeRequest, SourceNote,
    SourceProject, TimeStats,
};
use crate::urls::RepositoryPath;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

fn injected(operation: &str) -> PlatformError {
    PlatformError::UnexpectedStatus {
        url: format!("fake://{operation}"),
        status: 500,
    }
}

/// Source platform serving fixed pages of merge requests.
pub(crate) struct FakeSource {
    pages: Vec<Vec<SourceMergeRequest>>,
    notes: HashMap<u64, Vec<SourceNote>>,
    auth_fails: bool,
    time_stats_fail: bool,
    requested: Mutex<Vec<u32>>,
}

impl FakeSource {
    pub(crate) fn new(pages: Vec<Vec<SourceMergeRequest>>) -> Self {
        Self {
            pages,
            notes: HashMap::new(),
            auth_fails: false,
            time_stats_fail: false,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_notes(mut self, iid: u64, notes: Vec<SourceNote>) -> Self {
        self.notes.insert(iid, notes);
        self
    }

    pub(crate) fn failing_auth(mut self) -> Self {
        self.auth_fails = true;
        self
    }

    pub(crate) fn failing_time_stats(mut self) -> Self {
        self.time_stats_fail = true;
        self
    }

    pub(crate) fn requested_pages(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MergeRequestSource for FakeSource {
    async fn authenticate(&self) -> Result<(), PlatformError> {
        if self.auth_fails {
            return Err(injected("authenticate"));
        }
        Ok(())
    }

    async fn resolve_project(&self, path: &RepositoryPath) -> Result<SourceProject, PlatformError> {
        Ok(SourceProject {
            id: 42,
            name: path.name().to_string(),
            path_with_namespace: path.as_str().to_string(),
        })
    }

    async fn list_open_merge_requests(
        &self,
        _project: &SourceProject,
        page: u32,
        _per_page: u32,
    ) -> Result<Vec<SourceMergeRequest>, PlatformError> {
        self.requested.lock().unwrap().push(page);
        let index = page.saturating_sub(1) as usize;
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn list_notes(
        &self,
        _project: &SourceProject,
        merge_request_iid: u64,
    ) -> Result<Vec<SourceNote>, PlatformError> {
        Ok(self
            .notes
            .get(&merge_request_iid)
            .cloned()
            .unwrap_or_default())
    }

    async fn time_stats(
        &self,
        _project: &SourceProject,
        _merge_request_iid: u64,
    ) -> Result<TimeStats, PlatformError> {
        if self.time_stats_fail {
            return Err(injected("time_stats"));
        }
        Ok(TimeStats {
            time_estimate: 3600,
            total_time_spent: 1800,
        })
    }
}

/// A call received by [`FakeHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
    CreatePullRequest {
        repo: String,
        title: String,
        head: String,
        base: String,
        draft: bool,
    },
    IsCollaborator {
        username: String,
    },
    AddAssignee {
        number: u64,
        username: String,
    },
    RequestReviewer {
        number: u64,
        username: String,
    },
    AddLabels {
        number: u64,
        labels: Vec<String>,
    },
    SetMilestone {
        number: u64,
        title: String,
    },
    CreateComment {
        number: u64,
        body: String,
    },
    GetRepository {
        repo: String,
    },
    RenameRepository {
        repo: String,
        new_name: String,
    },
    GetFile {
        repo: String,
        branch: String,
        path: String,
    },
    UpdateFile {
        repo: String,
        branch: String,
        path: String,
        message: String,
        content: String,
    },
}

/// Destination platform that records every call.
///
/// Pull requests are numbered from 1. Operations named in `failing` return an
/// error instead of succeeding.
#[derive(Default)]
pub(crate) struct FakeHost {
    calls: Mutex<Vec<HostCall>>,
    collaborators: HashSet<String>,
    repositories: HashSet<String>,
    files: Mutex<HashMap<(String, String, String), FileContent>>,
    failing: HashSet<&'static str>,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_collaborators(mut self, usernames: &[&str]) -> Self {
        self.collaborators
            .extend(usernames.iter().map(|u| (*u).to_string()));
        self
    }

    pub(crate) fn with_repository(mut self, full_name: &str) -> Self {
        self.repositories.insert(full_name.to_string());
        self
    }

    pub(crate) fn with_file(self, repo: &str, branch: &str, path: &str, content: &str) -> Self {
        self.files.lock().unwrap().insert(
            (repo.to_string(), branch.to_string(), path.to_string()),
            FileContent {
                content: content.to_string(),
                sha: "sha-0".to_string(),
            },
        );
        self
    }

    pub(crate) fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    pub(crate) fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Bodies of every posted comment, in order.
    pub(crate) fn comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::CreateComment { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn file(&self, repo: &str, branch: &str, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(&(repo.to_string(), branch.to_string(), path.to_string()))
            .map(|f| f.content.clone())
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, operation: &str) -> Result<(), PlatformError> {
        if self.failing.contains(operation) {
            return Err(injected(operation));
        }
        Ok(())
    }

    fn pull_request_count(&self) -> u64 {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, HostCall::CreatePullRequest { .. }))
            .count() as u64
    }
}

#[async_trait]
impl RepositoryHost for FakeHost {
    async fn create_pull_request(
        &self,
        repo: &RepositoryPath,
        request: &NewPullRequest,
    ) -> Result<CreatedPullRequest, PlatformError> {
        self.record(HostCall::CreatePullRequest {
            repo: repo.to_string(),
            title: request.title.clone(),
            head: request.head.clone(),
            base: request.base.clone(),
            draft: request.draft,
        });
        self.check("create_pull_request")?;
        let number = self.pull_request_count();
        Ok(CreatedPullRequest {
            number,
            url: format!("https://github.com/{repo}/pull/{number}"),
        })
    }

    async fn is_collaborator(
        &self,
        _repo: &RepositoryPath,
        username: &str,
    ) -> Result<bool, PlatformError> {
        self.record(HostCall::IsCollaborator {
            username: username.to_string(),
        });
        self.check("is_collaborator")?;
        Ok(self.collaborators.contains(username))
    }

    async fn add_assignee(
        &self,
        _repo: &RepositoryPath,
        number: u64,
        username: &str,
    ) -> Result<(), PlatformError> {
        self.record(HostCall::AddAssignee {
            number,
            username: username.to_string(),
        });
        self.check("add_assignee")
    }

    async fn request_reviewer(
        &self,
        _repo: &RepositoryPath,
        number: u64,
        username: &str,
    ) -> Result<(), PlatformError> {
        self.record(HostCall::RequestReviewer {
            number,
            username: username.to_string(),
        });
        self.check("request_reviewer")
    }

    async fn add_labels(
        &self,
        _repo: &RepositoryPath,
        number: u64,
        labels: &[String],
    ) -> Result<(), PlatformError> {
        self.record(HostCall::AddLabels {
            number,
            labels: labels.to_vec(),
        });
        self.check("add_labels")
    }

    async fn set_milestone(
        &self,
        _repo: &RepositoryPath,
        number: u64,
        title: &str,
    ) -> Result<(), PlatformError> {
        self.record(HostCall::SetMilestone {
            number,
            title: title.to_string(),
        });
        self.check("set_milestone")
    }

    async fn create_comment(
        &self,
        _repo: &RepositoryPath,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        self.record(HostCall::CreateComment {
            number,
            body: body.to_string(),
        });
        self.check("create_comment")
    }

    async fn get_repository(
        &self,
        repo: &RepositoryPath,
    ) -> Result<Option<HostedRepository>, PlatformError> {
        self.record(HostCall::GetRepository {
            repo: repo.to_string(),
        });
        self.check("get_repository")?;
        Ok(self
            .repositories
            .contains(repo.as_str())
            .then(|| HostedRepository {
                full_name: repo.to_string(),
                html_url: format!("https://github.com/{repo}"),
            }))
    }

    async fn rename_repository(
        &self,
        repo: &RepositoryPath,
        new_name: &str,
    ) -> Result<HostedRepository, PlatformError> {
        self.record(HostCall::RenameRepository {
            repo: repo.to_string(),
            new_name: new_name.to_string(),
        });
        self.check("rename_repository")?;
        let renamed = repo.with_name(new_name);
        Ok(HostedRepository {
            full_name: renamed.to_string(),
            html_url: format!("https://github.com/{renamed}"),
        })
    }

    async fn get_file(
        &self,
        repo: &RepositoryPath,
        branch: &str,
        path: &str,
    ) -> Result<FileContent, PlatformError> {
        self.record(HostCall::GetFile {
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        });
        self.check("get_file")?;
        self.files
            .lock()
            .unwrap()
            .get(&(repo.to_string(), branch.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| PlatformError::NotFound {
                resource: format!("{repo}:{branch}:{path}"),
            })
    }

    async fn update_file(
        &self,
        repo: &RepositoryPath,
        update: FileUpdate<'_>,
    ) -> Result<(), PlatformError> {
        self.record(HostCall::UpdateFile {
            repo: repo.to_string(),
            branch: update.branch.to_string(),
            path: update.path.to_string(),
            message: update.message.to_string(),
            content: update.content.to_string(),
        });
        self.check("update_file")?;
        self.files.lock().unwrap().insert(
            (
                repo.to_string(),
                update.branch.to_string(),
                update.path.to_string(),
            ),
            FileContent {
                content: update.content.to_string(),
                sha: format!("{}-next", update.sha),
            },
        );
        Ok(())
    }
}
