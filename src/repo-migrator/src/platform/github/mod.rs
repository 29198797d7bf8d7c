//! GitHub destination client built on octocrab.

mod rate_limit;

pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, RateLimitInfo};

use super::{
    CreatedPullRequest, FileContent, FileUpdate, HostedRepository, NewPullRequest, PlatformError,
    RepositoryHost,
};
use crate::urls::RepositoryPath;
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const MILESTONES_PER_PAGE: usize = 100;

/// Milestone fields needed to resolve a title to a number.
#[derive(Debug, Deserialize)]
struct MilestoneRef {
    number: u64,
    title: String,
}

/// [`RepositoryHost`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubHost {
    octocrab: Octocrab,
}

impl GitHubHost {
    /// Creates a client authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self, PlatformError> {
        let octocrab = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self { octocrab })
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Posts to a raw route and drops the response body.
    ///
    /// For writes whose reply is never read.
    async fn post_discarding(
        &self,
        route: String,
        body: &serde_json::Value,
    ) -> Result<(), PlatformError> {
        let _: serde_json::Value = self.octocrab.post(route, Some(body)).await?;
        Ok(())
    }

    /// Resolves a milestone title to its number, paging through every
    /// milestone of the repository.
    async fn find_milestone(
        &self,
        repo: &RepositoryPath,
        title: &str,
    ) -> Result<MilestoneRef, PlatformError> {
        let route = format!("/repos/{repo}/milestones");
        let per_page = MILESTONES_PER_PAGE.to_string();
        let mut page: u32 = 1;

        loop {
            let page_param = page.to_string();
            let milestones: Vec<MilestoneRef> = self
                .octocrab
                .get(
                    &route,
                    Some(&[
                        ("state", "all"),
                        ("per_page", per_page.as_str()),
                        ("page", page_param.as_str()),
                    ]),
                )
                .await?;

            let last_page = milestones.len() < MILESTONES_PER_PAGE;
            if let Some(found) = milestones.into_iter().find(|m| m.title == title) {
                return Ok(found);
            }
            if last_page {
                return Err(PlatformError::NotFound {
                    resource: format!("milestone '{title}' in {repo}"),
                });
            }
            page += 1;
        }
    }
}

fn hosted_repository(repo: octocrab::models::Repository, fallback: &str) -> HostedRepository {
    let full_name = repo.full_name.unwrap_or_else(|| fallback.to_string());
    let html_url = repo
        .html_url
        .map(|u| u.to_string())
        .unwrap_or_else(|| format!("https://github.com/{full_name}"));
    HostedRepository {
        full_name,
        html_url,
    }
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn create_pull_request(
        &self,
        repo: &RepositoryPath,
        request: &NewPullRequest,
    ) -> Result<CreatedPullRequest, PlatformError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let pr = self
            .octocrab
            .pulls(repo.owner(), repo.name())
            .create(&request.title, &request.head, &request.base)
            .body(&request.body)
            .draft(request.draft)
            .send()
            .await?;

        let url = pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("https://github.com/{repo}/pull/{}", pr.number));

        Ok(CreatedPullRequest {
            number: pr.number,
            url,
        })
    }

    async fn is_collaborator(
        &self,
        repo: &RepositoryPath,
        username: &str,
    ) -> Result<bool, PlatformError> {
        let first_page = self
            .octocrab
            .repos(repo.owner(), repo.name())
            .list_collaborators()
            .per_page(100)
            .send()
            .await?;
        let collaborators = self.octocrab.all_pages(first_page).await?;

        Ok(collaborators
            .iter()
            .any(|collaborator| collaborator.author.login == username))
    }

    async fn add_assignee(
        &self,
        repo: &RepositoryPath,
        number: u64,
        username: &str,
    ) -> Result<(), PlatformError> {
        self.post_discarding(
            format!("/repos/{repo}/issues/{number}/assignees"),
            &json!({ "assignees": [username] }),
        )
        .await
    }

    async fn request_reviewer(
        &self,
        repo: &RepositoryPath,
        number: u64,
        username: &str,
    ) -> Result<(), PlatformError> {
        self.post_discarding(
            format!("/repos/{repo}/pulls/{number}/requested_reviewers"),
            &json!({ "reviewers": [username], "team_reviewers": [] }),
        )
        .await
    }

    async fn add_labels(
        &self,
        repo: &RepositoryPath,
        number: u64,
        labels: &[String],
    ) -> Result<(), PlatformError> {
        self.post_discarding(
            format!("/repos/{repo}/issues/{number}/labels"),
            &json!({ "labels": labels }),
        )
        .await
    }

    async fn set_milestone(
        &self,
        repo: &RepositoryPath,
        number: u64,
        title: &str,
    ) -> Result<(), PlatformError> {
        let milestone = self.find_milestone(repo, title).await?;

        debug!(milestone = milestone.number, "Resolved milestone");
        let _: serde_json::Value = self
            .octocrab
            .patch(
                format!("/repos/{repo}/issues/{number}"),
                Some(&json!({ "milestone": milestone.number })),
            )
            .await?;
        Ok(())
    }

    async fn create_comment(
        &self,
        repo: &RepositoryPath,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError> {
        self.post_discarding(
            format!("/repos/{repo}/issues/{number}/comments"),
            &json!({ "body": body }),
        )
        .await
    }

    async fn get_repository(
        &self,
        repo: &RepositoryPath,
    ) -> Result<Option<HostedRepository>, PlatformError> {
        match self.octocrab.repos(repo.owner(), repo.name()).get().await {
            Ok(found) => Ok(Some(hosted_repository(found, repo.as_str()))),
            Err(e) => {
                let error = PlatformError::from(e);
                if error.is_not_found() {
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }

    async fn rename_repository(
        &self,
        repo: &RepositoryPath,
        new_name: &str,
    ) -> Result<HostedRepository, PlatformError> {
        let renamed: octocrab::models::Repository = self
            .octocrab
            .patch(format!("/repos/{repo}"), Some(&json!({ "name": new_name })))
            .await?;
        Ok(hosted_repository(
            renamed,
            repo.with_name(new_name).as_str(),
        ))
    }

    async fn get_file(
        &self,
        repo: &RepositoryPath,
        branch: &str,
        path: &str,
    ) -> Result<FileContent, PlatformError> {
        let items = self
            .octocrab
            .repos(repo.owner(), repo.name())
            .get_content()
            .path(path)
            .r#ref(branch)
            .send()
            .await?;

        let not_found = || PlatformError::NotFound {
            resource: format!("file '{path}' on {repo}@{branch}"),
        };
        let file = items.items.into_iter().next().ok_or_else(not_found)?;
        let content = file.decoded_content().ok_or_else(not_found)?;

        Ok(FileContent {
            content,
            sha: file.sha,
        })
    }

    async fn update_file(
        &self,
        repo: &RepositoryPath,
        update: FileUpdate<'_>,
    ) -> Result<(), PlatformError> {
        self.octocrab
            .repos(repo.owner(), repo.name())
            .update_file(update.path, update.message, update.content, update.sha)
            .branch(update.branch)
            .send()
            .await?;
        Ok(())
    }
}
