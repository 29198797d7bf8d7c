//! GitLab source client over the REST v4 API.

mod models;

pub use models::{
    SourceMergeRequest, SourceMilestone, SourceNote, SourceProject, SourceUser, TimeStats,
};

use super::{MergeRequestSource, PlatformError};
use crate::urls::RepositoryPath;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Header carrying a personal access token.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Page size used when reading notes.
const NOTES_PER_PAGE: u32 = 100;

/// [`MergeRequestSource`] backed by a GitLab instance.
#[derive(Debug, Clone)]
pub struct GitLabSource {
    client: Client,
    base_url: Url,
    token: String,
}

impl GitLabSource {
    /// Creates a client for the instance at `base_url`, e.g. `https://gitlab.com`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the URL does not parse or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, PlatformError> {
        let base_url = Url::parse(base_url).map_err(|e| PlatformError::InvalidConfig {
            message: format!("invalid GitLab URL '{base_url}': {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PlatformError::InvalidConfig {
                message: format!("GitLab URL '{base_url}' cannot be a base URL"),
            });
        }

        let client = Client::builder()
            .user_agent(concat!("repo-migrator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Builds `<base>/api/v4/<segments...>`; each segment is percent-encoded,
    /// so a `group/project` path becomes a single `group%2Fproject` segment.
    fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v4"]).extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, PlatformError> {
        debug!(url = %url, "GitLab request");
        let response = self
            .client
            .get(url.clone())
            .header(TOKEN_HEADER, &self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MergeRequestSource for GitLabSource {
    async fn authenticate(&self) -> Result<(), PlatformError> {
        let user: SourceUser = self.get_json(self.api_url(&["user"]), &[]).await?;
        debug!(username = %user.username, "Authenticated with GitLab");
        Ok(())
    }

    async fn resolve_project(&self, path: &RepositoryPath) -> Result<SourceProject, PlatformError> {
        let url = self.api_url(&["projects", path.as_str()]);
        self.get_json(url, &[]).await.map_err(|e| {
            if e.is_not_found() {
                PlatformError::NotFound {
                    resource: format!("GitLab project '{path}'"),
                }
            } else {
                e
            }
        })
    }

    async fn list_open_merge_requests(
        &self,
        project: &SourceProject,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SourceMergeRequest>, PlatformError> {
        let id = project.id.to_string();
        let url = self.api_url(&["projects", &id, "merge_requests"]);
        let query = [
            ("state", "opened".to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        self.get_json(url, &query).await
    }

    async fn list_notes(
        &self,
        project: &SourceProject,
        merge_request_iid: u64,
    ) -> Result<Vec<SourceNote>, PlatformError> {
        let id = project.id.to_string();
        let iid = merge_request_iid.to_string();
        let url = self.api_url(&["projects", &id, "merge_requests", &iid, "notes"]);

        let mut notes = Vec::new();
        let mut page = 1u32;
        loop {
            let query = [
                ("sort", "asc".to_string()),
                ("order_by", "created_at".to_string()),
                ("page", page.to_string()),
                ("per_page", NOTES_PER_PAGE.to_string()),
            ];
            let batch: Vec<SourceNote> = self.get_json(url.clone(), &query).await?;
            if batch.is_empty() {
                break;
            }
            notes.extend(batch);
            page += 1;
        }
        Ok(notes)
    }

    async fn time_stats(
        &self,
        project: &SourceProject,
        merge_request_iid: u64,
    ) -> Result<TimeStats, PlatformError> {
        let id = project.id.to_string();
        let iid = merge_request_iid.to_string();
        let url = self.api_url(&["projects", &id, "merge_requests", &iid, "time_stats"]);
        self.get_json(url, &[]).await
    }
}
