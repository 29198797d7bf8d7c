//! Rewriting the source URL inside the shared pipeline configuration file.

use crate::outcome::OperationOutcome;
use crate::platform::{FileUpdate, RepositoryHost};
use crate::urls::{extract_repository_path, strip_git_suffix, RepositoryPath};
use tracing::{error, info, info_span, warn, Instrument};

/// Where the pipeline configuration file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFile {
    /// Repository holding the file.
    pub repository: RepositoryPath,
    /// Branch to read from and commit to.
    pub branch: String,
    /// Path of the file inside the repository.
    pub path: String,
}

/// Result of a pipeline rewrite.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    /// Success or failure of the rewrite.
    pub outcome: OperationOutcome,
    /// Distinct lines of the file that referenced the old URL.
    pub updated_services: Vec<String>,
}

/// Replaces every occurrence of `old_url` with `new_url` in the pipeline file.
///
/// Both URLs are compared without a `.git` suffix. When the old URL does not
/// occur in the file nothing is written and the outcome is an error, so that
/// a manifest mismatch never hides behind a silent no-op.
pub async fn update_pipeline_file(
    host: &dyn RepositoryHost,
    file: &PipelineFile,
    old_url: &str,
    new_url: &str,
) -> PipelineOutcome {
    let old_url = strip_git_suffix(old_url);
    let new_url = strip_git_suffix(new_url);
    let span = info_span!(
        "update_pipeline_file",
        repo = %file.repository,
        branch = %file.branch,
        path = %file.path
    );

    async {
        let current = match host
            .get_file(&file.repository, &file.branch, &file.path)
            .await
        {
            Ok(current) => current,
            Err(e) => {
                error!(error = %e, "Failed to read pipeline file");
                return PipelineOutcome {
                    outcome: OperationOutcome::failure(format!(
                        "Failed to read {} from {}@{}: {e}",
                        file.path, file.repository, file.branch
                    )),
                    updated_services: Vec::new(),
                };
            }
        };

        let updated_services = lines_referencing(&current.content, old_url);
        if updated_services.is_empty() {
            warn!(old_url, "Old URL not present in pipeline file");
            return PipelineOutcome {
                outcome: OperationOutcome::failure(format!(
                    "{old_url} not found in {}, nothing updated",
                    file.path
                )),
                updated_services,
            };
        }

        let project_name = extract_repository_path(new_url)
            .map(|path| path.name().to_string())
            .unwrap_or_else(|_| new_url.to_string());
        let message = format!("Change Gitlab url to Github url for {project_name}");
        let content = current.content.replace(old_url, new_url);

        let update = FileUpdate {
            branch: &file.branch,
            path: &file.path,
            message: &message,
            content: &content,
            sha: &current.sha,
        };
        match host.update_file(&file.repository, update).await {
            Ok(()) => {
                info!(services = updated_services.len(), "Pipeline file updated");
                PipelineOutcome {
                    outcome: OperationOutcome::success(format!(
                        "Replaced {old_url} with {new_url} in {}",
                        file.path
                    )),
                    updated_services,
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to commit pipeline file");
                PipelineOutcome {
                    outcome: OperationOutcome::failure(format!(
                        "Failed to commit {}: {e}",
                        file.path
                    )),
                    updated_services: Vec::new(),
                }
            }
        }
    }
    .instrument(span)
    .await
}

fn lines_referencing(content: &str, url: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in content.lines().filter(|line| line.contains(url)) {
        let line = line.trim().to_string();
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeHost, HostCall};

    const PIPELINE: &str = "\
services:
  - name: billing
    repo: https://gitlab.com/g/billing
  - name: billing-worker
    repo: https://gitlab.com/g/billing
  - name: search
    repo: https://gitlab.com/g/search
";

    fn file() -> PipelineFile {
        PipelineFile {
            repository: RepositoryPath::new("o", "devops"),
            branch: "main".to_string(),
            path: "pipelines.yml".to_string(),
        }
    }

    fn host() -> FakeHost {
        FakeHost::new().with_file("o/devops", "main", "pipelines.yml", PIPELINE)
    }

    #[tokio::test]
    async fn replaces_url_and_lists_services() {
        let host = host();

        let result = update_pipeline_file(
            &host,
            &file(),
            "https://gitlab.com/g/billing.git",
            "https://github.com/o/billing.git",
        )
        .await;

        assert!(!result.outcome.had_error, "{}", result.outcome.message);
        assert_eq!(
            result.updated_services,
            vec!["repo: https://gitlab.com/g/billing"]
        );
        let content = host.file("o/devops", "main", "pipelines.yml").unwrap();
        assert_eq!(content.matches("https://github.com/o/billing").count(), 2);
        assert!(content.contains("https://gitlab.com/g/search"));
    }

    #[tokio::test]
    async fn commit_message_names_the_new_project() {
        let host = host();

        update_pipeline_file(
            &host,
            &file(),
            "https://gitlab.com/g/search",
            "https://github.com/o/search-api",
        )
        .await;

        let message = host.calls().into_iter().find_map(|call| match call {
            HostCall::UpdateFile { message, .. } => Some(message),
            _ => None,
        });
        assert_eq!(
            message.as_deref(),
            Some("Change Gitlab url to Github url for search-api")
        );
    }

    #[tokio::test]
    async fn absent_url_writes_nothing() {
        let host = host();

        let result = update_pipeline_file(
            &host,
            &file(),
            "https://gitlab.com/g/unknown",
            "https://github.com/o/unknown",
        )
        .await;

        assert!(result.outcome.had_error);
        assert!(result.updated_services.is_empty());
        assert!(!host
            .calls()
            .iter()
            .any(|c| matches!(c, HostCall::UpdateFile { .. })));
    }

    #[tokio::test]
    async fn missing_file_is_a_failure() {
        let host = FakeHost::new();

        let result = update_pipeline_file(
            &host,
            &file(),
            "https://gitlab.com/g/billing",
            "https://github.com/o/billing",
        )
        .await;

        assert!(result.outcome.had_error);
    }
}
