//! Renaming a repository on the destination platform.

use crate::outcome::OperationOutcome;
use crate::platform::RepositoryHost;
use crate::urls::RepositoryPath;
use tracing::{error, info, info_span, Instrument};

/// Renames `repo` to `new_name` within its owner.
///
/// Equal names are a no-op success. Otherwise the repository must exist and
/// be visible to the token; the rename outcome carries the web URL of the
/// renamed repository in `new_url`.
pub async fn rename_repository(
    host: &dyn RepositoryHost,
    repo: &RepositoryPath,
    new_name: &str,
) -> OperationOutcome {
    let span = info_span!("rename_repository", repo = %repo, new_name);

    async {
        if repo.name() == new_name {
            info!("Repository already has the requested name");
            return OperationOutcome::success(format!(
                "Repository {repo} already named {new_name}, nothing to rename"
            ))
            .with_new_url(format!("https://github.com/{repo}"));
        }

        match host.get_repository(repo).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                error!("Repository not found");
                return OperationOutcome::failure(format!(
                    "Repository {repo} does not exist or no permission to access it"
                ));
            }
            Err(e) => {
                error!(error = %e, "Failed to look up repository");
                return OperationOutcome::failure(format!(
                    "Failed to look up repository {repo}: {e}"
                ));
            }
        }

        match host.rename_repository(repo, new_name).await {
            Ok(renamed) => {
                info!(url = %renamed.html_url, "Repository renamed");
                OperationOutcome::success(format!(
                    "Renamed {repo} to {}",
                    renamed.full_name
                ))
                .with_new_url(renamed.html_url)
            }
            Err(e) => {
                error!(error = %e, "Failed to rename repository");
                OperationOutcome::failure(format!(
                    "Failed to rename {repo} to {new_name}: {e}"
                ))
            }
        }
    }
    .instrument(span)
    .await
}
