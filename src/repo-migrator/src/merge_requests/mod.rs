//! Fetching open merge requests from the source platform.

mod record;

pub use record::{normalize_optional, MergeRequestRecord};

use crate::outcome::OperationOutcome;
use crate::platform::{MergeRequestSource, PlatformError, SourceProject, TimeStats};
use crate::urls::RepositoryPath;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Page size for the merge request listing.
///
/// The listing must be paged explicitly; without it GitLab truncates to its
/// own default page size.
pub const MERGE_REQUESTS_PER_PAGE: u32 = 100;

/// Result of a fetch: the outcome plus whatever records were produced.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Success or failure of the fetch as a whole.
    pub outcome: OperationOutcome,
    /// Normalised records, newest first as listed by the source.
    pub records: Vec<MergeRequestRecord>,
}

/// Fetches every open merge request of a project.
///
/// Authenticates, resolves the project, pages through open merge requests
/// until an empty page, and reads each one's comment thread and time
/// tracking. A transport or authentication failure yields `had_error` with no
/// records; it is never raised to the caller.
pub async fn fetch_open_merge_requests(
    source: &dyn MergeRequestSource,
    path: &RepositoryPath,
) -> FetchOutcome {
    let span = info_span!("fetch_merge_requests", project = %path);

    async {
        match fetch_all(source, path).await {
            Ok(records) => {
                info!(count = records.len(), "Fetched open merge requests");
                FetchOutcome {
                    outcome: OperationOutcome::success(format!(
                        "Fetched {} open merge requests from {path}",
                        records.len()
                    )),
                    records,
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch merge requests");
                FetchOutcome {
                    outcome: OperationOutcome::failure(format!(
                        "Failed to fetch merge requests of {path}: {e}"
                    )),
                    records: Vec::new(),
                }
            }
        }
    }
    .instrument(span)
    .await
}

async fn fetch_all(
    source: &dyn MergeRequestSource,
    path: &RepositoryPath,
) -> Result<Vec<MergeRequestRecord>, PlatformError> {
    source.authenticate().await?;
    let project = source.resolve_project(path).await?;
    info!(project_id = project.id, "Resolved project");

    let mut raw = Vec::new();
    let mut page = 1u32;
    loop {
        let batch = source
            .list_open_merge_requests(&project, page, MERGE_REQUESTS_PER_PAGE)
            .await?;
        if batch.is_empty() {
            break;
        }
        debug!(page, count = batch.len(), "Fetched merge request page");
        raw.extend(batch);
        page += 1;
    }

    let mut records = Vec::with_capacity(raw.len());
    for merge_request in &raw {
        let comments = source
            .list_notes(&project, merge_request.iid)
            .await?
            .into_iter()
            .filter(|note| !note.system)
            .map(|note| note.body)
            .collect();
        let time_stats = read_time_stats(source, &project, merge_request.iid).await;
        records.push(MergeRequestRecord::from_source(
            merge_request,
            time_stats,
            comments,
        ));
    }

    Ok(records)
}

async fn read_time_stats(
    source: &dyn MergeRequestSource,
    project: &SourceProject,
    iid: u64,
) -> TimeStats {
    match source.time_stats(project, iid).await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(merge_request = iid, error = %e, "Failed to read time tracking");
            TimeStats::default()
        }
    }
}
