//! Replaying merge requests as pull requests on the destination platform.

use crate::manifest::MemberMap;
use crate::merge_requests::MergeRequestRecord;
use crate::outcome::OperationOutcome;
use crate::platform::{NewPullRequest, RepositoryHost};
use crate::urls::RepositoryPath;
use tracing::{error, info, info_span, warn, Instrument};

/// Creates a pull request mirroring a merge request.
///
/// Opening the pull request is the only step whose failure fails the whole
/// operation. Every later step (assignee, reviewers, labels, milestone,
/// comments, provenance comment) is attempted independently; its failure is
/// logged and recorded as a warning on the returned outcome.
///
/// Assignee and reviewers are mapped through `members` first and then
/// checked against the repository's collaborators; a user failing either
/// check is skipped with a warning.
///
/// # Arguments
///
/// * `host` - Destination platform client
/// * `repo` - Destination repository
/// * `record` - Merge request to replay
/// * `members` - Source to destination username mapping
/// * `draft` - Open as a draft when the source was one
pub async fn create_pull_request(
    host: &dyn RepositoryHost,
    repo: &RepositoryPath,
    record: &MergeRequestRecord,
    members: &MemberMap,
    draft: bool,
) -> OperationOutcome {
    let span = info_span!(
        "create_pull_request",
        repo = %repo,
        merge_request = record.id
    );

    async {
        info!(
            source = %record.source_branch,
            target = %record.target_branch,
            "Creating pull request"
        );

        let request = NewPullRequest {
            title: record.title.clone(),
            body: record.description.clone(),
            head: record.source_branch.clone(),
            base: record.target_branch.clone(),
            draft: draft && record.is_draft,
        };

        let created = match host.create_pull_request(repo, &request).await {
            Ok(created) => created,
            Err(e) => {
                error!(error = %e, "Failed to create pull request");
                return OperationOutcome::failure(format!(
                    "Failed to create pull request for {}: {e}",
                    record.url
                ));
            }
        };
        info!(number = created.number, url = %created.url, "Pull request created");

        let number = created.number;
        let mut warnings = Vec::new();

        if let Some(assignee) = &record.assignee {
            if let Some(username) =
                resolve_member(host, repo, members, "assignee", assignee, &mut warnings).await
            {
                if let Err(e) = host.add_assignee(repo, number, &username).await {
                    note(&mut warnings, format!("Failed to assign {username}: {e}"));
                }
            }
        }

        for reviewer in &record.reviewers {
            if let Some(username) =
                resolve_member(host, repo, members, "reviewer", reviewer, &mut warnings).await
            {
                if let Err(e) = host.request_reviewer(repo, number, &username).await {
                    note(
                        &mut warnings,
                        format!("Failed to request review from {username}: {e}"),
                    );
                }
            }
        }

        if !record.labels.is_empty() {
            let labels: Vec<String> = record.labels.iter().cloned().collect();
            if let Err(e) = host.add_labels(repo, number, &labels).await {
                note(&mut warnings, format!("Failed to add labels: {e}"));
            }
        }

        if let Some(milestone) = &record.milestone {
            if let Err(e) = host.set_milestone(repo, number, milestone).await {
                note(
                    &mut warnings,
                    format!("Failed to set milestone '{milestone}': {e}"),
                );
            }
        }

        for (index, comment) in record.comments.iter().enumerate() {
            if let Err(e) = host.create_comment(repo, number, comment).await {
                note(
                    &mut warnings,
                    format!("Failed to copy comment {}: {e}", index + 1),
                );
            }
        }

        if let Err(e) = host
            .create_comment(repo, number, &provenance_comment(record))
            .await
        {
            note(&mut warnings, format!("Failed to add provenance comment: {e}"));
        }

        OperationOutcome::success(format!(
            "Created pull request #{number} from {}",
            record.url
        ))
        .with_new_url(created.url)
        .with_warnings(warnings)
    }
    .instrument(span)
    .await
}

/// Maps a source username and checks the result is a collaborator.
async fn resolve_member(
    host: &dyn RepositoryHost,
    repo: &RepositoryPath,
    members: &MemberMap,
    role: &str,
    source_username: &str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let Some(username) = members.destination_for(source_username) else {
        note(
            warnings,
            format!("Skipping {role} {source_username}: no destination username mapped"),
        );
        return None;
    };

    match host.is_collaborator(repo, username).await {
        Ok(true) => Some(username.to_string()),
        Ok(false) => {
            note(
                warnings,
                format!("Skipping {role} {username}: not a collaborator on {repo}"),
            );
            None
        }
        Err(e) => {
            note(
                warnings,
                format!("Skipping {role} {username}: collaborator check failed: {e}"),
            );
            None
        }
    }
}

fn note(warnings: &mut Vec<String>, message: String) {
    warn!("{message}");
    warnings.push(message);
}

/// Builds the final comment linking back to the source merge request.
#[must_use]
pub fn provenance_comment(record: &MergeRequestRecord) -> String {
    let mut body = format!(
        "Migrated from GitLab merge request !{}: {}",
        record.id, record.url
    );
    if record.time_estimate > 0 || record.time_spent > 0 {
        body.push_str(&format!(
            "\n\nTime estimate: {}, time spent: {}",
            format_hours(record.time_estimate),
            format_hours(record.time_spent)
        ));
    }
    body
}

fn format_hours(seconds: u64) -> String {
    format!("{:.1}h", seconds as f64 / 3600.0)
}
