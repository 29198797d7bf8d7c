//! Platform-neutral merge request record.

use crate::platform::{SourceMergeRequest, TimeStats};
use std::collections::BTreeSet;

/// A merge request normalised for replay on the destination platform.
///
/// Absent values are `None` or empty collections; the string sentinels some
/// exports use for "nothing" never survive construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeRequestRecord {
    /// Web URL on the source platform.
    pub url: String,
    /// Project-scoped number.
    pub id: u64,
    /// Title.
    pub title: String,
    /// Description (empty when the source had none).
    pub description: String,
    /// Source state, e.g. `opened`.
    pub status: String,
    /// Whether the source request is a draft.
    pub is_draft: bool,
    /// Branch holding the changes.
    pub source_branch: String,
    /// Branch the changes go into.
    pub target_branch: String,
    /// Source username of the assignee.
    pub assignee: Option<String>,
    /// Source usernames of the reviewers, in source order.
    pub reviewers: Vec<String>,
    /// Labels.
    pub labels: BTreeSet<String>,
    /// Milestone title.
    pub milestone: Option<String>,
    /// Estimated time, seconds.
    pub time_estimate: u64,
    /// Time spent, seconds.
    pub time_spent: u64,
    /// Comment bodies, oldest first.
    pub comments: Vec<String>,
}

/// Maps empty strings and the `None` sentinel to absent.
#[must_use]
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
        .map(str::to_string)
}

impl MergeRequestRecord {
    /// Builds a record from a source merge request and its thread.
    #[must_use]
    pub fn from_source(
        source: &SourceMergeRequest,
        time_stats: TimeStats,
        comments: Vec<String>,
    ) -> Self {
        let reviewers = source
            .reviewers
            .iter()
            .flatten()
            .filter_map(|user| normalize_optional(Some(user.username.as_str())))
            .collect();

        let labels = source
            .labels
            .iter()
            .flatten()
            .filter_map(|label| normalize_optional(Some(label.as_str())))
            .collect();

        Self {
            url: source.web_url.clone(),
            id: source.iid,
            title: source.title.clone(),
            description: source.description.clone().unwrap_or_default(),
            status: source.state.clone(),
            is_draft: source.draft || source.work_in_progress,
            source_branch: source.source_branch.clone(),
            target_branch: source.target_branch.clone(),
            assignee: normalize_optional(source.assignee.as_ref().map(|u| u.username.as_str())),
            reviewers,
            labels,
            milestone: normalize_optional(source.milestone.as_ref().map(|m| m.title.as_str())),
            time_estimate: time_stats.time_estimate,
            time_spent: time_stats.total_time_spent,
            comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{SourceMilestone, SourceUser};

    fn user(username: &str) -> SourceUser {
        SourceUser {
            username: username.to_string(),
            name: None,
        }
    }

    #[test]
    fn none_sentinels_become_absent() {
        assert_eq!(normalize_optional(Some("None")), None);
        assert_eq!(normalize_optional(Some(" none ")), None);
        assert_eq!(normalize_optional(Some("")), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some("v1.0")), Some("v1.0".to_string()));
    }

    #[test]
    fn builds_record_from_source() {
        let source = SourceMergeRequest {
            iid: 55,
            title: "Add watchdog".to_string(),
            description: None,
            state: "opened".to_string(),
            work_in_progress: true,
            source_branch: "feature".to_string(),
            target_branch: "main".to_string(),
            web_url: "https://gitlab.com/g/p/-/merge_requests/55".to_string(),
            assignee: Some(user("alice")),
            reviewers: Some(vec![user("bob"), user("carol")]),
            labels: Some(vec!["sw0.8".to_string(), "None".to_string()]),
            milestone: Some(SourceMilestone {
                title: "None".to_string(),
            }),
            ..Default::default()
        };
        let stats = TimeStats {
            time_estimate: 3600,
            total_time_spent: 1800,
        };

        let record = MergeRequestRecord::from_source(&source, stats, vec!["hi".to_string()]);

        assert_eq!(record.id, 55);
        assert!(record.is_draft);
        assert_eq!(record.description, "");
        assert_eq!(record.assignee.as_deref(), Some("alice"));
        assert_eq!(record.reviewers, vec!["bob", "carol"]);
        assert_eq!(record.labels.len(), 1);
        assert!(record.labels.contains("sw0.8"));
        assert_eq!(record.milestone, None);
        assert_eq!(record.time_estimate, 3600);
        assert_eq!(record.comments, vec!["hi"]);
    }

    #[test]
    fn missing_collections_become_empty() {
        let source = SourceMergeRequest {
            iid: 1,
            title: "t".to_string(),
            state: "opened".to_string(),
            source_branch: "a".to_string(),
            target_branch: "b".to_string(),
            web_url: "https://gitlab.com/g/p/-/merge_requests/1".to_string(),
            ..Default::default()
        };

        let record = MergeRequestRecord::from_source(&source, TimeStats::default(), Vec::new());

        assert_eq!(record.assignee, None);
        assert!(record.reviewers.is_empty());
        assert!(record.labels.is_empty());
        assert_eq!(record.milestone, None);
    }
}
