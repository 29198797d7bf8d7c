//! GitLab REST v4 payloads.

use serde::Deserialize;

/// A project resolved from its path.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SourceProject {
    /// Numeric project id.
    pub id: u64,

    /// Project name.
    #[serde(default)]
    pub name: String,

    /// `<namespace>/<name>`.
    #[serde(default)]
    pub path_with_namespace: String,
}

/// A user reference inside a merge request.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SourceUser {
    /// Login name.
    pub username: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A milestone reference inside a merge request.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SourceMilestone {
    /// Milestone title.
    pub title: String,
}

/// A merge request as returned by the listing endpoint.
///
/// Optional collections are `Option` because GitLab sends `null` for some of
/// them on older instances.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SourceMergeRequest {
    /// Project-scoped merge request number.
    pub iid: u64,

    /// Title.
    pub title: String,

    /// Description, if any.
    #[serde(default)]
    pub description: Option<String>,

    /// State (`opened`, `merged`, ...).
    pub state: String,

    /// Draft flag on current instances.
    #[serde(default)]
    pub draft: bool,

    /// Draft flag on older instances.
    #[serde(default)]
    pub work_in_progress: bool,

    /// Branch holding the changes.
    pub source_branch: String,

    /// Branch the changes go into.
    pub target_branch: String,

    /// Web URL.
    pub web_url: String,

    /// Assignee.
    #[serde(default)]
    pub assignee: Option<SourceUser>,

    /// Reviewers.
    #[serde(default)]
    pub reviewers: Option<Vec<SourceUser>>,

    /// Labels.
    #[serde(default)]
    pub labels: Option<Vec<String>>,

    /// Milestone.
    #[serde(default)]
    pub milestone: Option<SourceMilestone>,
}

/// A note on a merge request.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SourceNote {
    /// Markdown body.
    pub body: String,

    /// True for notes GitLab generates itself (assignment, label events).
    #[serde(default)]
    pub system: bool,
}

/// Time-tracking totals, in seconds.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct TimeStats {
    /// Estimated time.
    #[serde(default)]
    pub time_estimate: u64,

    /// Time spent.
    #[serde(default)]
    pub total_time_spent: u64,
}
