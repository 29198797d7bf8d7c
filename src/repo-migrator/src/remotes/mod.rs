//! Pointing local working copies at their migrated repositories.

mod error;

pub use error::RemoteError;

use crate::git::{is_working_copy, run_git_command, GitError};
use crate::manifest::ProjectRecord;
use crate::urls::{normalize_remote_url, to_ssh_remote};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn, Instrument};

const ORIGIN: &str = "origin";

/// How the mapped URL replaces the current `origin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemoteMode {
    /// Keep the old remote under an archival name and add a new `origin`.
    #[default]
    Archive,
    /// Overwrite the URL of `origin` in place.
    Overwrite,
}

/// Settings for [`rewrite_remotes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRewriteOptions {
    /// Replacement strategy.
    pub mode: RemoteMode,
    /// Name the old `origin` is kept under in [`RemoteMode::Archive`].
    pub archive_name: String,
    /// Render the new remote as `git@host:path.git` rather than HTTPS.
    pub prefer_ssh: bool,
}

impl Default for RemoteRewriteOptions {
    fn default() -> Self {
        Self {
            mode: RemoteMode::Archive,
            archive_name: "gitlab".to_string(),
            prefer_ssh: true,
        }
    }
}

/// What happened to one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Not a git working copy; left untouched.
    NotARepository,
    /// A working copy without an `origin` remote.
    NoOrigin,
    /// `origin` matches no project in the manifest.
    NoMatch { origin: String },
    /// `origin` now points at the destination repository.
    Rewritten { from: String, to: String },
    /// A git command failed part way.
    Failed(String),
}

impl RemoteStatus {
    /// Short kebab-case name of the status.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotARepository => "not-a-repository",
            Self::NoOrigin => "no-origin",
            Self::NoMatch { .. } => "no-match",
            Self::Rewritten { .. } => "rewritten",
            Self::Failed(_) => "failed",
        }
    }
}

/// Result for one candidate directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRewriteResult {
    pub directory: PathBuf,
    pub status: RemoteStatus,
}

/// Rewrites `origin` of every working copy directly under `root`.
///
/// Each remote is matched against the manifest after both sides are
/// normalised, so SSH and HTTPS spellings and a trailing `.git` do not
/// matter. Directories are processed in name order and one directory's
/// failure never stops the others.
///
/// # Errors
///
/// Returns [`RemoteError`] only when `root` itself cannot be listed.
pub async fn rewrite_remotes(
    root: &Path,
    projects: &[ProjectRecord],
    options: &RemoteRewriteOptions,
) -> Result<Vec<RemoteRewriteResult>, RemoteError> {
    let lookup = build_lookup(projects);
    let mut directories = list_directories(root).await?;
    directories.sort();

    let mut results = Vec::with_capacity(directories.len());
    for directory in directories {
        let span = info_span!("rewrite_remote", dir = %directory.display());
        let status = rewrite_one(&directory, &lookup, options)
            .instrument(span)
            .await;
        results.push(RemoteRewriteResult { directory, status });
    }
    Ok(results)
}

/// Maps the normalised old URL to the remote that should replace it.
fn build_lookup(projects: &[ProjectRecord]) -> HashMap<String, &ProjectRecord> {
    let mut lookup = HashMap::with_capacity(projects.len());
    for project in projects {
        match normalize_remote_url(&project.old_source_url) {
            Ok(key) => {
                lookup.entry(key).or_insert(project);
            }
            Err(e) => warn!(url = %project.old_source_url, error = %e, "Unusable project URL"),
        }
    }
    lookup
}

async fn list_directories(root: &Path) -> Result<Vec<PathBuf>, RemoteError> {
    let io_error = |source| RemoteError::IoError {
        path: root.display().to_string(),
        source,
    };
    let mut entries = tokio::fs::read_dir(root).await.map_err(io_error)?;
    let mut directories = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let path = entry.path();
        if path.is_dir() {
            directories.push(path);
        }
    }
    Ok(directories)
}

async fn rewrite_one(
    directory: &Path,
    lookup: &HashMap<String, &ProjectRecord>,
    options: &RemoteRewriteOptions,
) -> RemoteStatus {
    if !is_working_copy(directory) {
        info!("Not a git repository, skipping");
        return RemoteStatus::NotARepository;
    }

    let Ok(origin) = run_git_command(directory, &["remote", "get-url", ORIGIN]).await else {
        warn!("No origin remote, skipping");
        return RemoteStatus::NoOrigin;
    };

    let project = normalize_remote_url(&origin)
        .ok()
        .and_then(|key| lookup.get(&key).copied());
    let Some(project) = project else {
        info!(origin = %origin, "Origin not in project list, skipping");
        return RemoteStatus::NoMatch { origin };
    };

    let rendered = if options.prefer_ssh {
        to_ssh_remote(&project.new_destination_url)
    } else {
        normalize_remote_url(&project.new_destination_url)
    };
    let new_url = match rendered {
        Ok(url) => url,
        Err(e) => return RemoteStatus::Failed(e.to_string()),
    };

    match apply(directory, &new_url, options).await {
        Ok(()) => {
            info!(from = %origin, to = %new_url, "Origin rewritten");
            RemoteStatus::Rewritten {
                from: origin,
                to: new_url,
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to rewrite origin");
            RemoteStatus::Failed(e.to_string())
        }
    }
}

async fn apply(
    directory: &Path,
    new_url: &str,
    options: &RemoteRewriteOptions,
) -> Result<(), GitError> {
    match options.mode {
        RemoteMode::Archive => {
            let archive = options.archive_name.as_str();
            run_git_command(directory, &["remote", "rename", ORIGIN, archive]).await?;

            if let Err(add_error) =
                run_git_command(directory, &["remote", "add", ORIGIN, new_url]).await
            {
                // Put the old remote back so the working copy keeps an origin.
                match run_git_command(directory, &["remote", "rename", archive, ORIGIN]).await {
                    Ok(_) => warn!(archive, "Restored origin after failed add"),
                    Err(restore_error) => {
                        error!(archive, error = %restore_error, "Failed to restore origin");
                    }
                }
                return Err(add_error);
            }
        }
        RemoteMode::Overwrite => {
            run_git_command(directory, &["remote", "set-url", ORIGIN, new_url]).await?;
        }
    }
    Ok(())
}
