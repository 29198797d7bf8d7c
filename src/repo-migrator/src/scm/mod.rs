//! Rewriting the SCM coordinates of `pom.xml` on every branch.

mod error;
mod pom;

pub use error::PomError;
pub use pom::{rewrite_scm, PomRewrite, ScmCoordinates};

use crate::git::{run_git_command_redacted, GitError};
use crate::outcome::OperationOutcome;
use crate::urls::{authenticated_clone_url, extract_repository_path};
use std::path::Path;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Build descriptor rewritten on each branch.
pub const DESCRIPTOR: &str = "pom.xml";

const COMMIT_NAME: &str = "repo-migrator";
const COMMIT_EMAIL: &str = "repo-migrator@users.noreply.github.com";

/// What happened to a single branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchChange {
    /// The descriptor was rewritten, committed and pushed.
    Updated,
    /// The descriptor already carried the target coordinates.
    Unchanged,
    /// The branch has no descriptor.
    NoDescriptor,
}

/// Clones `repository_url` and rewrites `pom.xml` on every remote branch.
///
/// The clone lives in a temporary directory that is removed when this
/// returns, whatever the outcome. A fault on one branch is recorded and the
/// remaining branches are still processed; the outcome fails when any
/// branch did, with every branch fault in its message.
pub async fn update_scm_connections(repository_url: &str, token: &str) -> OperationOutcome {
    let span = info_span!("update_scm_connections", repo = %repository_url);

    async {
        let path = match extract_repository_path(repository_url) {
            Ok(path) => path,
            Err(e) => return OperationOutcome::failure(e.to_string()),
        };
        let clone_url = match authenticated_clone_url(repository_url, token) {
            Ok(url) => url,
            Err(e) => return OperationOutcome::failure(e.to_string()),
        };
        let workspace = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                return OperationOutcome::failure(format!(
                    "Failed to create temporary directory: {e}"
                ))
            }
        };
        let checkout = workspace.path().join("repo");
        let checkout_arg = checkout.to_string_lossy().into_owned();

        info!("Cloning repository");
        if let Err(e) = run_git_command_redacted(
            workspace.path(),
            &["clone", "--quiet", &clone_url, &checkout_arg],
            Some(token),
        )
        .await
        {
            error!(error = %e, "Clone failed");
            return OperationOutcome::failure(format!("Failed to clone {path}: {e}"));
        }

        let coordinates = ScmCoordinates::for_github(&path);
        rewrite_all_branches(&checkout, &coordinates, Some(token)).await
    }
    .instrument(span)
    .await
}

/// Rewrites the descriptor on every branch of `origin` in an existing clone.
pub(crate) async fn rewrite_all_branches(
    checkout: &Path,
    coordinates: &ScmCoordinates,
    secret: Option<&str>,
) -> OperationOutcome {
    let branches = match remote_branches(checkout, secret).await {
        Ok(branches) => branches,
        Err(e) => {
            error!(error = %e, "Failed to list branches");
            return OperationOutcome::failure(format!("Failed to list branches: {e}"));
        }
    };

    let mut updated = 0usize;
    let mut faults = Vec::new();
    for branch in &branches {
        match rewrite_branch(checkout, branch, coordinates, secret).await {
            Ok(BranchChange::Updated) => {
                info!(branch = %branch, "Descriptor updated");
                updated += 1;
            }
            Ok(BranchChange::Unchanged) => {
                debug!(branch = %branch, "Descriptor already up to date");
            }
            Ok(BranchChange::NoDescriptor) => {
                debug!(branch = %branch, "No descriptor on branch");
            }
            Err(fault) => {
                warn!(branch = %branch, error = %fault, "Branch rewrite failed");
                faults.push(format!("{branch}: {fault}"));
                discard_changes(checkout, secret).await;
            }
        }
    }

    if faults.is_empty() {
        OperationOutcome::success(format!(
            "Updated {DESCRIPTOR} on {updated} of {} branches",
            branches.len()
        ))
    } else {
        OperationOutcome::failure(format!(
            "Failed to update {DESCRIPTOR} on {} branch(es): {}",
            faults.len(),
            faults.join("; ")
        ))
    }
}

async fn remote_branches(checkout: &Path, secret: Option<&str>) -> Result<Vec<String>, GitError> {
    let listing = run_git_command_redacted(
        checkout,
        &[
            "for-each-ref",
            "--format=%(refname:strip=3)",
            "refs/remotes/origin",
        ],
        secret,
    )
    .await?;

    Ok(listing
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "HEAD")
        .map(str::to_string)
        .collect())
}

/// Drops uncommitted changes left by a failed branch so the next checkout
/// starts from a clean tree.
async fn discard_changes(checkout: &Path, secret: Option<&str>) {
    if let Err(e) =
        run_git_command_redacted(checkout, &["reset", "--hard", "--quiet"], secret).await
    {
        warn!(error = %e, "Failed to reset working tree");
    }
}

async fn rewrite_branch(
    checkout: &Path,
    branch: &str,
    coordinates: &ScmCoordinates,
    secret: Option<&str>,
) -> Result<BranchChange, String> {
    let git = |args: Vec<String>| async move {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_git_command_redacted(checkout, &args, secret)
            .await
            .map_err(|e| e.to_string())
    };

    git(vec![
        "checkout".into(),
        "--quiet".into(),
        "-B".into(),
        branch.into(),
        format!("origin/{branch}"),
    ])
    .await?;

    let descriptor = checkout.join(DESCRIPTOR);
    if !descriptor.is_file() {
        return Ok(BranchChange::NoDescriptor);
    }

    let xml = tokio::fs::read_to_string(&descriptor)
        .await
        .map_err(|e| format!("Failed to read {DESCRIPTOR}: {e}"))?;
    let rewrite = rewrite_scm(&xml, coordinates).map_err(|e| e.to_string())?;
    if !rewrite.changed {
        return Ok(BranchChange::Unchanged);
    }
    tokio::fs::write(&descriptor, rewrite.content)
        .await
        .map_err(|e| format!("Failed to write {DESCRIPTOR}: {e}"))?;

    git(vec!["add".into(), DESCRIPTOR.into()]).await?;
    git(vec![
        "-c".into(),
        format!("user.name={COMMIT_NAME}"),
        "-c".into(),
        format!("user.email={COMMIT_EMAIL}"),
        "commit".into(),
        "--quiet".into(),
        "-m".into(),
        format!("Update '{DESCRIPTOR}' for branch: {branch}"),
    ])
    .await?;
    git(vec![
        "push".into(),
        "--quiet".into(),
        "origin".into(),
        branch.into(),
    ])
    .await?;

    Ok(BranchChange::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urls::RepositoryPath;
    use std::process::Command;
    use tempfile::TempDir;

    const POM: &str = "<project>\n  <scm>\n    <connection>scm:git:git@gitlab.com:g/svc.git</connection>\n    <developerConnection>scm:git:git@gitlab.com:g/svc.git</developerConnection>\n    <url>https://gitlab.com/g/svc</url>\n  </scm>\n</project>\n";

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Bare remote with `alpha` and `main` (valid pom), `docs` (no pom) and
    /// `broken` (pom without scm), plus a fresh clone of it.
    fn fixture() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.git");
        let seed = temp.path().join("seed");
        let clone = temp.path().join("clone");

        git(temp.path(), &["init", "--quiet", "--bare", "remote.git"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(temp.path(), &["clone", "--quiet", "remote.git", "seed"]);

        git(&seed, &["checkout", "--quiet", "-b", "main"]);
        std::fs::write(seed.join(DESCRIPTOR), POM).unwrap();
        git(&seed, &["add", "."]);
        git(&seed, &["commit", "--quiet", "-m", "pom"]);

        git(&seed, &["checkout", "--quiet", "--orphan", "docs"]);
        git(&seed, &["rm", "--quiet", "-rf", "."]);
        std::fs::write(seed.join("README.md"), "docs").unwrap();
        git(&seed, &["add", "."]);
        git(&seed, &["commit", "--quiet", "-m", "docs"]);

        git(&seed, &["checkout", "--quiet", "-b", "broken", "main"]);
        std::fs::write(seed.join(DESCRIPTOR), "<project></project>").unwrap();
        git(&seed, &["commit", "--quiet", "-am", "drop scm"]);

        git(&seed, &["branch", "alpha", "main"]);

        git(&seed, &["push", "--quiet", "origin", "alpha", "main", "docs", "broken"]);
        git(temp.path(), &["clone", "--quiet", "remote.git", "clone"]);

        (temp, remote, clone)
    }

    #[tokio::test]
    async fn rewrites_each_branch_and_aggregates_faults() {
        if !git_available() {
            return;
        }
        let (_temp, remote, clone) = fixture();
        let coordinates = ScmCoordinates::for_github(&RepositoryPath::new("o", "svc"));

        let outcome = rewrite_all_branches(&clone, &coordinates, None).await;

        assert!(outcome.had_error);
        assert!(outcome.message.contains("broken:"));
        assert!(!outcome.message.contains("main:"));
        assert!(!outcome.message.contains("docs:"));

        let pom = git(&remote, &["show", "main:pom.xml"]);
        assert!(pom.contains("<url>https://github.com/o/svc</url>"));
        let subject = git(&remote, &["log", "-1", "--format=%s", "main"]);
        assert_eq!(subject, "Update 'pom.xml' for branch: main");
        assert_eq!(git(&remote, &["rev-list", "--count", "docs"]), "1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_commit_does_not_leak_into_later_branches() {
        use std::os::unix::fs::PermissionsExt;

        if !git_available() {
            return;
        }
        let (_temp, remote, clone) = fixture();
        let hook = clone.join(".git/hooks/pre-commit");
        std::fs::write(
            &hook,
            "#!/bin/sh\n[ \"$(git rev-parse --abbrev-ref HEAD)\" != alpha ]\n",
        )
        .unwrap();
        std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();
        let coordinates = ScmCoordinates::for_github(&RepositoryPath::new("o", "svc"));

        let outcome = rewrite_all_branches(&clone, &coordinates, None).await;

        assert!(outcome.message.contains("alpha:"));
        assert!(!outcome.message.contains("docs:"));
        assert!(!outcome.message.contains("main:"));
        assert!(git(&clone, &["status", "--porcelain"]).is_empty());
        assert!(git(&remote, &["show", "alpha:pom.xml"]).contains("gitlab.com"));
        let subject = git(&remote, &["log", "-1", "--format=%s", "main"]);
        assert_eq!(subject, "Update 'pom.xml' for branch: main");
    }

    #[tokio::test]
    async fn second_pass_makes_no_commits() {
        if !git_available() {
            return;
        }
        let (temp, remote, clone) = fixture();
        let coordinates = ScmCoordinates::for_github(&RepositoryPath::new("o", "svc"));
        rewrite_all_branches(&clone, &coordinates, None).await;
        let before = git(&remote, &["rev-parse", "main"]);

        git(temp.path(), &["clone", "--quiet", "remote.git", "again"]);
        rewrite_all_branches(&temp.path().join("again"), &coordinates, None).await;

        assert_eq!(git(&remote, &["rev-parse", "main"]), before);
    }

    #[tokio::test]
    async fn unsupported_url_fails_before_cloning() {
        let outcome = update_scm_connections("https://example.com/o/r", "token").await;
        assert!(outcome.had_error);
    }
}
