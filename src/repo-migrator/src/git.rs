//! Thin wrapper over the `git` binary.

use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors raised by git invocations.
#[derive(Debug, Error)]
pub enum GitError {
    /// git could not be started.
    #[error("Failed to execute git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// git exited with a failure status.
    #[error("git {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

/// Runs a git command in `path`, returning trimmed stdout.
///
/// Occurrences of `secret` are masked in the error output so that tokens
/// embedded in clone URLs never reach the logs.
pub(crate) async fn run_git_command_redacted(
    path: &Path,
    args: &[&str],
    secret: Option<&str>,
) -> Result<String, GitError> {
    let redact = |text: &str| match secret {
        Some(secret) if !secret.is_empty() => text.replace(secret, "***"),
        _ => text.to_string(),
    };
    let command = redact(&args.join(" "));
    debug!(dir = %path.display(), command = %command, "Running git");

    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| GitError::Spawn {
            command: command.clone(),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::Failed {
            command,
            stderr: redact(stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Runs a git command in `path`, returning trimmed stdout.
pub(crate) async fn run_git_command(path: &Path, args: &[&str]) -> Result<String, GitError> {
    run_git_command_redacted(path, args, None).await
}

/// Returns true when `path` is the root of a git working copy.
pub(crate) fn is_working_copy(path: &Path) -> bool {
    path.join(".git").exists()
}
