//! Plain-text result files in a per-run output directory.

use super::{ResultSink, SinkError};
use crate::remotes::{RemoteRewriteResult, RemoteStatus};
use crate::summary::{ProjectOutcome, ProjectStatus};
use chrono::{DateTime, Local, TimeZone};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Projects whose steps all succeeded.
pub const SUCCESS_FILE: &str = "successful.txt";
/// Projects whose steps all failed.
pub const FAILED_FILE: &str = "failed.txt";
/// Projects with some failed steps.
pub const PARTIAL_FILE: &str = "partial_success.txt";
/// Pipeline lines rewritten per project.
pub const SERVICES_FILE: &str = "updated_services.txt";
/// One line per local working copy visited by a remote rewrite.
pub const REMOTES_FILE: &str = "remotes.txt";
/// Log written next to the result files.
pub const LOG_FILE: &str = "migration.log";

/// `output_<YYYYmmddHHMMSS>` for the given instant.
#[must_use]
pub fn output_directory_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("output_{}", now.format("%Y%m%d%H%M%S"))
}

/// A fresh `output_<timestamp>` directory path under `root`, in local time.
#[must_use]
pub fn timestamped_output_directory(root: &Path) -> PathBuf {
    root.join(output_directory_name(&Local::now()))
}

/// Appends one line per project to the file matching its status.
///
/// Success and failure lines are `old<TAB>new`; partial lines add the
/// comma-separated failed steps as a third column. Updated services are
/// written as `new<TAB>line`. Remote rewrites are written as
/// `directory<TAB>status` followed by the status details. Files are opened in append mode for each
/// project and closed again.
#[derive(Debug)]
pub struct FileResultSink {
    directory: PathBuf,
    write_lock: Mutex<()>,
}

impl FileResultSink {
    /// Uses `directory`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the directory cannot be created.
    pub fn create(directory: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(|source| SinkError::IoError {
            path: directory.display().to_string(),
            source,
        })?;
        Ok(Self {
            directory,
            write_lock: Mutex::new(()),
        })
    }

    /// The output directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn append(&self, file: &str, lines: &[String]) -> Result<(), SinkError> {
        let path = self.directory.join(file);
        let io_error = |source| SinkError::IoError {
            path: path.display().to_string(),
            source,
        };
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;
        for line in lines {
            writeln!(handle, "{line}").map_err(io_error)?;
        }
        Ok(())
    }
}

impl ResultSink for FileResultSink {
    fn record(&self, project: &ProjectOutcome) -> Result<(), SinkError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let pair = format!("{}\t{}", project.old_url, project.new_url);
        match project.status() {
            ProjectStatus::Success => self.append(SUCCESS_FILE, &[pair])?,
            ProjectStatus::Failure => self.append(FAILED_FILE, &[pair])?,
            ProjectStatus::PartialSuccess => {
                let failed: Vec<String> = project
                    .failed_steps()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                self.append(PARTIAL_FILE, &[format!("{pair}\t{}", failed.join(","))])?;
            }
        }

        if !project.updated_services.is_empty() {
            let lines: Vec<String> = project
                .updated_services
                .iter()
                .map(|service| format!("{}\t{service}", project.new_url))
                .collect();
            self.append(SERVICES_FILE, &lines)?;
        }
        Ok(())
    }

    fn record_remote(&self, result: &RemoteRewriteResult) -> Result<(), SinkError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut columns = vec![
            result.directory.display().to_string(),
            result.status.label().to_string(),
        ];
        match &result.status {
            RemoteStatus::NoMatch { origin } => columns.push(origin.clone()),
            RemoteStatus::Rewritten { from, to } => {
                columns.push(from.clone());
                columns.push(to.clone());
            }
            RemoteStatus::Failed(message) => {
                columns.push(message.split_whitespace().collect::<Vec<_>>().join(" "));
            }
            RemoteStatus::NotARepository | RemoteStatus::NoOrigin => {}
        }
        self.append(REMOTES_FILE, &[columns.join("\t")])
    }
}
