//! Member manifest and username mapping.

use super::{read_rows, ManifestError};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Maps one source-platform username to a destination-platform username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    /// Username on the source platform.
    pub source_username: String,

    /// Username on the destination platform.
    pub destination_username: String,
}

/// Read-only lookup from source to destination usernames.
///
/// Matching is case-sensitive and exact. When a source username appears more
/// than once, the first row wins.
#[derive(Debug, Clone, Default)]
pub struct MemberMap {
    by_source: HashMap<String, String>,
}

impl MemberMap {
    /// Builds the lookup from manifest records.
    #[must_use]
    pub fn from_records(records: &[MemberRecord]) -> Self {
        let mut by_source = HashMap::with_capacity(records.len());
        for record in records {
            if by_source.contains_key(&record.source_username) {
                warn!(
                    source = %record.source_username,
                    "Duplicate member mapping, keeping the first"
                );
                continue;
            }
            by_source.insert(
                record.source_username.clone(),
                record.destination_username.clone(),
            );
        }
        Self { by_source }
    }

    /// Returns the destination username for a source username.
    #[must_use]
    pub fn destination_for(&self, source_username: &str) -> Option<&str> {
        self.by_source.get(source_username).map(String::as_str)
    }

    /// Number of distinct source usernames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    /// Returns true when no mapping was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

/// Loads the member manifest.
///
/// The first row is a header; the first two columns of every other row are
/// the source and destination usernames.
///
/// # Errors
///
/// Returns [`ManifestError`] when the file is missing, a row lacks either
/// username, or there are no data rows.
pub fn get_member_list(path: &Path) -> Result<Vec<MemberRecord>, ManifestError> {
    info!(path = %path.display(), "Loading member list");
    let path_str = path.display().to_string();

    let (_header, rows) = read_rows(path)?;
    let mut members = Vec::new();

    for row in &rows {
        let field = |index: usize, column: &str| {
            row.field(index)
                .map(str::to_string)
                .ok_or_else(|| ManifestError::MissingField {
                    path: path_str.clone(),
                    line: row.line,
                    column: column.to_string(),
                })
        };

        members.push(MemberRecord {
            source_username: field(0, "source username")?,
            destination_username: field(1, "destination username")?,
        });
    }

    if members.is_empty() {
        return Err(ManifestError::Empty { path: path_str });
    }

    info!(count = members.len(), "Loaded member list");
    Ok(members)
}
