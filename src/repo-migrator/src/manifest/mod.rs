//! Tab-separated manifest loading.
//!
//! Two manifests drive a run: the project list (old URL, new URL, optional
//! new name) and the member list (source username, destination username).

mod error;
mod members;
mod projects;

pub use error::ManifestError;
pub use members::{get_member_list, MemberMap, MemberRecord};
pub use projects::{get_project_list, ProjectRecord};

use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

/// A non-blank data row with its 1-based line number in the file.
struct Row {
    line: usize,
    record: StringRecord,
}

impl Row {
    /// Returns the trimmed field at `index`, or `None` when absent or empty.
    fn field(&self, index: usize) -> Option<&str> {
        self.record
            .get(index)
            .map(str::trim)
            .filter(|field| !field.is_empty())
    }
}

/// Reads a tab-separated manifest into its header and non-blank data rows.
///
/// Quoted cells are unquoted. Rows may have fewer or more fields than the
/// header. Line numbers count the header as line 1.
fn read_rows(path: &Path) -> Result<(StringRecord, Vec<Row>), ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;
    let parse_error = |source: csv::Error| ManifestError::Parse {
        path: path.display().to_string(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(content.as_bytes());
    let header = reader.headers().map_err(parse_error)?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(parse_error)?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let line = record
            .position()
            .map_or(0, |position| line_at(&content, position.byte()));
        rows.push(Row { line, record });
    }

    Ok((header, rows))
}

/// 1-based line of the first byte at or after `offset` that is not a line
/// break.
fn line_at(content: &str, offset: u64) -> usize {
    let bytes = content.as_bytes();
    let mut start = usize::try_from(offset).map_or(bytes.len(), |o| o.min(bytes.len()));
    while start < bytes.len() && matches!(bytes[start], b'\n' | b'\r') {
        start += 1;
    }
    bytes[..start].iter().filter(|&&byte| byte == b'\n').count() + 1
}
