//! Project manifest.

use super::{read_rows, ManifestError, Row};
use csv::StringRecord;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

const OLD_URL_COLUMN: &str = "Old_Gitlab_URL";
const NEW_URL_COLUMN: &str = "Github_URL";
const NEW_NAME_COLUMN: &str = "New_Repo_Name";

/// One project to migrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    /// Repository URL on the source platform.
    pub old_source_url: String,

    /// Repository URL on the destination platform.
    pub new_destination_url: String,

    /// Desired destination repository name, when it should be renamed.
    pub new_name: Option<String>,
}

/// Column positions resolved from the header row.
struct Columns {
    old_url: usize,
    new_url: usize,
    new_name: Option<usize>,
}

/// Loads the project manifest.
///
/// The file is tab-separated with a header row naming the columns
/// `Old_Gitlab_URL`, `Github_URL` and optionally `New_Repo_Name`, in any
/// order.
///
/// # Errors
///
/// Returns [`ManifestError`] when the file is missing, a required column or
/// field is absent, a URL does not parse, or there are no data rows.
pub fn get_project_list(path: &Path) -> Result<Vec<ProjectRecord>, ManifestError> {
    info!(path = %path.display(), "Loading project list");
    let path_str = path.display().to_string();

    let (header, rows) = read_rows(path)?;
    let columns = resolve_columns(&header, &path_str)?;

    let projects = rows
        .iter()
        .map(|row| parse_row(row, &columns, &path_str))
        .collect::<Result<Vec<_>, _>>()?;

    if projects.is_empty() {
        return Err(ManifestError::Empty { path: path_str });
    }

    info!(count = projects.len(), "Loaded project list");
    Ok(projects)
}

fn resolve_columns(header: &StringRecord, path: &str) -> Result<Columns, ManifestError> {
    let names: Vec<&str> = header.iter().map(str::trim).collect();
    let position = |column: &str| names.iter().position(|name| *name == column);
    let required = |column: &str| {
        position(column).ok_or_else(|| ManifestError::MissingColumn {
            path: path.to_string(),
            column: column.to_string(),
        })
    };

    Ok(Columns {
        old_url: required(OLD_URL_COLUMN)?,
        new_url: required(NEW_URL_COLUMN)?,
        new_name: position(NEW_NAME_COLUMN),
    })
}

fn parse_row(row: &Row, columns: &Columns, path: &str) -> Result<ProjectRecord, ManifestError> {
    let old_source_url = required_url(row, columns.old_url, OLD_URL_COLUMN, path)?;
    let new_destination_url = required_url(row, columns.new_url, NEW_URL_COLUMN, path)?;
    let new_name = columns
        .new_name
        .and_then(|index| row.field(index))
        .map(str::to_string);

    debug!(line = row.line, old = %old_source_url, new = %new_destination_url, "Parsed project");
    Ok(ProjectRecord {
        old_source_url,
        new_destination_url,
        new_name,
    })
}

fn required_url(
    row: &Row,
    index: usize,
    column: &str,
    path: &str,
) -> Result<String, ManifestError> {
    let value = row.field(index).ok_or_else(|| ManifestError::MissingField {
        path: path.to_string(),
        line: row.line,
        column: column.to_string(),
    })?;

    if Url::parse(value).is_err() {
        return Err(ManifestError::InvalidUrl {
            path: path.to_string(),
            line: row.line,
            value: value.to_string(),
        });
    }

    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("project-list.txt");
        fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn loads_every_data_row() {
        let (_temp, path) = write_manifest(
            "Old_Gitlab_URL\tGithub_URL\tNew_Repo_Name\n\
             https://gitlab.com/g/a.git\thttps://github.com/o/a.git\t\n\
             https://gitlab.com/g/b.git\thttps://github.com/o/b.git\tb-renamed\n",
        );

        let projects = get_project_list(&path).unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].new_name, None);
        assert_eq!(projects[1].new_name.as_deref(), Some("b-renamed"));
        assert_eq!(projects[1].old_source_url, "https://gitlab.com/g/b.git");
    }

    #[test]
    fn name_column_is_optional_and_order_free() {
        let (_temp, path) = write_manifest(
            "Github_URL\tOld_Gitlab_URL\n\
             https://github.com/o/a\thttps://gitlab.com/g/a\n",
        );

        let projects = get_project_list(&path).unwrap();

        assert_eq!(projects[0].old_source_url, "https://gitlab.com/g/a");
        assert_eq!(projects[0].new_destination_url, "https://github.com/o/a");
        assert_eq!(projects[0].new_name, None);
    }

    #[test]
    fn missing_field_reports_line_number() {
        let (_temp, path) = write_manifest(
            "Old_Gitlab_URL\tGithub_URL\n\
             https://gitlab.com/g/a\thttps://github.com/o/a\n\
             \n\
             https://gitlab.com/g/b\t\n",
        );

        let result = get_project_list(&path);

        match result {
            Err(ManifestError::MissingField { line, column, .. }) => {
                assert_eq!(line, 4);
                assert_eq!(column, "Github_URL");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn missing_header_column_fails() {
        let (_temp, path) = write_manifest("Old_Gitlab_URL\nhttps://gitlab.com/g/a\n");

        let result = get_project_list(&path);
        assert!(matches!(result, Err(ManifestError::MissingColumn { .. })));
    }

    #[test]
    fn header_only_manifest_is_empty() {
        let (_temp, path) = write_manifest("Old_Gitlab_URL\tGithub_URL\n\n");

        let result = get_project_list(&path);
        assert!(matches!(result, Err(ManifestError::Empty { .. })));
    }

    #[test]
    fn rejects_malformed_url() {
        let (_temp, path) = write_manifest(
            "Old_Gitlab_URL\tGithub_URL\n\
             not a url\thttps://github.com/o/a\n",
        );

        let result = get_project_list(&path);
        assert!(matches!(
            result,
            Err(ManifestError::InvalidUrl { line: 2, .. })
        ));
    }

    #[test]
    fn quoted_cells_are_unquoted() {
        let (_temp, path) = write_manifest(
            "\"Old_Gitlab_URL\"\t\"Github_URL\"\t\"New_Repo_Name\"\r\n\
             \"https://gitlab.com/g/a.git\"\t\"https://github.com/o/a.git\"\t\"a-new\"\r\n",
        );

        let projects = get_project_list(&path).unwrap();

        assert_eq!(projects[0].old_source_url, "https://gitlab.com/g/a.git");
        assert_eq!(projects[0].new_destination_url, "https://github.com/o/a.git");
        assert_eq!(projects[0].new_name.as_deref(), Some("a-new"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let result = get_project_list(&temp.path().join("absent.txt"));
        assert!(matches!(result, Err(ManifestError::IoError { .. })));
    }
}
