//! CSV reports written by the inventory commands.
//!
//! Inventory reports have a fixed leading set of columns per platform plus
//! optional `Languages` and `Team Name`/`Owner` columns. Team assignments are
//! maintained by hand in the report itself, so a re-run carries them over
//! from the previous file at the same path.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use domain::{LastCommit, ProjectName, RepositoryName};

pub const PROJECT_NAME_COLUMN: &str = "Project Name";
pub const REPOSITORY_NAME_COLUMN: &str = "Repository Name";
pub const LAST_COMMIT_COLUMN: &str = "Last Commit Date";
pub const LANGUAGES_COLUMN: &str = "Languages";
pub const TEAM_NAME_COLUMN: &str = "Team Name";
pub const OWNER_COLUMN: &str = "Owner";
pub const PIPELINE_FILE_COLUMN: &str = "Pipeline File";

/// Placeholder for unknown team and owner values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a repository whose size was not reported.
pub const UNKNOWN_SIZE: &str = "Unknown";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read existing report '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write report '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// ---------------------------------------------------------------------------
// Team carry-over
// ---------------------------------------------------------------------------

/// Team and owner recorded for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAssignment {
    pub team: String,
    pub owner: String,
}

impl Default for TeamAssignment {
    fn default() -> Self {
        Self {
            team: NOT_AVAILABLE.to_string(),
            owner: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Reads the team assignments of a previous report at `path`, keyed by
/// repository name.
///
/// A missing file, or one without the team columns, yields an empty map.
pub fn read_team_assignments(path: &Path) -> Result<HashMap<String, TeamAssignment>, ReportError> {
    if !path.exists() {
        debug!(path = %path.display(), "No previous report, team assignments start empty");
        return Ok(HashMap::new());
    }
    let read_error = |source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(read_error)?;
    let headers = reader.headers().map_err(read_error)?.clone();
    let index = |name: &str| headers.iter().position(|h| h == name);
    let (Some(repo), Some(team), Some(owner)) = (
        index(REPOSITORY_NAME_COLUMN),
        index(TEAM_NAME_COLUMN),
        index(OWNER_COLUMN),
    ) else {
        debug!(path = %path.display(), "Previous report has no team columns");
        return Ok(HashMap::new());
    };

    let cell = |record: &csv::StringRecord, i: usize| {
        record
            .get(i)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };

    let mut assignments = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        let Some(name) = record.get(repo).map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        assignments.insert(
            name.to_string(),
            TeamAssignment {
                team: cell(&record, team),
                owner: cell(&record, owner),
            },
        );
    }
    info!(path = %path.display(), count = assignments.len(), "Loaded team assignments");
    Ok(assignments)
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Which service an inventory describes; decides the leading columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Repository, size in KB, last commit.
    GitHub,
    /// Project, repository, size in bytes, last commit.
    AzureDevOps,
}

/// Optional inventory columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportColumns {
    pub languages: bool,
    pub teams: bool,
}

/// One repository of an inventory report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    /// Set for Azure DevOps rows only.
    pub project: Option<ProjectName>,
    pub repository: RepositoryName,
    pub size: Option<u64>,
    pub last_commit: LastCommit,
    pub languages: BTreeSet<&'static str>,
    pub team: TeamAssignment,
}

/// Column headers for an inventory of `platform`.
pub fn inventory_header(platform: Platform, columns: ReportColumns) -> Vec<&'static str> {
    let mut header = match platform {
        Platform::GitHub => vec![REPOSITORY_NAME_COLUMN, "Size in KB", LAST_COMMIT_COLUMN],
        Platform::AzureDevOps => vec![
            PROJECT_NAME_COLUMN,
            REPOSITORY_NAME_COLUMN,
            "Size in Bytes",
            LAST_COMMIT_COLUMN,
        ],
    };
    if columns.languages {
        header.push(LANGUAGES_COLUMN);
    }
    if columns.teams {
        header.extend([TEAM_NAME_COLUMN, OWNER_COLUMN]);
    }
    header
}

fn inventory_record(row: &InventoryRow, platform: Platform, columns: ReportColumns) -> Vec<String> {
    let mut record = Vec::with_capacity(7);
    if platform == Platform::AzureDevOps {
        record.push(row.project.as_ref().map(ToString::to_string).unwrap_or_default());
    }
    record.push(row.repository.to_string());
    record.push(row.size.map_or_else(|| UNKNOWN_SIZE.to_string(), |size| size.to_string()));
    record.push(row.last_commit.to_string());
    if columns.languages {
        record.push(row.languages.iter().copied().collect::<Vec<_>>().join(", "));
    }
    if columns.teams {
        record.push(row.team.team.clone());
        record.push(row.team.owner.clone());
    }
    record
}

/// Writes an inventory report to `path`, replacing any existing file.
pub fn write_inventory(
    path: &Path,
    platform: Platform,
    columns: ReportColumns,
    rows: &[InventoryRow],
) -> Result<(), ReportError> {
    write_csv(
        path,
        &inventory_header(platform, columns),
        rows.iter().map(|row| inventory_record(row, platform, columns)),
    )
}

// ---------------------------------------------------------------------------
// Pipeline files
// ---------------------------------------------------------------------------

/// One YAML pipeline file found in an Azure DevOps repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFileRow {
    pub project: ProjectName,
    pub repository: RepositoryName,
    pub path: String,
}

/// Writes the pipeline file listing to `path`.
pub fn write_pipeline_files(path: &Path, rows: &[PipelineFileRow]) -> Result<(), ReportError> {
    write_csv(
        path,
        &[PROJECT_NAME_COLUMN, REPOSITORY_NAME_COLUMN, PIPELINE_FILE_COLUMN],
        rows.iter()
            .map(|row| vec![row.project.to_string(), row.repository.to_string(), row.path.clone()]),
    )
}

fn write_csv<I>(path: &Path, header: &[&str], records: I) -> Result<(), ReportError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let write_error = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(write_error)?;
    writer.write_record(header).map_err(write_error)?;
    let mut count = 0usize;
    for record in records {
        writer.write_record(&record).map_err(write_error)?;
        count += 1;
    }
    writer.flush().map_err(|e| write_error(e.into()))?;
    info!(path = %path.display(), rows = count, "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, size: Option<u64>, last_commit: LastCommit) -> InventoryRow {
        InventoryRow {
            project: None,
            repository: RepositoryName::new(name).unwrap(),
            size,
            last_commit,
            languages: BTreeSet::new(),
            team: TeamAssignment::default(),
        }
    }

    #[test]
    fn header_grows_with_optional_columns() {
        let all = ReportColumns {
            languages: true,
            teams: true,
        };
        assert_eq!(
            inventory_header(Platform::GitHub, all),
            [
                "Repository Name",
                "Size in KB",
                "Last Commit Date",
                "Languages",
                "Team Name",
                "Owner"
            ]
        );
        assert_eq!(
            inventory_header(Platform::AzureDevOps, ReportColumns::default()),
            ["Project Name", "Repository Name", "Size in Bytes", "Last Commit Date"]
        );
    }

    #[test]
    fn records_use_placeholders_for_unknown_values() {
        let columns = ReportColumns {
            languages: true,
            teams: true,
        };
        let mut empty = row("empty", None, LastCommit::NoCommits);
        empty.languages = BTreeSet::from(["Rust", "Go"]);

        assert_eq!(
            inventory_record(&empty, Platform::GitHub, columns),
            ["empty", "Unknown", "No commits", "Go, Rust", "N/A", "N/A"]
        );
    }

    #[test]
    fn azure_devops_records_lead_with_the_project() {
        let mut ado = row("ledger", Some(1024), LastCommit::Unavailable);
        ado.project = ProjectName::new("Payments");
        assert_eq!(
            inventory_record(&ado, Platform::AzureDevOps, ReportColumns::default()),
            ["Payments", "ledger", "1024", "Failed to fetch commits"]
        );
    }

    #[test]
    fn team_assignments_survive_a_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_repos.csv");
        let columns = ReportColumns {
            languages: false,
            teams: true,
        };
        let mut assigned = row("alpha", Some(10), LastCommit::Date("2024-01-01T00:00:00Z".into()));
        assigned.team = TeamAssignment {
            team: "Payments".into(),
            owner: "jdoe".into(),
        };
        let unassigned = row("beta", Some(20), LastCommit::NoCommits);
        write_inventory(&path, Platform::GitHub, columns, &[assigned, unassigned]).unwrap();

        let assignments = read_team_assignments(&path).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments["alpha"].team, "Payments");
        assert_eq!(assignments["alpha"].owner, "jdoe");
        assert_eq!(assignments["beta"], TeamAssignment::default());
    }

    #[test]
    fn missing_report_has_no_assignments() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_team_assignments(&dir.path().join("absent.csv")).unwrap().is_empty());
    }

    #[test]
    fn report_without_team_columns_has_no_assignments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_inventory(&path, Platform::GitHub, ReportColumns::default(), &[row("alpha", None, LastCommit::NoCommits)])
            .unwrap();
        assert!(read_team_assignments(&path).unwrap().is_empty());
    }

    #[test]
    fn pipeline_listing_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipelines.csv");
        let rows = [PipelineFileRow {
            project: ProjectName::new("Payments").unwrap(),
            repository: RepositoryName::new("ledger").unwrap(),
            path: "/azure-pipelines.yml".into(),
        }];
        write_pipeline_files(&path, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "Project Name,Repository Name,Pipeline File\nPayments,ledger,/azure-pipelines.yml\n"
        );
    }
}
