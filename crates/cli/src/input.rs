//! CSV input files listing the repositories to operate on.

use std::io;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use thiserror::Error;
use tracing::{info, warn};

use domain::{OwnerName, RepositoryName, RepositoryRef, Topic};
use github::parse_topic_list;

pub const REPO_COLUMN: &str = "Repo";
pub const OWNER_COLUMN: &str = "Owner";
pub const TOPICS_COLUMN: &str = "Topics";

/// Problems with a CSV input file. Every message ends with the path.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("The CSV file path was not provided.")]
    NoPath,

    #[error("The CSV file was not found. Path: '{path}'")]
    NotFound { path: PathBuf },

    #[error("The CSV file is empty. Path: '{path}'")]
    Empty { path: PathBuf },

    #[error("The CSV file must contain the following columns: {}. Path: '{path}'", .columns.join(", "))]
    MissingColumns {
        path: PathBuf,
        /// Every required column, not only the missing ones.
        columns: Vec<&'static str>,
    },

    #[error("Error parsing the CSV file: {source}. Path: '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required cell was blank.
    #[error("Row {row} has no value in column '{column}'. Path: '{path}'")]
    MissingValue {
        path: PathBuf,
        /// One-based data row number (the header is row 0).
        row: usize,
        column: &'static str,
    },

    #[error("An unexpected error occurred reading the CSV file: {source}. Path: '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A validated CSV file held in memory.
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    /// Reads `raw_path` (surrounding whitespace ignored) and checks that every
    /// column in `required` is present.
    pub fn read(raw_path: &str, required: &[&'static str]) -> Result<Self, InputError> {
        let trimmed = raw_path.trim();
        if trimmed.is_empty() {
            return Err(InputError::NoPath);
        }
        let path = PathBuf::from(trimmed);
        info!(path = %path.display(), "Reading CSV file");

        let bytes = std::fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => InputError::NotFound { path: path.clone() },
            _ => InputError::Read {
                path: path.clone(),
                source,
            },
        })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(InputError::Empty { path });
        }

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|source| InputError::Parse {
                path: path.clone(),
                source,
            })?
            .clone();
        if !required.iter().all(|column| headers.iter().any(|h| h == *column)) {
            return Err(InputError::MissingColumns {
                path,
                columns: required.to_vec(),
            });
        }

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| InputError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok(Self { path, headers, rows })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn log_summary(&self) {
        if self.is_empty() {
            warn!(path = %self.path().display(), "CSV file has no data rows");
        } else {
            info!(path = %self.path().display(), rows = self.len(), "Read CSV file");
        }
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Values of `column` row by row; `None` for blank cells.
    fn column<'a>(&'a self, column: &str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        let index = self.column_index(column);
        self.rows.iter().map(move |row| {
            index
                .and_then(|i| row.get(i))
                .filter(|value| !value.is_empty())
        })
    }

    fn missing_value(&self, row: usize, column: &'static str) -> InputError {
        InputError::MissingValue {
            path: self.path.clone(),
            row: row + 1,
            column,
        }
    }
}

/// One row of an `add-topics` input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRow {
    pub repository: RepositoryRef,
    /// May be empty; such rows are skipped by the command.
    pub topics: Vec<Topic>,
}

/// Reads an `add-topics` file with columns `Repo`, `Owner`, and `Topics`.
pub fn read_topic_rows(raw_path: &str) -> Result<Vec<TopicRow>, InputError> {
    let table = CsvTable::read(raw_path, &[REPO_COLUMN, OWNER_COLUMN, TOPICS_COLUMN])?;
    table.log_summary();
    let repos = table.column(REPO_COLUMN);
    let owners = table.column(OWNER_COLUMN);
    let topics = table.column(TOPICS_COLUMN);

    repos
        .zip(owners)
        .zip(topics)
        .enumerate()
        .map(|(i, ((repo, owner), topics))| -> Result<TopicRow, InputError> {
            let name = repo
                .and_then(RepositoryName::new)
                .ok_or_else(|| table.missing_value(i, REPO_COLUMN))?;
            let owner = owner
                .and_then(OwnerName::new)
                .ok_or_else(|| table.missing_value(i, OWNER_COLUMN))?;
            Ok(TopicRow {
                repository: RepositoryRef::new(owner, name),
                topics: topics.map(parse_topic_list).unwrap_or_default(),
            })
        })
        .collect()
}

/// Reads the `Repo` column of a file.
pub fn read_repository_names(raw_path: &str) -> Result<Vec<RepositoryName>, InputError> {
    let table = CsvTable::read(raw_path, &[REPO_COLUMN])?;
    table.log_summary();
    table
        .column(REPO_COLUMN)
        .enumerate()
        .map(|(i, repo)| {
            repo.and_then(RepositoryName::new)
                .ok_or_else(|| table.missing_value(i, REPO_COLUMN))
        })
        .collect()
}
