//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the persistence contract consumed by services and UI layers.
//! - Keep SQL text and identifier quoting inside the storage boundary.
//!
//! # Invariants
//! - Values are always bound as parameters.
//! - Table identifiers reach SQL only as validated [`TableName`]s, quoted.
//! - Repository APIs return semantic errors (`*NotFound`) in addition to DB
//!   transport errors.

use crate::db::DbError;
use crate::model::vocabulary::{TableName, VocabularyId};
use crate::model::word::WordId;
use crate::model::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod vocabulary_repo;
pub mod word_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for vocabulary and word persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    VocabularyNotFound(VocabularyId),
    /// No registered vocabulary owns this table.
    VocabularyTableNotFound(TableName),
    WordNotFound {
        table: TableName,
        word_id: WordId,
    },
    /// Every suffixed candidate for a new table identifier is taken.
    TableNameExhausted(TableName),
    /// Connection schema is missing a table the repository depends on.
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::VocabularyNotFound(id) => write!(f, "vocabulary not found: {id}"),
            Self::VocabularyTableNotFound(table) => {
                write!(f, "no vocabulary uses table `{table}`")
            }
            Self::WordNotFound { table, word_id } => {
                write!(f, "word {word_id} not found in `{table}`")
            }
            Self::TableNameExhausted(base) => {
                write!(f, "no free table name derived from `{base}`")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "vocabulary repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted vocabulary data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

const METADATA_TABLE: &str = "vocabularies";

fn ensure_metadata_table(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, METADATA_TABLE)? {
        return Err(RepoError::MissingRequiredTable(METADATA_TABLE));
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_table_name(value: String) -> RepoResult<TableName> {
    TableName::parse(value).map_err(|err| RepoError::InvalidData(err.to_string()))
}

/// Fails with `VocabularyTableNotFound` unless `table` belongs to a vocabulary.
fn ensure_registered(conn: &Connection, table: &TableName) -> RepoResult<()> {
    let registered: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM vocabularies
            WHERE table_name = ?1
        );",
        [table.as_str()],
        |row| row.get(0),
    )?;
    if registered != 1 {
        return Err(RepoError::VocabularyTableNotFound(table.clone()));
    }
    Ok(())
}
