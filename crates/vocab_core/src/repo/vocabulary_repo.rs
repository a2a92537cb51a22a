//! Vocabulary repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Register vocabularies in `vocabularies` and own their word tables.
//! - Allocate a unique table identifier for every new vocabulary.
//!
//! # Invariants
//! - Metadata row and word table are created/dropped in one transaction.
//! - `table_name` is unique case-insensitively and never collides with any
//!   other SQLite object.
//! - Listing order is creation order (`id ASC`).

use super::{
    ensure_metadata_table, parse_table_name, RepoError, RepoResult, METADATA_TABLE,
};
use crate::db::migrations::WORD_TABLE_TEMPLATE;
use crate::model::vocabulary::{normalize_vocabulary_name, TableName, Vocabulary, VocabularyId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const VOCABULARY_SELECT_SQL: &str = "SELECT id, name, table_name FROM vocabularies";
/// Upper bound on `_N` suffixes tried before giving up.
const MAX_TABLE_NAME_SUFFIX: u32 = 999;

/// Repository interface for vocabulary metadata and word-table lifecycle.
pub trait VocabularyRepository {
    /// Registers a vocabulary and creates its empty word table.
    fn create_vocabulary(&self, name: &str) -> RepoResult<Vocabulary>;
    /// Changes the display name; the table identifier is kept.
    fn rename_vocabulary(&self, id: VocabularyId, new_name: &str) -> RepoResult<()>;
    /// Drops the word table and unregisters the vocabulary.
    fn delete_vocabulary(&self, table: &TableName) -> RepoResult<()>;
    fn get_vocabulary(&self, id: VocabularyId) -> RepoResult<Option<Vocabulary>>;
    fn find_by_table(&self, table: &TableName) -> RepoResult<Option<Vocabulary>>;
    /// Lists all vocabularies in creation order.
    fn list_vocabularies(&self) -> RepoResult<Vec<Vocabulary>>;
}

/// SQLite-backed vocabulary repository.
pub struct SqliteVocabularyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVocabularyRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_metadata_table(conn)?;
        Ok(Self { conn })
    }
}

impl VocabularyRepository for SqliteVocabularyRepository<'_> {
    fn create_vocabulary(&self, name: &str) -> RepoResult<Vocabulary> {
        let tx = self.conn.unchecked_transaction()?;
        let vocabulary = insert_vocabulary(&tx, name)?;
        tx.commit()?;
        Ok(vocabulary)
    }

    fn rename_vocabulary(&self, id: VocabularyId, new_name: &str) -> RepoResult<()> {
        let new_name = normalize_vocabulary_name(new_name)?;
        let changed = self.conn.execute(
            "UPDATE vocabularies
             SET
                name = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, new_name.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::VocabularyNotFound(id));
        }
        Ok(())
    }

    fn delete_vocabulary(&self, table: &TableName) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM vocabularies WHERE table_name = ?1;",
            [table.as_str()],
        )?;
        if removed == 0 {
            return Err(RepoError::VocabularyTableNotFound(table.clone()));
        }
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", table.quoted()))?;
        tx.commit()?;
        Ok(())
    }

    fn get_vocabulary(&self, id: VocabularyId) -> RepoResult<Option<Vocabulary>> {
        let vocabulary = self
            .conn
            .query_row(
                &format!("{VOCABULARY_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_vocabulary_row,
            )
            .optional()?;
        vocabulary.map(finish_vocabulary).transpose()
    }

    fn find_by_table(&self, table: &TableName) -> RepoResult<Option<Vocabulary>> {
        let vocabulary = self
            .conn
            .query_row(
                &format!("{VOCABULARY_SELECT_SQL} WHERE table_name = ?1;"),
                [table.as_str()],
                read_vocabulary_row,
            )
            .optional()?;
        vocabulary.map(finish_vocabulary).transpose()
    }

    fn list_vocabularies(&self) -> RepoResult<Vec<Vocabulary>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VOCABULARY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut vocabularies = Vec::new();
        while let Some(row) = rows.next()? {
            vocabularies.push(finish_vocabulary(read_vocabulary_row(row)?)?);
        }
        Ok(vocabularies)
    }
}

type RawVocabularyRow = (VocabularyId, String, String);

fn read_vocabulary_row(row: &Row<'_>) -> rusqlite::Result<RawVocabularyRow> {
    Ok((row.get("id")?, row.get("name")?, row.get("table_name")?))
}

fn finish_vocabulary((id, name, table_name): RawVocabularyRow) -> RepoResult<Vocabulary> {
    Ok(Vocabulary {
        id,
        name,
        table: parse_table_name(table_name)?,
    })
}

/// Registers a vocabulary and creates its word table on `conn` without opening
/// a transaction; callers own the transaction boundary.
pub(crate) fn insert_vocabulary(conn: &Connection, name: &str) -> RepoResult<Vocabulary> {
    let name = normalize_vocabulary_name(name)?;
    let table = allocate_table_name(conn, &TableName::derive(&name))?;
    conn.execute(
        "INSERT INTO vocabularies (name, table_name) VALUES (?1, ?2);",
        params![name.as_str(), table.as_str()],
    )?;
    let id = conn.last_insert_rowid();
    conn.execute_batch(&WORD_TABLE_TEMPLATE.replace("{table}", &table.quoted()))?;
    Ok(Vocabulary { id, name, table })
}

/// Picks `base`, or the first free `base_N`, as the identifier for a new table.
fn allocate_table_name(conn: &Connection, base: &TableName) -> RepoResult<TableName> {
    if !table_name_taken(conn, base)? {
        return Ok(base.clone());
    }
    for n in 2..=MAX_TABLE_NAME_SUFFIX {
        let candidate = base.with_suffix(n);
        if !table_name_taken(conn, &candidate)? {
            return Ok(candidate);
        }
    }
    Err(RepoError::TableNameExhausted(base.clone()))
}

fn table_name_taken(conn: &Connection, candidate: &TableName) -> RepoResult<bool> {
    let taken: i64 = conn.query_row(
        "SELECT
            EXISTS(SELECT 1 FROM vocabularies WHERE table_name = ?1)
            OR EXISTS(SELECT 1 FROM sqlite_master WHERE name = ?1 COLLATE NOCASE)
            OR ?1 = ?2 COLLATE NOCASE;",
        params![candidate.as_str(), METADATA_TABLE],
        |row| row.get(0),
    )?;
    Ok(taken == 1)
}

#[cfg(test)]
mod tests {
    use super::{SqliteVocabularyRepository, VocabularyRepository};
    use crate::db::open_db_in_memory;
    use crate::model::vocabulary::TableName;
    use crate::repo::RepoError;

    #[test]
    fn colliding_names_get_numbered_tables() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteVocabularyRepository::try_new(&conn).unwrap();

        let first = repo.create_vocabulary("Spanish").unwrap();
        let second = repo.create_vocabulary("spanish!").unwrap();
        let third = repo.create_vocabulary("Spanish").unwrap();

        assert_eq!(first.table.as_str(), "Spanish");
        assert_eq!(second.table.as_str(), "spanish_2");
        assert_eq!(third.table.as_str(), "Spanish_3");
    }

    #[test]
    fn metadata_table_name_is_never_reused() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteVocabularyRepository::try_new(&conn).unwrap();

        let created = repo.create_vocabulary("Vocabularies").unwrap();
        assert_eq!(created.table.as_str(), "Vocabularies_2");
    }

    #[test]
    fn delete_unknown_table_reports_not_found() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteVocabularyRepository::try_new(&conn).unwrap();

        let table = TableName::parse("Ghost").unwrap();
        let err = repo.delete_vocabulary(&table).unwrap_err();
        assert!(matches!(err, RepoError::VocabularyTableNotFound(t) if t == table));
    }
}
