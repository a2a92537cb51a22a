//! Word repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every call first checks that `table` is a registered vocabulary table.
//! - Write paths validate the draft before SQL mutations.
//! - Headword listing order is `word ASC, id ASC`.

use super::{ensure_metadata_table, ensure_registered, RepoError, RepoResult};
use crate::model::vocabulary::TableName;
use crate::model::word::{Word, WordDraft, WordId};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Row order for word listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WordOrder {
    /// Alphabetical by headword (list screens).
    #[default]
    Headword,
    /// Order in which words were added (exports).
    Insertion,
}

impl WordOrder {
    fn sql(self) -> &'static str {
        match self {
            Self::Headword => "word ASC, id ASC",
            Self::Insertion => "id ASC",
        }
    }
}

/// Repository interface for words stored in one vocabulary table.
pub trait WordRepository {
    fn add_word(&self, table: &TableName, word: &WordDraft) -> RepoResult<WordId>;
    fn update_word(&self, table: &TableName, id: WordId, word: &WordDraft) -> RepoResult<()>;
    fn delete_word(&self, table: &TableName, id: WordId) -> RepoResult<()>;
    fn get_word(&self, table: &TableName, id: WordId) -> RepoResult<Option<Word>>;
    fn list_words(&self, table: &TableName, order: WordOrder) -> RepoResult<Vec<Word>>;
    fn count_words(&self, table: &TableName) -> RepoResult<u64>;
    /// Removes every word of the vocabulary, keeping the vocabulary itself.
    fn clear_words(&self, table: &TableName) -> RepoResult<usize>;
}

/// SQLite-backed word repository.
pub struct SqliteWordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWordRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_metadata_table(conn)?;
        Ok(Self { conn })
    }
}

impl WordRepository for SqliteWordRepository<'_> {
    fn add_word(&self, table: &TableName, word: &WordDraft) -> RepoResult<WordId> {
        word.validate()?;
        ensure_registered(self.conn, table)?;

        self.conn.execute(
            &format!(
                "INSERT INTO {} (word, meanings) VALUES (?1, ?2);",
                table.quoted()
            ),
            params![word.headword.as_str(), word.meanings.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_word(&self, table: &TableName, id: WordId, word: &WordDraft) -> RepoResult<()> {
        word.validate()?;
        ensure_registered(self.conn, table)?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET word = ?2, meanings = ?3 WHERE id = ?1;",
                table.quoted()
            ),
            params![id, word.headword.as_str(), word.meanings.as_str()],
        )?;
        if changed == 0 {
            return Err(word_not_found(table, id));
        }
        Ok(())
    }

    fn delete_word(&self, table: &TableName, id: WordId) -> RepoResult<()> {
        ensure_registered(self.conn, table)?;

        let removed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", table.quoted()),
            [id],
        )?;
        if removed == 0 {
            return Err(word_not_found(table, id));
        }
        Ok(())
    }

    fn get_word(&self, table: &TableName, id: WordId) -> RepoResult<Option<Word>> {
        ensure_registered(self.conn, table)?;

        let word = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, word, meanings FROM {} WHERE id = ?1;",
                    table.quoted()
                ),
                [id],
                parse_word_row,
            )
            .optional()?;
        Ok(word)
    }

    fn list_words(&self, table: &TableName, order: WordOrder) -> RepoResult<Vec<Word>> {
        ensure_registered(self.conn, table)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, word, meanings FROM {} ORDER BY {};",
            table.quoted(),
            order.sql()
        ))?;
        let mut rows = stmt.query([])?;
        let mut words = Vec::new();
        while let Some(row) = rows.next()? {
            words.push(parse_word_row(row)?);
        }
        Ok(words)
    }

    fn count_words(&self, table: &TableName) -> RepoResult<u64> {
        ensure_registered(self.conn, table)?;

        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", table.quoted()),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }

    fn clear_words(&self, table: &TableName) -> RepoResult<usize> {
        ensure_registered(self.conn, table)?;

        let removed = self
            .conn
            .execute(&format!("DELETE FROM {};", table.quoted()), [])?;
        Ok(removed)
    }
}

fn parse_word_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get("id")?,
        headword: row.get("word")?,
        meanings: row.get("meanings")?,
    })
}

fn word_not_found(table: &TableName, word_id: WordId) -> RepoError {
    RepoError::WordNotFound {
        table: table.clone(),
        word_id,
    }
}
