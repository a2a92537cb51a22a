//! Word use-case service.
//!
//! # Responsibility
//! - Turn raw UI input (headword + meanings text) into validated drafts.
//! - Provide add/update/delete/list entry points scoped to one vocabulary.
//!
//! # Invariants
//! - Blank headwords never reach the repository.
//! - Stored meanings always go through the meanings codec.

use crate::model::vocabulary::TableName;
use crate::model::word::{Word, WordDraft, WordId};
use crate::model::ValidationError;
use crate::repo::word_repo::{WordOrder, WordRepository};
use crate::repo::RepoError;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for word use-cases.
#[derive(Debug)]
pub enum WordServiceError {
    /// Headword is blank after trim.
    InvalidHeadword,
    WordNotFound {
        table: TableName,
        word_id: WordId,
    },
    VocabularyTableNotFound(TableName),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for WordServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHeadword => write!(f, "word must not be blank"),
            Self::WordNotFound { table, word_id } => {
                write!(f, "word {word_id} not found in `{table}`")
            }
            Self::VocabularyTableNotFound(table) => {
                write!(f, "no vocabulary uses table `{table}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent word state: {details}"),
        }
    }
}

impl Error for WordServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WordServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::WordNotFound { table, word_id } => Self::WordNotFound { table, word_id },
            RepoError::VocabularyTableNotFound(table) => Self::VocabularyTableNotFound(table),
            RepoError::Validation(ValidationError::EmptyHeadword) => Self::InvalidHeadword,
            other => Self::Repo(other),
        }
    }
}

pub type WordServiceResult<T> = Result<T, WordServiceError>;

/// Word service facade over repository implementations.
pub struct WordService<R: WordRepository> {
    repo: R,
}

impl<R: WordRepository> WordService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a word from raw meanings text (`" to run , , to jog "`).
    pub fn add_word(
        &self,
        table: &TableName,
        headword: &str,
        raw_meanings: &str,
    ) -> WordServiceResult<Word> {
        self.add_draft(table, WordDraft::from_raw(headword, raw_meanings))
    }

    /// Adds a word from an already split meaning list.
    pub fn add_word_with_meanings<I, S>(
        &self,
        table: &TableName,
        headword: &str,
        meanings: I,
    ) -> WordServiceResult<Word>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_draft(table, WordDraft::new(headword, meanings))
    }

    /// Replaces headword and meanings of an existing word.
    pub fn update_word(
        &self,
        table: &TableName,
        id: WordId,
        headword: &str,
        raw_meanings: &str,
    ) -> WordServiceResult<Word> {
        let draft = WordDraft::from_raw(headword, raw_meanings);
        check_draft(&draft)?;
        self.repo.update_word(table, id, &draft)?;
        debug!("event=word_update module=service status=ok word_id={id}");
        self.repo
            .get_word(table, id)?
            .ok_or(WordServiceError::InconsistentState(
                "updated word not found in read-back",
            ))
    }

    pub fn delete_word(&self, table: &TableName, id: WordId) -> WordServiceResult<()> {
        self.repo.delete_word(table, id)?;
        debug!("event=word_delete module=service status=ok word_id={id}");
        Ok(())
    }

    pub fn get_word(&self, table: &TableName, id: WordId) -> WordServiceResult<Option<Word>> {
        Ok(self.repo.get_word(table, id)?)
    }

    /// Lists words alphabetically by headword.
    pub fn list_words(&self, table: &TableName) -> WordServiceResult<Vec<Word>> {
        Ok(self.repo.list_words(table, WordOrder::Headword)?)
    }

    pub fn count_words(&self, table: &TableName) -> WordServiceResult<u64> {
        Ok(self.repo.count_words(table)?)
    }

    pub fn clear_words(&self, table: &TableName) -> WordServiceResult<usize> {
        let removed = self.repo.clear_words(table)?;
        info!("event=word_clear module=service status=ok removed={removed}");
        Ok(removed)
    }

    fn add_draft(&self, table: &TableName, draft: WordDraft) -> WordServiceResult<Word> {
        check_draft(&draft)?;
        let id = self.repo.add_word(table, &draft)?;
        debug!("event=word_add module=service status=ok word_id={id}");
        Ok(draft.into_word(id))
    }
}

fn check_draft(draft: &WordDraft) -> WordServiceResult<()> {
    draft
        .validate()
        .map_err(|_| WordServiceError::InvalidHeadword)
}
