//! Vocabulary use-case service.
//!
//! # Responsibility
//! - Validate vocabulary names at the input boundary.
//! - Provide create/rename/delete/list entry points for UI layers.
//!
//! # Invariants
//! - Blank names never reach the repository.
//! - Create and rename return the stored record read back from storage.

use crate::model::vocabulary::{normalize_vocabulary_name, TableName, Vocabulary, VocabularyId};
use crate::model::ValidationError;
use crate::repo::vocabulary_repo::VocabularyRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for vocabulary use-cases.
#[derive(Debug)]
pub enum VocabularyServiceError {
    /// Name is blank after trim.
    InvalidName,
    VocabularyNotFound(VocabularyId),
    VocabularyTableNotFound(TableName),
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl Display for VocabularyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "vocabulary name must not be blank"),
            Self::VocabularyNotFound(id) => write!(f, "vocabulary not found: {id}"),
            Self::VocabularyTableNotFound(table) => {
                write!(f, "no vocabulary uses table `{table}`")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent vocabulary state: {details}")
            }
        }
    }
}

impl Error for VocabularyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for VocabularyServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::VocabularyNotFound(id) => Self::VocabularyNotFound(id),
            RepoError::VocabularyTableNotFound(table) => Self::VocabularyTableNotFound(table),
            RepoError::Validation(ValidationError::EmptyVocabularyName) => Self::InvalidName,
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for VocabularyServiceError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::EmptyVocabularyName => Self::InvalidName,
            other => Self::Repo(RepoError::Validation(other)),
        }
    }
}

pub type VocabularyServiceResult<T> = Result<T, VocabularyServiceError>;

/// Vocabulary service facade over repository implementations.
pub struct VocabularyService<R: VocabularyRepository> {
    repo: R,
}

impl<R: VocabularyRepository> VocabularyService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a vocabulary and its word table.
    pub fn create_vocabulary(&self, name: &str) -> VocabularyServiceResult<Vocabulary> {
        let name = normalize_vocabulary_name(name)?;
        let created = self.repo.create_vocabulary(&name)?;
        info!(
            "event=vocabulary_create module=service status=ok vocabulary_id={}",
            created.id
        );
        Ok(created)
    }

    /// Renames a vocabulary; its table identifier does not change.
    pub fn rename_vocabulary(
        &self,
        id: VocabularyId,
        new_name: &str,
    ) -> VocabularyServiceResult<Vocabulary> {
        let new_name = normalize_vocabulary_name(new_name)?;
        self.repo.rename_vocabulary(id, &new_name)?;
        info!(
            "event=vocabulary_rename module=service status=ok vocabulary_id={}",
            id
        );
        self.repo
            .get_vocabulary(id)?
            .ok_or(VocabularyServiceError::InconsistentState(
                "renamed vocabulary not found in read-back",
            ))
    }

    /// Deletes a vocabulary together with all of its words.
    pub fn delete_vocabulary(&self, table: &TableName) -> VocabularyServiceResult<()> {
        self.repo.delete_vocabulary(table)?;
        info!("event=vocabulary_delete module=service status=ok");
        Ok(())
    }

    pub fn get_vocabulary(&self, id: VocabularyId) -> VocabularyServiceResult<Option<Vocabulary>> {
        Ok(self.repo.get_vocabulary(id)?)
    }

    /// Like [`Self::get_vocabulary`] but treats absence as an error.
    pub fn require_vocabulary(&self, id: VocabularyId) -> VocabularyServiceResult<Vocabulary> {
        self.repo
            .get_vocabulary(id)?
            .ok_or(VocabularyServiceError::VocabularyNotFound(id))
    }

    pub fn find_by_table(&self, table: &TableName) -> VocabularyServiceResult<Option<Vocabulary>> {
        Ok(self.repo.find_by_table(table)?)
    }

    /// Lists vocabularies in creation order.
    pub fn list_vocabularies(&self) -> VocabularyServiceResult<Vec<Vocabulary>> {
        Ok(self.repo.list_vocabularies()?)
    }
}
