//! Vocabulary/word domain model.
//!
//! # Responsibility
//! - Define the records shared by repositories, services and UI layers.
//! - Own input validation that must run before any storage call.
//!
//! # Invariants
//! - Vocabulary names and headwords are never blank once validated.
//! - Meanings are stored only in encoded form.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod meanings;
pub mod vocabulary;
pub mod word;

/// Input-boundary validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Vocabulary name is blank after trim.
    EmptyVocabularyName,
    /// Word headword is blank after trim.
    EmptyHeadword,
    /// Identifier is not usable as a vocabulary table name.
    InvalidTableName(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyVocabularyName => write!(f, "vocabulary name must not be blank"),
            Self::EmptyHeadword => write!(f, "word must not be blank"),
            Self::InvalidTableName(value) => write!(f, "invalid vocabulary table name `{value}`"),
        }
    }
}

impl Error for ValidationError {}
