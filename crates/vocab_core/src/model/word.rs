//! Word domain model.
//!
//! # Invariants
//! - `headword` is non-empty after trimming for every persisted word.
//! - `meanings` always holds the encoded form produced by
//!   [`crate::model::meanings`]; it is empty when no meaning was recorded.

use crate::model::meanings::{decode_meanings, encode_meanings, normalize_meanings_input};
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-assigned word identifier, unique within one vocabulary table.
pub type WordId = i64;

/// One persisted word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    pub headword: String,
    /// Encoded meanings string (`"to run,to jog"`).
    pub meanings: String,
}

impl Word {
    /// Decoded meaning list, or `None` when the word has no meanings.
    pub fn meaning_list(&self) -> Option<Vec<String>> {
        decode_meanings(&self.meanings)
    }
}

/// Word content before it is stored (add/update payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDraft {
    pub headword: String,
    pub meanings: String,
}

impl WordDraft {
    /// Builds a draft from a headword and an ordered meaning list.
    pub fn new<I, S>(headword: impl Into<String>, meanings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            headword: headword.into().trim().to_string(),
            meanings: encode_meanings(meanings),
        }
    }

    /// Builds a draft from raw meanings text as typed by the user.
    pub fn from_raw(headword: impl Into<String>, raw_meanings: &str) -> Self {
        Self {
            headword: headword.into().trim().to_string(),
            meanings: normalize_meanings_input(raw_meanings),
        }
    }

    /// Draft with no recorded meaning.
    pub fn headword_only(headword: impl Into<String>) -> Self {
        Self::from_raw(headword, "")
    }

    /// Rejects drafts whose headword is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.headword.trim().is_empty() {
            return Err(ValidationError::EmptyHeadword);
        }
        Ok(())
    }

    pub fn into_word(self, id: WordId) -> Word {
        Word {
            id,
            headword: self.headword,
            meanings: self.meanings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Word, WordDraft};
    use crate::model::ValidationError;

    #[test]
    fn from_raw_normalizes_meanings_and_headword() {
        let draft = WordDraft::from_raw(" correr ", " to run , , to jog ");
        assert_eq!(draft.headword, "correr");
        assert_eq!(draft.meanings, "to run,to jog");
    }

    #[test]
    fn new_encodes_meaning_list() {
        let draft = WordDraft::new("ocupado", vec!["busy", " ", "occupied "]);
        assert_eq!(draft.meanings, "busy,occupied");
    }

    #[test]
    fn headword_only_has_empty_meanings() {
        let word = WordDraft::headword_only("flan").into_word(7);
        assert_eq!(word.meanings, "");
        assert_eq!(word.meaning_list(), None);
    }

    #[test]
    fn blank_headword_is_rejected() {
        let draft = WordDraft::from_raw("   ", "anything");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyHeadword));
    }

    #[test]
    fn meaning_list_splits_stored_string() {
        let word = Word {
            id: 1,
            headword: "hablar".to_string(),
            meanings: "to say,to tell,to speak".to_string(),
        };
        assert_eq!(
            word.meaning_list().unwrap(),
            vec!["to say", "to tell", "to speak"]
        );
    }
}
