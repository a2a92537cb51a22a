//! Vocabulary domain model and table-identifier derivation.
//!
//! # Responsibility
//! - Define the vocabulary record exposed to services and UI layers.
//! - Derive the storage-table identifier from a display name.
//! - Guard every identifier that is interpolated into SQL.
//!
//! # Invariants
//! - A `TableName` is 1 to 15 letters, marks, digits or `_` and never starts
//!   with `sqlite_`; it is safe to double-quote into DDL/DML.
//! - Derivation strips exactly the characters validation rejects, so every
//!   derived identifier parses back.
//! - The table identifier is fixed at creation; renames only touch `name`.

use crate::model::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Maximum length (in characters) of a table identifier.
pub const TABLE_NAME_MAX_CHARS: usize = 15;
/// Names longer than the cap are cut to this many characters before cleanup.
const TRUNCATED_NAME_CHARS: usize = 14;
const FALLBACK_TABLE_NAME: &str = "vocabulary";
const RESERVED_PREFIX: &str = "sqlite_";

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{M}\p{N}_]{1,15}$").expect("valid table name regex"));
static DISALLOWED_TABLE_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}_\s]").expect("valid table char regex"));
static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Store-assigned vocabulary identifier.
pub type VocabularyId = i64;

/// Validated SQL table identifier backing one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Validates an existing identifier (for example one read back from storage
    /// or received from a UI layer).
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if !TABLE_NAME_RE.is_match(&value) || has_reserved_prefix(&value) {
            return Err(ValidationError::InvalidTableName(value));
        }
        Ok(Self(value))
    }

    /// Derives the identifier for a new vocabulary called `name`.
    pub fn derive(name: &str) -> Self {
        let sanitized = sanitize_table_name(name);
        let candidate = if sanitized.is_empty() {
            FALLBACK_TABLE_NAME.to_string()
        } else if has_reserved_prefix(&sanitized) {
            take_chars(&format!("v{sanitized}"), TABLE_NAME_MAX_CHARS)
        } else {
            sanitized
        };
        Self::parse(candidate).unwrap_or_else(|_| Self(FALLBACK_TABLE_NAME.to_string()))
    }

    /// Returns a variant carrying `_{n}`, cutting the base so the result stays
    /// within [`TABLE_NAME_MAX_CHARS`].
    pub fn with_suffix(&self, n: u32) -> Self {
        let suffix = format!("_{n}");
        let base_len = TABLE_NAME_MAX_CHARS.saturating_sub(suffix.chars().count());
        Self(format!("{}{}", take_chars(&self.0, base_len), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier wrapped in double quotes for use in SQL text.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TableName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TableName> for String {
    fn from(value: TableName) -> Self {
        value.0
    }
}

/// One vocabulary as stored in the `vocabularies` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub id: VocabularyId,
    /// User-facing display name.
    pub name: String,
    /// Backing word table; immutable after creation.
    pub table: TableName,
}

/// Turns a display name into a table identifier candidate.
///
/// Rules, in order: trim; names longer than 15 characters keep their first 14;
/// drop every character outside letters, combining marks, digits, `_` and
/// whitespace; collapse whitespace runs into one `_`. The result may be empty.
pub fn sanitize_table_name(name: &str) -> String {
    let trimmed = name.trim();
    let cut = if trimmed.chars().count() > TABLE_NAME_MAX_CHARS {
        take_chars(trimmed, TRUNCATED_NAME_CHARS)
    } else {
        trimmed.to_string()
    };

    let kept = DISALLOWED_TABLE_CHAR_RE.replace_all(&cut, "");
    WHITESPACE_RUN_RE
        .replace_all(kept.trim(), "_")
        .into_owned()
}

/// Validates a display name for create/rename and returns it trimmed.
pub fn normalize_vocabulary_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyVocabularyName);
    }
    Ok(trimmed.to_string())
}

fn has_reserved_prefix(value: &str) -> bool {
    value
        .get(..RESERVED_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(RESERVED_PREFIX))
}

fn take_chars(value: &str, count: usize) -> String {
    value.chars().take(count).collect()
}
