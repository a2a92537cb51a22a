//! First-run setup: sample vocabularies and default preferences.
//!
//! # Responsibility
//! - Seed sample vocabularies once per installation.
//! - Reset preferences to defaults and clear the first-run flag.
//!
//! # Invariants
//! - Runs only while `first_run` is set; later calls change nothing.
//! - Sample data is stored in one transaction: all of it or none.
//! - Seeding is skipped when any vocabulary already exists.
//! - The first-run flag is cleared only after seeding succeeded.

use crate::model::word::WordDraft;
use crate::preferences::{FontSize, Preferences, PreferencesError, PreferencesStore};
use crate::repo::vocabulary_repo::{
    insert_vocabulary, SqliteVocabularyRepository, VocabularyRepository,
};
use crate::repo::word_repo::{SqliteWordRepository, WordRepository};
use crate::repo::RepoError;
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Sample vocabularies in creation order with their `headword,meanings` lines.
const SEED_VOCABULARIES: &[(&str, &str)] = &[
    ("Spanish", include_str!("seed/spanish.csv")),
    ("German", ""),
    ("Russian", include_str!("seed/russian.csv")),
    ("Dutch", ""),
    ("Technical terms", ""),
];

#[derive(Debug)]
pub enum BootstrapError {
    Repo(RepoError),
    Preferences(PreferencesError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "seeding failed: {err}"),
            Self::Preferences(err) => write!(f, "first-run setup failed: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Preferences(err) => Some(err),
        }
    }
}

impl From<RepoError> for BootstrapError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<PreferencesError> for BootstrapError {
    fn from(value: PreferencesError) -> Self {
        Self::Preferences(value)
    }
}

/// What `bootstrap` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Whether this call performed first-run setup.
    pub first_run: bool,
    pub seeded_vocabularies: usize,
    pub seeded_words: usize,
    pub preferences: Preferences,
}

/// Performs first-run setup when the stored flag asks for it.
pub fn bootstrap(
    conn: &Connection,
    store: &PreferencesStore,
    seed: bool,
) -> Result<BootstrapReport, BootstrapError> {
    let mut preferences = store.load()?;
    if !preferences.first_run {
        return Ok(BootstrapReport {
            first_run: false,
            seeded_vocabularies: 0,
            seeded_words: 0,
            preferences,
        });
    }

    let started_at = Instant::now();
    let (seeded_vocabularies, seeded_words) = if seed {
        seed_samples(conn)?
    } else {
        (0, 0)
    };

    preferences.font_size = FontSize::default();
    preferences.first_run = false;
    store.save(&preferences)?;

    info!(
        "event=first_run module=bootstrap status=ok vocabularies={} words={} duration_ms={}",
        seeded_vocabularies,
        seeded_words,
        started_at.elapsed().as_millis()
    );
    Ok(BootstrapReport {
        first_run: true,
        seeded_vocabularies,
        seeded_words,
        preferences,
    })
}

fn seed_samples(conn: &Connection) -> Result<(usize, usize), RepoError> {
    seed_vocabularies(conn, SEED_VOCABULARIES)
}

/// Stores `samples` in one transaction; any failure leaves no sample behind.
fn seed_vocabularies(
    conn: &Connection,
    samples: &[(&str, &str)],
) -> Result<(usize, usize), RepoError> {
    if !SqliteVocabularyRepository::try_new(conn)?
        .list_vocabularies()?
        .is_empty()
    {
        return Ok((0, 0));
    }

    let tx = conn.unchecked_transaction()?;
    let words = SqliteWordRepository::try_new(&tx)?;
    let mut word_count = 0;
    for (name, lines) in samples {
        let vocabulary = insert_vocabulary(&tx, name)?;
        for draft in lines.lines().filter_map(parse_seed_line) {
            words.add_word(&vocabulary.table, &draft)?;
            word_count += 1;
        }
    }
    tx.commit()?;
    Ok((samples.len(), word_count))
}

/// Splits `headword,meanings` at the first comma; blank headwords are skipped.
fn parse_seed_line(line: &str) -> Option<WordDraft> {
    let draft = match line.split_once(',') {
        Some((headword, meanings)) => WordDraft::from_raw(headword, meanings),
        None => WordDraft::headword_only(line),
    };
    draft.validate().ok().map(|()| draft)
}

#[cfg(test)]
mod tests {
    use super::{parse_seed_line, seed_vocabularies, SEED_VOCABULARIES};
    use crate::db::open_db_in_memory;
    use crate::repo::vocabulary_repo::{SqliteVocabularyRepository, VocabularyRepository};

    #[test]
    fn failed_seed_leaves_nothing_and_retry_seeds_everything() {
        let conn = open_db_in_memory().unwrap();
        let broken = [("Spanish", "hola,hello\nadios,bye"), ("German", ""), ("   ", "")];

        assert!(seed_vocabularies(&conn, &broken).is_err());
        let vocabularies = SqliteVocabularyRepository::try_new(&conn).unwrap();
        assert!(vocabularies.list_vocabularies().unwrap().is_empty());

        let (seeded, _) = seed_vocabularies(&conn, SEED_VOCABULARIES).unwrap();
        assert_eq!(seeded, SEED_VOCABULARIES.len());
        assert_eq!(vocabularies.list_vocabularies().unwrap().len(), 5);
    }

    #[test]
    fn seed_line_splits_at_first_comma() {
        let draft = parse_seed_line("ganado,to earn, to do").unwrap();
        assert_eq!(draft.headword, "ganado");
        assert_eq!(draft.meanings, "to earn,to do");
    }

    #[test]
    fn seed_line_without_meanings_keeps_headword() {
        let draft = parse_seed_line("flan").unwrap();
        assert_eq!(draft.headword, "flan");
        assert_eq!(draft.meanings, "");
        assert!(parse_seed_line("  ").is_none());
    }
}
