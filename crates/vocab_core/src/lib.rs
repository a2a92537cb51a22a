//! Core domain logic for the vocabulary manager.
//! This crate is the single source of truth for vocabulary and word invariants.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod preferences;
pub mod repo;
pub mod service;
pub mod undo;

pub use bootstrap::{bootstrap, BootstrapError, BootstrapReport};
pub use config::AppConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::meanings::{decode_meanings, encode_meanings, normalize_meanings_input};
pub use model::vocabulary::{sanitize_table_name, TableName, Vocabulary, VocabularyId};
pub use model::word::{Word, WordDraft, WordId};
pub use model::ValidationError;
pub use preferences::{FontSize, Preferences, PreferencesError, PreferencesStore};
pub use repo::vocabulary_repo::{SqliteVocabularyRepository, VocabularyRepository};
pub use repo::word_repo::{SqliteWordRepository, WordOrder, WordRepository};
pub use repo::{RepoError, RepoResult};
pub use service::export_service::{CsvExport, ExportError, ExportService};
pub use service::vocabulary_service::{VocabularyService, VocabularyServiceError};
pub use service::word_service::{WordService, WordServiceError};
pub use undo::{
    CommitOutcome, DeleteTicket, DeletionScheduler, UndoError, UndoableList, DEFAULT_UNDO_WINDOW,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
