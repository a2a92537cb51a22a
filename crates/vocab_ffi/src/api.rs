//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose vocabulary, word, export and settings use-cases to Dart via FRB.
//! - Own the process-wide pending-delete queue behind swipe-to-delete.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported inside response envelopes (`ok=false`, `message`).
//! - Entries waiting in the undo window are hidden from list responses.

use log::{debug, warn};
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use vocab_core::db::open_db;
use vocab_core::{
    bootstrap, core_version as core_version_inner, init_logging as init_logging_inner,
    AppConfig, CommitOutcome, DeleteTicket, DeletionScheduler, ExportService, FontSize, LogLevel,
    PreferencesStore, SqliteVocabularyRepository, SqliteWordRepository, TableName, Vocabulary,
    VocabularyService, Word, WordId, WordService,
};

static RUNTIME_CONFIG: OnceLock<AppConfig> = OnceLock::new();
static PENDING_DELETES: Lazy<Mutex<DeletionScheduler<PendingDelete>>> =
    Lazy::new(|| Mutex::new(DeletionScheduler::new(runtime_config().undo_window)));

/// Entry removed from view but not yet from storage.
#[derive(Debug, Clone)]
enum PendingDelete {
    Vocabulary(Vocabulary),
    Word { table: TableName, word: Word },
}

impl PendingDelete {
    fn label(&self) -> &str {
        match self {
            Self::Vocabulary(vocabulary) => &vocabulary.name,
            Self::Word { word, .. } => &word.headword,
        }
    }

    fn vocabulary_table(&self) -> Option<TableName> {
        match self {
            Self::Vocabulary(vocabulary) => Some(vocabulary.table.clone()),
            Self::Word { .. } => None,
        }
    }

    /// Whether both entries delete the same stored row.
    fn same_target(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Vocabulary(left), Self::Vocabulary(right)) => left.table == right.table,
            (
                Self::Word { table, word },
                Self::Word {
                    table: other_table,
                    word: other_word,
                },
            ) => table == other_table && word.id == other_word.id,
            _ => false,
        }
    }
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match LogLevel::parse(&level) {
        Ok(level) => level,
        Err(err) => return err.to_string(),
    };
    match init_logging_inner(level, &PathBuf::from(log_dir.trim())) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Vocabulary row for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyItem {
    pub id: i64,
    pub name: String,
    /// Backing table identifier; passed back to word calls.
    pub table: String,
}

/// Word row for the vocabulary screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordItem {
    pub id: i64,
    pub headword: String,
    /// Decoded meanings; empty when none were recorded.
    pub meanings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapResponse {
    pub ok: bool,
    /// Whether this call performed first-run setup.
    pub first_run: bool,
    pub font_size_points: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyListResponse {
    pub ok: bool,
    pub items: Vec<VocabularyItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyActionResponse {
    pub ok: bool,
    pub vocabulary: Option<VocabularyItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordListResponse {
    pub ok: bool,
    pub items: Vec<WordItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordActionResponse {
    pub ok: bool,
    pub word: Option<WordItem>,
    pub message: String,
}

/// Swipe-to-delete response; `ticket` feeds the undo action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResponse {
    pub ok: bool,
    pub ticket: Option<String>,
    /// Undo window length for the notification timer.
    pub undo_window_ms: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoResponse {
    pub ok: bool,
    /// List position the restored entry should be reinserted at.
    pub position: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResponse {
    pub committed: u32,
    pub failed: u32,
    /// Entries still inside their undo window.
    pub pending: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    /// Written file, for handing to a share sheet.
    pub path: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSizeResponse {
    pub ok: bool,
    pub level: u32,
    pub points: u32,
    pub message: String,
}

/// Runs first-run setup (seed data, default preferences) when needed.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Idempotent; later calls report `first_run=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn app_bootstrap() -> BootstrapResponse {
    let config = runtime_config();
    let store = PreferencesStore::new(&config.preferences_path);
    let result = with_connection(|conn| {
        bootstrap(conn, &store, config.seed_on_first_run).map_err(|err| err.to_string())
    });
    match result {
        Ok(report) => BootstrapResponse {
            ok: true,
            first_run: report.first_run,
            font_size_points: u32::from(report.preferences.font_size.points()),
            message: if report.first_run {
                format!("Created {} vocabularies.", report.seeded_vocabularies)
            } else {
                "Ready.".to_string()
            },
        },
        Err(err) => BootstrapResponse {
            ok: false,
            first_run: false,
            font_size_points: u32::from(FontSize::default().points()),
            message: format!("app_bootstrap failed: {err}"),
        },
    }
}

/// Lists vocabularies in creation order, hiding swiped entries.
#[flutter_rust_bridge::frb(sync)]
pub fn vocabulary_list() -> VocabularyListResponse {
    let result = with_vocabulary_service(|service| {
        service.list_vocabularies().map_err(|err| err.to_string())
    });
    match result {
        Ok(vocabularies) => {
            let hidden = pending_vocabulary_tables();
            let items: Vec<VocabularyItem> = vocabularies
                .into_iter()
                .filter(|vocabulary| !hidden.contains(&vocabulary.table))
                .map(to_vocabulary_item)
                .collect();
            VocabularyListResponse {
                ok: true,
                message: format!("{} vocabularies.", items.len()),
                items,
            }
        }
        Err(err) => VocabularyListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("vocabulary_list failed: {err}"),
        },
    }
}

/// Creates a vocabulary; a blank name is rejected before storage.
#[flutter_rust_bridge::frb(sync)]
pub fn vocabulary_create(name: String) -> VocabularyActionResponse {
    let result = with_vocabulary_service(|service| {
        service.create_vocabulary(&name).map_err(|err| err.to_string())
    });
    vocabulary_action(result, "Vocabulary created.", "vocabulary_create")
}

#[flutter_rust_bridge::frb(sync)]
pub fn vocabulary_rename(id: i64, new_name: String) -> VocabularyActionResponse {
    let result = with_vocabulary_service(|service| {
        service
            .rename_vocabulary(id, &new_name)
            .map_err(|err| err.to_string())
    });
    vocabulary_action(result, "Vocabulary renamed.", "vocabulary_rename")
}

/// Hides a vocabulary and schedules its deletion after the undo window.
///
/// `position` is the row index on screen, returned again by `undo_delete`.
#[flutter_rust_bridge::frb(sync)]
pub fn vocabulary_swipe_delete(id: i64, position: u32) -> DeleteResponse {
    let result = with_vocabulary_service(|service| {
        service
            .require_vocabulary(id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(vocabulary) => schedule_delete(PendingDelete::Vocabulary(vocabulary), position),
        Err(err) => delete_failure(format!("vocabulary_swipe_delete failed: {err}")),
    }
}

/// Lists words of one vocabulary by headword, hiding swiped entries.
#[flutter_rust_bridge::frb(sync)]
pub fn word_list(table: String) -> WordListResponse {
    let result = parse_table(&table).and_then(|table| {
        with_word_service(|service| {
            service
                .list_words(&table)
                .map(|words| (table.clone(), words))
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok((table, words)) => {
            let hidden = pending_word_ids(&table);
            let items: Vec<WordItem> = words
                .into_iter()
                .filter(|word| !hidden.contains(&word.id))
                .map(to_word_item)
                .collect();
            WordListResponse {
                ok: true,
                message: format!("{} words.", items.len()),
                items,
            }
        }
        Err(err) => WordListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("word_list failed: {err}"),
        },
    }
}

/// Adds a word; `meanings` is the raw comma-separated text field.
#[flutter_rust_bridge::frb(sync)]
pub fn word_add(table: String, headword: String, meanings: String) -> WordActionResponse {
    let result = parse_table(&table).and_then(|table| {
        with_word_service(|service| {
            service
                .add_word(&table, &headword, &meanings)
                .map_err(|err| err.to_string())
        })
    });
    word_action(result, "Word added.", "word_add")
}

#[flutter_rust_bridge::frb(sync)]
pub fn word_update(
    table: String,
    id: i64,
    headword: String,
    meanings: String,
) -> WordActionResponse {
    let result = parse_table(&table).and_then(|table| {
        with_word_service(|service| {
            service
                .update_word(&table, id, &headword, &meanings)
                .map_err(|err| err.to_string())
        })
    });
    word_action(result, "Word updated.", "word_update")
}

/// Hides a word and schedules its deletion after the undo window.
#[flutter_rust_bridge::frb(sync)]
pub fn word_swipe_delete(table: String, id: i64, position: u32) -> DeleteResponse {
    let result = parse_table(&table).and_then(|table| {
        with_word_service(|service| match service.get_word(&table, id) {
            Ok(Some(word)) => Ok(PendingDelete::Word {
                table: table.clone(),
                word,
            }),
            Ok(None) => Err(format!("word {id} not found in `{table}`")),
            Err(err) => Err(err.to_string()),
        })
    });
    match result {
        Ok(pending) => schedule_delete(pending, position),
        Err(err) => delete_failure(format!("word_swipe_delete failed: {err}")),
    }
}

/// Cancels a pending deletion while its undo window is open.
#[flutter_rust_bridge::frb(sync)]
pub fn undo_delete(ticket: String) -> UndoResponse {
    let Some(ticket) = DeleteTicket::parse(&ticket) else {
        return UndoResponse {
            ok: false,
            position: None,
            message: "undo_delete failed: malformed ticket".to_string(),
        };
    };
    match pending_deletes().undo(ticket) {
        Ok(restored) => UndoResponse {
            ok: true,
            position: Some(u32::try_from(restored.position).unwrap_or(u32::MAX)),
            message: format!("{} was restored.", restored.item.label()),
        },
        Err(err) => UndoResponse {
            ok: false,
            position: None,
            message: format!("undo_delete failed: {err}"),
        },
    }
}

/// Commits every deletion whose undo window elapsed.
///
/// # FFI contract
/// - Call from the host timer armed with `undo_window_ms`.
/// - Each pending entry is deleted from storage at most once.
#[flutter_rust_bridge::frb(sync)]
pub fn commit_expired_deletes() -> CommitResponse {
    let mut scheduler = pending_deletes();
    let outcomes = match open_db(&runtime_config().db_path) {
        Ok(conn) => scheduler.commit_expired(|pending| commit_pending(&conn, pending)),
        Err(err) => {
            warn!("event=delete_commit module=ffi status=error error_code=db_open_failed");
            return CommitResponse {
                committed: 0,
                failed: 0,
                pending: count_u32(scheduler.len()),
                message: format!("commit_expired_deletes failed: {err}"),
            };
        }
    };
    commit_response(&outcomes, scheduler.len())
}

/// Exports one vocabulary to `<name>.csv` under the export root.
#[flutter_rust_bridge::frb(sync)]
pub fn export_vocabulary(id: i64) -> ExportResponse {
    let config = runtime_config();
    let result = with_connection(|conn| {
        let vocabularies = SqliteVocabularyRepository::try_new(conn).map_err(|err| err.to_string())?;
        let vocabulary = VocabularyService::new(vocabularies)
            .require_vocabulary(id)
            .map_err(|err| err.to_string())?;
        let words = SqliteWordRepository::try_new(conn).map_err(|err| err.to_string())?;
        ExportService::new(words, &config.export_dir)
            .export(&vocabulary)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(export) => ExportResponse {
            ok: true,
            path: Some(export.path.display().to_string()),
            message: "File has been saved.".to_string(),
        },
        Err(_) => ExportResponse {
            ok: false,
            path: None,
            message: "File wasn't saved.".to_string(),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn font_size_get() -> FontSizeResponse {
    font_size_response(preferences_store().font_size(), "font_size_get")
}

/// Stores the font level (1-5); out-of-range levels store the default.
#[flutter_rust_bridge::frb(sync)]
pub fn font_size_set(level: u32) -> FontSizeResponse {
    let level = u8::try_from(level).unwrap_or(0);
    font_size_response(preferences_store().set_font_size(level), "font_size_set")
}

/// Resets settings to defaults (font level 3).
#[flutter_rust_bridge::frb(sync)]
pub fn preferences_restore_defaults() -> FontSizeResponse {
    let result = preferences_store()
        .restore_defaults()
        .map(|preferences| preferences.font_size);
    font_size_response(result, "preferences_restore_defaults")
}

fn runtime_config() -> &'static AppConfig {
    RUNTIME_CONFIG.get_or_init(AppConfig::from_env)
}

fn preferences_store() -> PreferencesStore {
    PreferencesStore::new(&runtime_config().preferences_path)
}

fn pending_deletes() -> MutexGuard<'static, DeletionScheduler<PendingDelete>> {
    PENDING_DELETES
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn with_connection<T>(f: impl FnOnce(&Connection) -> Result<T, String>) -> Result<T, String> {
    let conn =
        open_db(&runtime_config().db_path).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn)
}

fn with_vocabulary_service<T>(
    f: impl FnOnce(&VocabularyService<SqliteVocabularyRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteVocabularyRepository::try_new(conn)
            .map_err(|err| format!("vocabulary repo init failed: {err}"))?;
        f(&VocabularyService::new(repo))
    })
}

fn with_word_service<T>(
    f: impl FnOnce(&WordService<SqliteWordRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteWordRepository::try_new(conn)
            .map_err(|err| format!("word repo init failed: {err}"))?;
        f(&WordService::new(repo))
    })
}

fn parse_table(raw: &str) -> Result<TableName, String> {
    TableName::parse(raw.trim()).map_err(|err| err.to_string())
}

/// Queues `pending`; a repeated swipe on an entry that is already queued gets
/// the existing ticket back so one undo always cancels the deletion.
fn schedule_delete(pending: PendingDelete, position: u32) -> DeleteResponse {
    let message = format!("{} was removed.", pending.label());
    let mut scheduler = pending_deletes();
    let existing = scheduler.find_pending(|queued| queued.same_target(&pending));
    let ticket = match existing {
        Some(existing) => {
            debug!("event=delete_schedule module=ffi status=skipped reason=already_pending");
            existing
        }
        None => scheduler.schedule(pending, position as usize),
    };
    DeleteResponse {
        ok: true,
        ticket: Some(ticket.to_string()),
        undo_window_ms: window_ms(scheduler.window()),
        message,
    }
}

fn delete_failure(message: String) -> DeleteResponse {
    DeleteResponse {
        ok: false,
        ticket: None,
        undo_window_ms: 0,
        message,
    }
}

/// Deletes one expired entry. A word whose vocabulary is already gone counts
/// as deleted.
fn commit_pending(conn: &Connection, pending: &PendingDelete) -> Result<(), String> {
    let vocabularies = SqliteVocabularyRepository::try_new(conn)
        .map(VocabularyService::new)
        .map_err(|err| err.to_string())?;
    match pending {
        PendingDelete::Vocabulary(vocabulary) => vocabularies
            .delete_vocabulary(&vocabulary.table)
            .map_err(|err| err.to_string()),
        PendingDelete::Word { table, word } => {
            let owner = vocabularies
                .find_by_table(table)
                .map_err(|err| err.to_string())?;
            if owner.is_none() {
                debug!("event=delete_commit module=ffi status=skipped reason=vocabulary_deleted");
                return Ok(());
            }
            SqliteWordRepository::try_new(conn)
                .map(WordService::new)
                .map_err(|err| err.to_string())?
                .delete_word(table, word.id)
                .map_err(|err| err.to_string())
        }
    }
}

fn commit_response(outcomes: &[CommitOutcome<PendingDelete, String>], pending: usize) -> CommitResponse {
    let committed = outcomes.iter().filter(|outcome| outcome.is_deleted()).count();
    let failed = outcomes.len() - committed;
    CommitResponse {
        committed: count_u32(committed),
        failed: count_u32(failed),
        pending: count_u32(pending),
        message: if failed == 0 {
            format!("Deleted {committed} item(s).")
        } else {
            format!("Deleted {committed} item(s); {failed} failed.")
        },
    }
}

fn pending_vocabulary_tables() -> Vec<TableName> {
    pending_deletes()
        .pending_items()
        .filter_map(PendingDelete::vocabulary_table)
        .collect()
}

fn pending_word_ids(table: &TableName) -> Vec<WordId> {
    pending_deletes()
        .pending_items()
        .filter_map(|pending| match pending {
            PendingDelete::Word { table: owner, word } if owner == table => Some(word.id),
            _ => None,
        })
        .collect()
}

fn vocabulary_action(
    result: Result<Vocabulary, String>,
    success: &str,
    operation: &str,
) -> VocabularyActionResponse {
    match result {
        Ok(vocabulary) => VocabularyActionResponse {
            ok: true,
            vocabulary: Some(to_vocabulary_item(vocabulary)),
            message: success.to_string(),
        },
        Err(err) => VocabularyActionResponse {
            ok: false,
            vocabulary: None,
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn word_action(result: Result<Word, String>, success: &str, operation: &str) -> WordActionResponse {
    match result {
        Ok(word) => WordActionResponse {
            ok: true,
            word: Some(to_word_item(word)),
            message: success.to_string(),
        },
        Err(err) => WordActionResponse {
            ok: false,
            word: None,
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn font_size_response<E: std::fmt::Display>(
    result: Result<FontSize, E>,
    operation: &str,
) -> FontSizeResponse {
    match result {
        Ok(size) => FontSizeResponse {
            ok: true,
            level: u32::from(size.level()),
            points: u32::from(size.points()),
            message: format!("Font size {}.", size.points()),
        },
        Err(err) => {
            let size = FontSize::default();
            FontSizeResponse {
                ok: false,
                level: u32::from(size.level()),
                points: u32::from(size.points()),
                message: format!("{operation} failed: {err}"),
            }
        }
    }
}

fn to_vocabulary_item(vocabulary: Vocabulary) -> VocabularyItem {
    VocabularyItem {
        id: vocabulary.id,
        name: vocabulary.name,
        table: vocabulary.table.into(),
    }
}

fn to_word_item(word: Word) -> WordItem {
    WordItem {
        meanings: word.meaning_list().unwrap_or_default(),
        id: word.id,
        headword: word.headword,
    }
}

fn window_ms(window: std::time::Duration) -> u64 {
    u64::try_from(window.as_millis()).unwrap_or(u64::MAX)
}

fn count_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
