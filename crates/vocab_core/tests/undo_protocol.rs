use std::time::Duration;
use vocab_core::db::open_db_in_memory;
use vocab_core::undo::ManualClock;
use vocab_core::{
    DeletionScheduler, SqliteVocabularyRepository, SqliteWordRepository, TableName, UndoError,
    UndoableList, Vocabulary, VocabularyRepository, VocabularyService, Word, WordService,
    DEFAULT_UNDO_WINDOW,
};

fn seeded(conn: &rusqlite::Connection) -> TableName {
    let table = SqliteVocabularyRepository::try_new(conn)
        .unwrap()
        .create_vocabulary("Spanish")
        .unwrap()
        .table;
    let words = WordService::new(SqliteWordRepository::try_new(conn).unwrap());
    for (headword, meanings) in [("adios", "bye"), ("hola", "hello"), ("zumo", "juice")] {
        words.add_word(&table, headword, meanings).unwrap();
    }
    table
}

fn word_list(
    words: &WordService<SqliteWordRepository<'_>>,
    table: &TableName,
) -> (ManualClock, UndoableList<Word, ManualClock>) {
    let clock = ManualClock::new();
    let scheduler = DeletionScheduler::with_clock(clock.clone(), DEFAULT_UNDO_WINDOW);
    (
        clock,
        UndoableList::new(words.list_words(table).unwrap(), scheduler),
    )
}

fn headwords(words: &[Word]) -> Vec<&str> {
    words.iter().map(|word| word.headword.as_str()).collect()
}

#[test]
fn undo_inside_window_restores_position_and_storage() {
    let conn = open_db_in_memory().unwrap();
    let table = seeded(&conn);
    let words = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());
    let (clock, mut list) = word_list(&words, &table);
    let original = words.list_words(&table).unwrap();

    let ticket = list.swipe_delete(1).unwrap();
    assert_eq!(headwords(list.items()), vec!["adios", "zumo"]);
    assert_eq!(words.count_words(&table).unwrap(), 3);

    clock.advance(Duration::from_millis(2000));
    assert_eq!(list.undo(ticket).unwrap(), 1);
    clock.advance(Duration::from_secs(10));
    let outcomes = list.commit_expired(|word| words.delete_word(&table, word.id));

    assert!(outcomes.is_empty());
    assert_eq!(list.items(), original.as_slice());
    assert_eq!(words.list_words(&table).unwrap(), original);
}

#[test]
fn elapsed_window_deletes_from_storage_exactly_once() {
    let conn = open_db_in_memory().unwrap();
    let table = seeded(&conn);
    let words = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());
    let (clock, mut list) = word_list(&words, &table);

    let ticket = list.swipe_delete(0).unwrap();
    clock.advance(DEFAULT_UNDO_WINDOW);
    assert_eq!(list.undo(ticket), Err(UndoError::WindowElapsed(ticket)));

    let outcomes = list.commit_expired(|word| words.delete_word(&table, word.id));
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_deleted());
    assert!(list
        .commit_expired(|word| words.delete_word(&table, word.id))
        .is_empty());

    assert_eq!(
        headwords(&words.list_words(&table).unwrap()),
        vec!["hola", "zumo"]
    );
    assert_eq!(headwords(list.items()), vec!["hola", "zumo"]);
}

#[test]
fn failed_commit_is_reported_without_retry() {
    let conn = open_db_in_memory().unwrap();
    let table = seeded(&conn);
    let words = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());
    let (clock, mut list) = word_list(&words, &table);

    list.swipe_delete(0).unwrap();
    words.clear_words(&table).unwrap();
    clock.advance(DEFAULT_UNDO_WINDOW);

    let outcomes = list.commit_expired(|word| words.delete_word(&table, word.id));
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_deleted());
    assert!(list.scheduler().is_empty());
}

#[test]
fn swiped_vocabulary_is_dropped_only_after_window() {
    let conn = open_db_in_memory().unwrap();
    let service = VocabularyService::new(SqliteVocabularyRepository::try_new(&conn).unwrap());
    for name in ["Spanish", "German", "Russian"] {
        service.create_vocabulary(name).unwrap();
    }

    let clock = ManualClock::new();
    let scheduler = DeletionScheduler::with_clock(clock.clone(), DEFAULT_UNDO_WINDOW);
    let mut list: UndoableList<Vocabulary, ManualClock> =
        UndoableList::new(service.list_vocabularies().unwrap(), scheduler);

    list.swipe_delete(1).unwrap();
    clock.advance(Duration::from_millis(1000));
    assert!(list
        .commit_expired(|vocabulary| service.delete_vocabulary(&vocabulary.table))
        .is_empty());
    assert_eq!(service.list_vocabularies().unwrap().len(), 3);

    clock.advance(Duration::from_millis(1750));
    let outcomes = list.commit_expired(|vocabulary| service.delete_vocabulary(&vocabulary.table));
    assert_eq!(outcomes.len(), 1);

    let names: Vec<String> = service
        .list_vocabularies()
        .unwrap()
        .into_iter()
        .map(|vocabulary| vocabulary.name)
        .collect();
    assert_eq!(names, vec!["Spanish", "Russian"]);
}
