use vocab_core::db::open_db_in_memory;
use vocab_core::{
    bootstrap, FontSize, PreferencesStore, SqliteVocabularyRepository, SqliteWordRepository,
    VocabularyRepository, WordRepository,
};

fn store(dir: &tempfile::TempDir) -> PreferencesStore {
    PreferencesStore::new(dir.path().join("preferences.json"))
}

#[test]
fn first_run_seeds_sample_vocabularies_once() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    let report = bootstrap(&conn, &store, true).unwrap();
    assert!(report.first_run);
    assert_eq!(report.seeded_vocabularies, 5);
    assert!(report.seeded_words > 100);
    assert!(!store.load().unwrap().first_run);

    let vocabularies = SqliteVocabularyRepository::try_new(&conn).unwrap();
    let listed = vocabularies.list_vocabularies().unwrap();
    let names: Vec<&str> = listed.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Spanish", "German", "Russian", "Dutch", "Technical terms"]
    );
    assert_eq!(listed[4].table.as_str(), "Technical_terms");

    let words = SqliteWordRepository::try_new(&conn).unwrap();
    assert_eq!(words.count_words(&listed[1].table).unwrap(), 0);
    assert_eq!(words.count_words(&listed[2].table).unwrap(), 11);

    let second = bootstrap(&conn, &store, true).unwrap();
    assert!(!second.first_run);
    assert_eq!(second.seeded_vocabularies, 0);
    assert_eq!(vocabularies.list_vocabularies().unwrap().len(), 5);
}

#[test]
fn seeded_meanings_are_normalized() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    bootstrap(&conn, &store(&dir), true).unwrap();

    let russian = SqliteVocabularyRepository::try_new(&conn)
        .unwrap()
        .list_vocabularies()
        .unwrap()
        .into_iter()
        .find(|vocabulary| vocabulary.name == "Russian")
        .unwrap();
    let speak = SqliteWordRepository::try_new(&conn)
        .unwrap()
        .list_words(&russian.table, Default::default())
        .unwrap()
        .into_iter()
        .find(|word| word.headword == "говорить")
        .unwrap();
    assert_eq!(speak.meanings, "to say,to tell,to speak");
}

#[test]
fn first_run_without_seed_only_resets_preferences() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);

    let report = bootstrap(&conn, &store, false).unwrap();
    assert!(report.first_run);
    assert_eq!(report.seeded_vocabularies, 0);
    assert_eq!(report.preferences.font_size, FontSize::Medium);
    assert!(SqliteVocabularyRepository::try_new(&conn)
        .unwrap()
        .list_vocabularies()
        .unwrap()
        .is_empty());
}

#[test]
fn existing_vocabularies_suppress_seeding() {
    let conn = open_db_in_memory().unwrap();
    SqliteVocabularyRepository::try_new(&conn)
        .unwrap()
        .create_vocabulary("Mine")
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let report = bootstrap(&conn, &store(&dir), true).unwrap();
    assert!(report.first_run);
    assert_eq!(report.seeded_vocabularies, 0);
}
