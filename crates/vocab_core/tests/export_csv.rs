use vocab_core::db::open_db_in_memory;
use vocab_core::{
    ExportError, ExportService, SqliteVocabularyRepository, SqliteWordRepository, Vocabulary,
    VocabularyRepository, WordDraft, WordRepository,
};

#[test]
fn export_writes_words_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let vocabulary = SqliteVocabularyRepository::try_new(&conn)
        .unwrap()
        .create_vocabulary("Spanish")
        .unwrap();
    let words = SqliteWordRepository::try_new(&conn).unwrap();
    words
        .add_word(&vocabulary.table, &WordDraft::from_raw("hola", "hello"))
        .unwrap();
    words
        .add_word(&vocabulary.table, &WordDraft::from_raw("adios", "bye"))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let export_dir = dir.path().join("exports");
    let service = ExportService::new(words, &export_dir);
    let export = service.export(&vocabulary).unwrap();

    assert_eq!(export.path, export_dir.join("Spanish.csv"));
    assert_eq!(export.word_count, 2);
    assert_eq!(
        std::fs::read_to_string(&export.path).unwrap(),
        "hola,hello\nadios,bye\n"
    );
}

#[test]
fn export_replaces_previous_file_and_keeps_multi_meaning_fields_unquoted() {
    let conn = open_db_in_memory().unwrap();
    let vocabulary = SqliteVocabularyRepository::try_new(&conn)
        .unwrap()
        .create_vocabulary("Russian")
        .unwrap();
    let words = SqliteWordRepository::try_new(&conn).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let service = ExportService::new(words, dir.path());

    service.export(&vocabulary).unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("Russian.csv")).unwrap(),
        ""
    );

    SqliteWordRepository::try_new(&conn)
        .unwrap()
        .add_word(
            &vocabulary.table,
            &WordDraft::from_raw("говорить", "to say, to tell, to speak"),
        )
        .unwrap();
    service.export(&vocabulary).unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("Russian.csv")).unwrap(),
        "говорить,to say,to tell,to speak\n"
    );
}

#[test]
fn export_of_deleted_vocabulary_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVocabularyRepository::try_new(&conn).unwrap();
    let vocabulary: Vocabulary = repo.create_vocabulary("Dutch").unwrap();
    repo.delete_vocabulary(&vocabulary.table).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let service = ExportService::new(SqliteWordRepository::try_new(&conn).unwrap(), dir.path());
    let err = service.export(&vocabulary).unwrap_err();
    assert!(matches!(err, ExportError::Repo(_)));
    assert!(!dir.path().join("Dutch.csv").exists());
}

#[test]
fn export_into_unwritable_root_fails_with_io_error() {
    let conn = open_db_in_memory().unwrap();
    let vocabulary = SqliteVocabularyRepository::try_new(&conn)
        .unwrap()
        .create_vocabulary("German")
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let service = ExportService::new(SqliteWordRepository::try_new(&conn).unwrap(), &blocker);
    let err = service.export(&vocabulary).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
}
