use notekeep_core::{
    seed_notes, BackendType, DefaultStorageFactory, DocumentNoteStorage, Note, NoteStorage,
    SqliteNoteStorage, StorageConfig, StorageError, StorageFactory,
};
use std::sync::Arc;

/// Both backends, emptied so they start from the same state.
fn backends() -> Vec<(&'static str, Arc<dyn NoteStorage>)> {
    let relational: Arc<dyn NoteStorage> = Arc::new(SqliteNoteStorage::open_in_memory().unwrap());
    for seed in relational.read_all().unwrap() {
        assert!(relational.delete_by_id(seed.id.unwrap()).unwrap());
    }
    let document: Arc<dyn NoteStorage> = Arc::new(DocumentNoteStorage::in_memory());
    vec![("relational", relational), ("remote_document", document)]
}

#[test]
fn read_all_returns_notes_in_creation_order() {
    for (name, storage) in backends() {
        let first = storage.create(&Note::new("first", "one")).unwrap();
        let second = storage.create(&Note::new("second", "two")).unwrap();
        let third = storage.create(&Note::new("third", "three")).unwrap();

        let ids: Vec<_> = storage.read_all().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id], "backend {name}");
    }
}

#[test]
fn update_replaces_text_and_keeps_id() {
    for (name, storage) in backends() {
        let created = storage.create(&Note::new("draft", "body")).unwrap();
        let id = created.id.unwrap();

        let changed = storage
            .update_by_id(id, &Note::new("final", "edited body"))
            .unwrap();
        assert!(changed, "backend {name}");

        let notes = storage.read_all().unwrap();
        assert_eq!(notes.len(), 1, "backend {name}");
        assert_eq!(notes[0].id, Some(id));
        assert_eq!(notes[0].title, "final");
        assert_eq!(notes[0].subtitle, "edited body");
    }
}

#[test]
fn update_and_delete_of_missing_id_report_false() {
    for (name, storage) in backends() {
        storage.create(&Note::new("kept", "note")).unwrap();

        assert!(
            !storage.update_by_id(404, &Note::new("x", "y")).unwrap(),
            "backend {name}"
        );
        assert!(!storage.delete_by_id(404).unwrap(), "backend {name}");
        assert_eq!(storage.read_all().unwrap().len(), 1, "backend {name}");
    }
}

#[test]
fn delete_removes_only_matching_note() {
    for (name, storage) in backends() {
        let keep = storage.create(&Note::new("keep", "me")).unwrap();
        let gone = storage.create(&Note::new("gone", "me")).unwrap();

        assert!(storage.delete_by_id(gone.id.unwrap()).unwrap());

        let notes = storage.read_all().unwrap();
        assert_eq!(notes, vec![keep], "backend {name}");
    }
}

#[test]
fn writes_reject_blank_fields() {
    for (name, storage) in backends() {
        let created = storage.create(&Note::new("ok", "ok")).unwrap();

        let err = storage.create(&Note::new("title", " ")).unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)), "backend {name}");

        let err = storage
            .update_by_id(created.id.unwrap(), &Note::new("", "body"))
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)), "backend {name}");
        assert_eq!(storage.read_all().unwrap()[0].title, "ok");
    }
}

#[test]
fn sqlite_storage_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let created = {
        let storage = SqliteNoteStorage::open(&path).unwrap();
        storage.create(&Note::new("durable", "note")).unwrap()
    };

    let reopened = SqliteNoteStorage::open(&path).unwrap();
    let notes = reopened.read_all().unwrap();
    assert_eq!(notes.len(), seed_notes().len() + 1);
    assert_eq!(notes.last(), Some(&created));
}

#[test]
fn document_snapshot_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("notes.json");

    let (kept, removed_id) = {
        let storage = DocumentNoteStorage::open(&path).unwrap();
        let kept = storage.create(&Note::new("kept", "doc")).unwrap();
        let removed = storage.create(&Note::new("removed", "doc")).unwrap();
        storage.delete_by_id(removed.id.unwrap()).unwrap();
        (kept, removed.id.unwrap())
    };
    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let reopened = DocumentNoteStorage::open(&path).unwrap();
    assert_eq!(reopened.read_all().unwrap(), vec![kept]);

    let next = reopened.create(&Note::new("next", "doc")).unwrap();
    assert!(next.id.unwrap() > removed_id);
}

#[test]
fn document_open_rejects_corrupt_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = DocumentNoteStorage::open(&path).err().unwrap();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[test]
fn document_open_rejects_snapshot_with_blank_note() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(
        &path,
        r#"{ "next_id": 2, "documents": { "1": { "title": "", "subtitle": "x", "updated_at": 0 } } }"#,
    )
    .unwrap();

    let err = DocumentNoteStorage::open(&path).err().unwrap();
    assert!(matches!(err, StorageError::InvalidData(_)));
}

#[test]
fn factory_uses_configured_locations() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        relational_path: Some(dir.path().join("notes.db")),
        document_path: Some(dir.path().join("notes.json")),
    };
    let factory = DefaultStorageFactory::new(config.clone());

    factory
        .open(BackendType::Relational)
        .unwrap()
        .create(&Note::new("sql", "row"))
        .unwrap();
    factory
        .open_named("remote_document")
        .unwrap()
        .create(&Note::new("json", "doc"))
        .unwrap();

    assert!(config.relational_path.unwrap().exists());
    assert!(config.document_path.unwrap().exists());
}
