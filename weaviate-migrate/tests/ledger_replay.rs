//! Ledger ordering and failure behaviour across whole folders.

use tempfile::TempDir;
use weaviate_migrate::{
    ClassDefinition, InMemoryStore, MigrateError, MigrationApplier, MigrationDelta, MigrationLedger,
    MigrationRecord, Schema, migration_filename,
};

fn snapshot(class: &str) -> MigrationRecord {
    MigrationRecord::Snapshot(Schema::new(vec![ClassDefinition::new(class)]))
}

#[test]
fn eleven_writes_list_in_numeric_order() {
    let dir = TempDir::new().unwrap();
    let ledger = MigrationLedger::open(dir.path()).unwrap();

    for i in 1..=11 {
        ledger
            .write(&MigrationRecord::Delta(MigrationDelta {
                classes_to_add: vec![format!("Class{i}")],
                ..Default::default()
            }))
            .unwrap();
    }

    let paths = ledger.list_in_order().unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, (1..=11).map(migration_filename).collect::<Vec<_>>());
    assert_eq!(ledger.next_sequence_number().unwrap(), 12);
}

#[test]
fn missing_folder_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let store = InMemoryStore::new();

    let reports = MigrationApplier::new(&store)
        .migrate_all(&dir.path().join("does-not-exist"))
        .unwrap();

    assert!(reports.is_empty());
    assert!(store.calls().is_empty());
}

#[test]
fn malformed_entry_aborts_the_rest() {
    let dir = TempDir::new().unwrap();
    let ledger = MigrationLedger::open(dir.path()).unwrap();
    ledger.write(&snapshot("First")).unwrap();
    std::fs::write(dir.path().join(migration_filename(2)), r#"{"unexpected": true}"#).unwrap();
    std::fs::write(
        dir.path().join(migration_filename(3)),
        serde_json::to_string(&snapshot("Third")).unwrap(),
    )
    .unwrap();

    let store = InMemoryStore::new();
    let err = MigrationApplier::new(&store).migrate_all(dir.path()).unwrap_err();

    assert!(matches!(err, MigrateError::MigrationLoad { .. }));
    assert_eq!(err.exit_code(), 4);
    let live = store.schema();
    assert!(live.contains_class("First"));
    assert!(!live.contains_class("Third"));
}

#[test]
fn foreign_files_are_not_replayed() {
    let dir = TempDir::new().unwrap();
    let ledger = MigrationLedger::open(dir.path()).unwrap();
    ledger.write(&snapshot("Only")).unwrap();
    std::fs::write(dir.path().join("README.md"), "notes").unwrap();
    std::fs::write(dir.path().join("schema.json"), "{}").unwrap();

    let store = InMemoryStore::new();
    let reports = MigrationApplier::new(&store).migrate_all(dir.path()).unwrap();

    assert_eq!(reports.len(), 1);
    assert!(store.schema().contains_class("Only"));
}

#[test]
fn mixed_records_replay_in_sequence() {
    let dir = TempDir::new().unwrap();
    let ledger = MigrationLedger::open(dir.path()).unwrap();
    ledger.write(&snapshot("Base")).unwrap();
    ledger
        .write(&MigrationRecord::Delta(MigrationDelta {
            classes_to_add: vec!["Base".to_string(), "Extra".to_string()],
            ..Default::default()
        }))
        .unwrap();

    let store = InMemoryStore::new();
    let reports = MigrationApplier::new(&store).migrate_all(dir.path()).unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].created_count(), 1);
    // "Base" already exists by the time the delta runs.
    assert_eq!(reports[1].created_count(), 1);
    assert_eq!(reports[1].skipped_count(), 1);
}
