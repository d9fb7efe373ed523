//! Session directory persistence: round trips, staleness, backups.

use curator::config::paths::{INPUT_FILE, META_FILE, NAMES_FILE};
use curator::domain::{compute_checksum, Annotation, FinderOutput, Occurrence, RunMetadata};
use curator::persist::{SessionStore, Staleness};
use tempfile::TempDir;

const TEXT: &str = "Venus and Octopus, also Mollusca.";

fn mixed_output() -> FinderOutput {
    let scores = [0.0, 16.35, 462914.03, 0.1 + 0.2, 211.35, 9327.3, 37.21];
    let names = Annotation::ALL
        .iter()
        .zip(scores)
        .enumerate()
        .map(|(i, (annotation, score))| {
            Occurrence::new(format!("Name{}", i), "Uninomial", score, i, i + 1)
                .with_annotation(*annotation)
        })
        .collect();
    FinderOutput::from_occurrences(names)
}

#[test]
fn test_round_trip_all_annotations() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::open(temp.path().join("t.txt_curator")).unwrap();
    let output = mixed_output();
    let mut meta = RunMetadata::new(TEXT.as_bytes());

    store.save_text(TEXT).unwrap();
    store.save(&output, &mut meta).unwrap();

    let loaded = store.load_collection().unwrap();
    assert_eq!(loaded.occurrences(), output.names.as_slice());
    for (got, want) in loaded.occurrences().iter().zip(&output.names) {
        assert_eq!(got.score.to_bits(), want.score.to_bits());
    }
    assert_eq!(store.load_metadata().unwrap(), Some(meta));
    assert_eq!(store.load_text().unwrap(), TEXT);
}

#[test]
fn test_not_assigned_is_stored_as_empty_string() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::open(temp.path()).unwrap();
    store.save_names(&mixed_output()).unwrap();

    let raw = std::fs::read_to_string(store.names_path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["names"][0]["annotation"], "");
    assert_eq!(json["names"][1]["annotation"], "NotName");
    assert_eq!(json["metadata"]["total_names"], 7);
}

#[test]
fn test_unknown_annotation_is_rejected() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::open(temp.path()).unwrap();
    std::fs::write(
        store.names_path(),
        r#"{"names": [{"name": "Venus", "start": 0, "end": 5, "annotation": "Maybe"}]}"#,
    )
    .unwrap();

    assert!(store.load_collection().is_err());
}

#[test]
fn test_cursor_is_restored() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::open(temp.path()).unwrap();
    let mut output = mixed_output();
    output.meta.current_name = 4;
    store.save_names(&output).unwrap();

    let loaded = store.load_collection().unwrap();
    assert_eq!(loaded.current_index(), 4);
    assert_eq!(loaded.last_reviewed_index(), 4);
}

fn saved_session(temp: &TempDir) -> (SessionStore, RunMetadata) {
    let store = SessionStore::open(temp.path().join("book.txt_curator")).unwrap();
    let meta = RunMetadata::new(TEXT.as_bytes());
    store.save_text(TEXT).unwrap();
    store.save_names(&mixed_output()).unwrap();
    store.save_metadata(&meta).unwrap();
    (store, meta)
}

#[test]
fn test_fresh_directory_has_no_previous() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::open(temp.path().join("new_curator")).unwrap();
    let staleness = store
        .check_staleness(&compute_checksum(TEXT.as_bytes()), "0.1.0")
        .unwrap();
    assert_eq!(staleness, Staleness::NoPrevious);
}

#[test]
fn test_unchanged_input_is_current() {
    let temp = TempDir::new().unwrap();
    let (store, meta) = saved_session(&temp);

    let staleness = store
        .check_staleness(&meta.text_checksum, &meta.tool_version)
        .unwrap();
    assert!(!staleness.is_stale());
    assert_eq!(staleness.warning(), None);
}

#[test]
fn test_changed_input_is_detected_and_backed_up() {
    let temp = TempDir::new().unwrap();
    let (store, meta) = saved_session(&temp);

    let checksum = compute_checksum(b"A different text entirely.");
    let staleness = store.check_staleness(&checksum, &meta.tool_version).unwrap();
    assert!(matches!(staleness, Staleness::ContentChanged(_)));
    assert_eq!(staleness.warning(), Some("Your input file has changed."));

    let moved = store.backup_previous(&meta.save_timestamp).unwrap();
    assert_eq!(moved.len(), 3);
    assert!(!store.has_session());
    for file in [INPUT_FILE, NAMES_FILE, META_FILE] {
        let backup = store.dir().join(format!("{}_{}", meta.save_timestamp, file));
        assert!(backup.is_file(), "missing backup {}", backup.display());
    }
}

#[test]
fn test_version_change_is_detected() {
    let temp = TempDir::new().unwrap();
    let (store, meta) = saved_session(&temp);

    let staleness = store
        .check_staleness(&meta.text_checksum, "0.0.0-older")
        .unwrap();
    assert!(matches!(staleness, Staleness::VersionChanged(_)));
    assert_eq!(staleness.warning(), Some("Your curator is updated."));
    assert_eq!(staleness.previous(), Some(&meta));
}
