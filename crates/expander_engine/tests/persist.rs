use std::fs;

use expander_core::SessionState;
use expander_engine::{AtomicFileWriter, FileSessionStore, SessionContext, SessionStore};
use tempfile::TempDir;

fn context(query_count: usize) -> SessionContext {
    SessionContext {
        seed: "coffee".to_string(),
        query_count,
        output_path: "out.csv".to_string(),
    }
}

#[test]
fn atomic_write_replaces_existing_and_creates_parent() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("state.ron");
    let writer = AtomicFileWriter::new(&target);

    writer.write("hello").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");

    // Replace existing
    writer.write("world").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "world");

    // Only the target remains, no stray temp files.
    let entries: Vec<_> = fs::read_dir(target.parent().unwrap()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.join("state.ron"));
    assert!(writer.write("data").is_err());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}

#[test]
fn removing_missing_file_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("absent.ron"));
    assert!(!writer.remove().unwrap());
}

#[test]
fn session_round_trips_through_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("session.ron");
    let mut store = FileSessionStore::new(&path, context(3));

    store.save(&SessionState::at(2, 5, 10)).unwrap();
    let loaded = FileSessionStore::load(&path).expect("saved session");
    assert_eq!(loaded.context, context(3));
    assert_eq!(loaded.state, SessionState::at(2, 5, 10));

    store.clear().unwrap();
    assert!(!path.exists());
    assert!(FileSessionStore::load(&path).is_none());
    // Clearing twice is fine.
    store.clear().unwrap();
}

#[test]
fn corrupt_session_file_means_start_fresh() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("session.ron");
    fs::write(&path, "(context: (seed: \"coff").unwrap();
    assert!(FileSessionStore::load(&path).is_none());
}

#[test]
fn inconsistent_session_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("session.ron");
    let mut store = FileSessionStore::new(&path, context(2));
    store.save(&SessionState::at(5, 1, 0)).unwrap();
    assert!(FileSessionStore::load(&path).is_none());

    store.save(&SessionState::at(1, 0, 0)).unwrap();
    assert!(FileSessionStore::load(&path).is_none());
}

#[test]
fn discard_removes_stale_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("session.ron");
    fs::write(&path, "garbage").unwrap();
    assert!(FileSessionStore::discard(&path).unwrap());
    assert!(!path.exists());
}
