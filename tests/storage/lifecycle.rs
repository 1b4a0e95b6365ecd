//! Step Log Lifecycle Tests
//!
//! append -> finish -> find -> delete, across reopen.

use crate::common::*;

// =============================================================================
// FIND
// =============================================================================

#[test]
fn find_on_step_never_appended_is_empty() {
    let t = TestStore::new();
    for step in [0, 1, 42, -3] {
        let found = t.store.log_find(StepId::new(step)).expect("find");
        assert!(found.is_empty());
    }
}

#[test]
fn find_sees_appends_before_finish() {
    let t = TestStore::new();
    t.store.log_append(&entry(1, 0, "a")).unwrap();
    t.store.log_append(&entry(1, 1, "b")).unwrap();

    assert_eq!(payloads(&t.store.log_find(StepId::new(1)).unwrap()), ["a", "b"]);
}

// =============================================================================
// APPEND / FINISH
// =============================================================================

#[test]
fn three_entries_then_finish_then_find() {
    let t = TestStore::new();
    let appended: Vec<_> = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(line, data)| entry(1, line as i64, data))
        .collect();

    for e in &appended {
        t.store.log_append(e).expect("append");
    }
    t.store.log_finish(StepId::new(1)).expect("finish");

    let found = t.store.log_find(StepId::new(1)).expect("find");
    assert_eq!(found.len(), 3);
    assert_eq!(payloads(&found), ["a", "b", "c"]);
    assert_eq!(found, appended, "every field should survive the round trip");
}

#[test]
fn finish_twice_is_noop() {
    let t = TestStore::new();
    t.store.log_append(&entry(1, 0, "a")).unwrap();

    t.store.log_finish(StepId::new(1)).expect("first finish");
    t.store.log_finish(StepId::new(1)).expect("second finish");
    assert_eq!(t.store.open_handles(), 0);
}

#[test]
fn append_after_finish_continues_file() {
    let t = TestStore::new();
    t.store.log_append(&entry(1, 0, "before")).unwrap();
    t.store.log_finish(StepId::new(1)).unwrap();

    t.store.log_append(&entry(1, 1, "after")).unwrap();
    t.store.log_finish(StepId::new(1)).unwrap();

    assert_eq!(
        payloads(&t.store.log_find(StepId::new(1)).unwrap()),
        ["before", "after"]
    );
}

#[test]
fn steps_are_independent_files() {
    let t = TestStore::new();
    t.store.log_append(&entry(1, 0, "one")).unwrap();
    t.store.log_append(&entry(2, 0, "two")).unwrap();
    t.store.log_append(&entry(1, 1, "uno")).unwrap();

    assert_eq!(payloads(&t.store.log_find(StepId::new(1)).unwrap()), ["one", "uno"]);
    assert_eq!(payloads(&t.store.log_find(StepId::new(2)).unwrap()), ["two"]);
    assert!(t.store.file_path(StepId::new(1)).exists());
    assert!(t.store.file_path(StepId::new(2)).exists());
}

#[test]
fn order_is_append_order_not_line_order() {
    let t = TestStore::new();
    for line in [5, 2, 9, 2] {
        t.store.log_append(&entry(1, line, "x")).unwrap();
    }

    let lines: Vec<i64> = t
        .store
        .log_find(StepId::new(1))
        .unwrap()
        .iter()
        .map(|e| e.line)
        .collect();
    assert_eq!(lines, vec![5, 2, 9, 2]);
}

#[test]
fn entries_survive_reopen() {
    let t = TestStore::with_sync(SyncMode::OnFinish);
    t.store.log_append(&entry(7, 0, "persisted")).unwrap();
    t.store.log_finish(StepId::new(7)).unwrap();

    let t = t.reopen();
    t.store.log_append(&entry(7, 1, "appended later")).unwrap();

    assert_eq!(
        payloads(&t.store.log_find(StepId::new(7)).unwrap()),
        ["persisted", "appended later"]
    );
}

// =============================================================================
// DELETE
// =============================================================================

#[test]
fn delete_then_find_is_empty() {
    let t = TestStore::new();
    t.store.log_append(&entry(1, 0, "a")).unwrap();
    t.store.log_finish(StepId::new(1)).unwrap();

    t.store.log_delete(StepId::new(1)).expect("delete");

    assert!(!t.store.file_path(StepId::new(1)).exists());
    assert!(t.store.log_find(StepId::new(1)).unwrap().is_empty());
}

#[test]
fn delete_without_finish_releases_handle() {
    let t = TestStore::new();
    t.store.log_append(&entry(2, 0, "a")).unwrap();
    assert!(t.store.is_open(StepId::new(2)));

    t.store.log_delete(StepId::new(2)).expect("delete");

    assert!(t.store.log_find(StepId::new(2)).unwrap().is_empty());
    assert!(!t.store.is_open(StepId::new(2)));
    assert_eq!(t.store.open_handles(), 0);
}

#[test]
fn delete_missing_file_is_not_found() {
    let t = TestStore::new();
    let err = t.store.log_delete(StepId::new(3)).unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got {:?}", err);
}

#[test]
fn delete_leaves_other_steps_alone() {
    let t = TestStore::new();
    t.store.log_append(&entry(1, 0, "keep")).unwrap();
    t.store.log_append(&entry(2, 0, "drop")).unwrap();

    t.store.log_delete(StepId::new(2)).unwrap();

    assert_eq!(payloads(&t.store.log_find(StepId::new(1)).unwrap()), ["keep"]);
    assert!(t.store.is_open(StepId::new(1)));
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

#[test]
fn empty_base_path_is_rejected() {
    let err = FileLogStore::open("").unwrap_err();
    assert!(err.is_config());
}

#[test]
fn existing_directory_is_reused() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("9.json"), b"").unwrap();

    let store = FileLogStore::open(dir.path()).unwrap();
    assert!(store.log_find(StepId::new(9)).unwrap().is_empty());
}
