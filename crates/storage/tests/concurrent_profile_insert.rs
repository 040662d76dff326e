//! Concurrent first-session profile creation against one database file.

#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::{Arc, Barrier};

use venti_core::ProfileFields;
use venti_storage::{ProfileStore, Storage, StoreErrorKind};

#[test]
fn racing_inserts_leave_exactly_one_row() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = Storage::new(&dir.path().join("race.db")).unwrap();
    let writers = 8;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|i| {
            let storage = storage.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                storage.insert_profile("u1", &ProfileFields::minimal(format!("writer-{i}")))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind(), StoreErrorKind::Conflict, "unexpected error: {err}");
    }
    assert_eq!(storage.list_profiles().unwrap().len(), 1);
}

#[tokio::test]
async fn async_trait_reports_conflict() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = Storage::new(&dir.path().join("async.db")).unwrap();
    let store: &dyn ProfileStore = &storage;

    store.insert_profile("u1", &ProfileFields::minimal("a".to_owned())).await.unwrap();
    let err = store.insert_profile("u1", &ProfileFields::minimal("b".to_owned())).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(store.get_profile("u1").await.unwrap().is_some());
}
