use std::sync::{Arc, Barrier};

use super::*;

#[test]
fn second_acquire_fails_while_held() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.m4v.cache");

    let guard = acquire(&path).unwrap();
    assert_eq!(guard.marker(), lock_path(&path));
    assert!(guard.marker().exists());

    match acquire(&path) {
        Err(ReelError::AlreadyLocked { marker }) => assert_eq!(marker, lock_path(&path)),
        other => panic!("expected AlreadyLocked, got {other:?}"),
    }

    guard.release().unwrap();
    assert!(!lock_path(&path).exists());
    acquire(&path).unwrap().release().unwrap();
}

#[test]
fn exactly_one_concurrent_caller_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = Arc::new(dir.path().join("race.cache"));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let path = Arc::clone(&path);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                acquire(&path)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ReelError::AlreadyLocked { .. }))
    );
}

#[test]
fn release_tolerates_a_missing_marker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.cache");
    let guard = acquire(&path).unwrap();
    fs::remove_file(guard.marker()).unwrap();
    guard.release().unwrap();
}

#[test]
fn drop_releases_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropped.cache");
    {
        let _guard = acquire(&path).unwrap();
        assert!(lock_path(&path).exists());
    }
    assert!(!lock_path(&path).exists());
}

#[test]
fn missing_parent_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no/such/dir/x.cache");
    assert!(matches!(acquire(&path), Err(ReelError::Io(_))));
}

#[test]
fn lock_path_appends_suffix() {
    assert_eq!(
        lock_path(Path::new("res/demo.m4v.cache")),
        PathBuf::from("res/demo.m4v.cache.lock")
    );
}
