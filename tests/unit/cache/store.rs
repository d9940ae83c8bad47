use super::*;

fn store_of(n: u64) -> CacheStore {
    let mut record = CacheRecord::with_capacity(n);
    for i in 0..n {
        record.push(RenderedFrame::from(format!("frame-{i}")));
    }
    record.into_store()
}

#[test]
fn push_appends_in_playback_order() {
    let mut record = CacheRecord::with_capacity(2);
    assert_eq!(record.frame_count(), 0);
    record.push(RenderedFrame::from("a"));
    record.push(RenderedFrame::from("b"));
    record.push(RenderedFrame::from("c"));
    assert_eq!(record.frame_count(), 3);
    let texts: Vec<_> = record.frames().iter().map(|f| f.as_bytes()).collect();
    assert_eq!(texts, vec![b"a".as_slice(), b"b", b"c"]);
}

#[test]
fn get_returns_the_half_open_slice() {
    let store = store_of(3);
    assert_eq!(store.size(), 3);
    let got = store.get(1, 3).unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].as_bytes(), b"frame-1");
    assert_eq!(got[1].as_bytes(), b"frame-2");
    assert_eq!(store.get(0, 3).unwrap().len(), 3);
}

#[test]
fn get_rejects_out_of_range() {
    let store = store_of(3);
    for (from, to) in [(-1, 1), (0, 0), (2, 1), (0, 4), (3, 4)] {
        assert!(
            matches!(store.get(from, to), Err(ReelError::OutOfRange { .. })),
            "[{from}, {to}) should be rejected"
        );
    }
}

#[test]
fn from_parts_only_trusts_the_counted_prefix() {
    let frames = vec![
        RenderedFrame::from("a"),
        RenderedFrame::from("b"),
        RenderedFrame::from("spare"),
    ];
    let store = CacheRecord::from_parts(frames, 2).unwrap().into_store();
    assert_eq!(store.size(), 2);
    assert!(store.get(0, 3).is_err());
    assert_eq!(store.total_bytes(), 2);

    assert!(CacheRecord::from_parts(vec![RenderedFrame::from("a")], 2).is_err());
}

#[test]
fn push_reuses_spare_capacity_slots() {
    let frames = vec![RenderedFrame::from("old"), RenderedFrame::from("spare")];
    let mut record = CacheRecord::from_parts(frames, 1).unwrap();
    record.push(RenderedFrame::from("new"));
    assert_eq!(record.frame_count(), 2);
    assert_eq!(record.frames()[1].as_bytes(), b"new");
}

#[test]
fn frame_lookup_and_empty_store() {
    let store = store_of(2);
    assert_eq!(store.frame(FrameIndex(1)).unwrap().as_bytes(), b"frame-1");
    assert!(store.frame(FrameIndex(2)).is_none());

    let empty = CacheStore::default();
    assert_eq!(empty.size(), 0);
    assert!(empty.get(0, 1).is_err());
}

#[test]
fn get_never_clamps_past_the_last_frame() {
    let store = store_of(4);
    let all = store.get(0, 4).unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[3].as_bytes(), b"frame-3");

    match store.get(2, 5) {
        Err(ReelError::OutOfRange {
            from,
            to,
            frame_count,
        }) => assert_eq!((from, to, frame_count), (2, 5, 4)),
        other => panic!("expected OutOfRange, got {other:?}"),
    }
    assert!(store.get(4, 5).is_err());
}
