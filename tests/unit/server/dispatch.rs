use super::*;
use crate::cache::CacheRecord;
use crate::server::protocol::{ResponseData, STATUS_ERROR, STATUS_OK};

fn dispatcher(n: u64) -> Dispatcher {
    let mut record = CacheRecord::with_capacity(n);
    for i in 0..n {
        record.push(RenderedFrame::from(format!("rendered({i})")));
    }
    Dispatcher::new(Arc::new(record.into_store()))
}

#[test]
fn get_data_streams_each_frame_in_order() {
    let d = dispatcher(3);
    let out: Vec<_> = d.dispatch(Ok(Command::GetData { from: 1, to: 3 })).collect();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|r| r.error_code == STATUS_OK && r.kind == "GETDATA"));
    assert_eq!(out[0].frame_bytes().unwrap(), b"rendered(1)");
    assert_eq!(out[1].frame_bytes().unwrap(), b"rendered(2)");
}

#[test]
fn every_valid_range_returns_to_minus_from_frames() {
    let d = dispatcher(5);
    for from in 0..5i64 {
        for to in (from + 1)..=5 {
            let frames: Vec<_> = d
                .dispatch(Ok(Command::GetData { from, to }))
                .map(|r| r.frame_bytes().unwrap())
                .collect();
            let expected: Vec<_> = (from..to)
                .map(|i| format!("rendered({i})").into_bytes())
                .collect();
            assert_eq!(frames, expected);
        }
    }
}

#[test]
fn invalid_ranges_yield_one_error_and_no_frames() {
    let d = dispatcher(3);
    for (from, to) in [(0, 0), (-1, 2), (2, 1), (0, 4), (3, 3)] {
        let reply = d.dispatch(Ok(Command::GetData { from, to }));
        assert_eq!(reply.size_hint(), (1, Some(1)));
        let out: Vec<_> = reply.collect();
        assert_eq!(out.len(), 1, "[{from}, {to})");
        assert_eq!(out[0].error_code, STATUS_ERROR);
        assert!(matches!(out[0].data, ResponseData::Error { .. }));
    }
}

#[test]
fn frame_count_is_unchanged_by_range_queries() {
    let d = dispatcher(3);
    let count = |d: &Dispatcher| d.dispatch(Ok(Command::GetFrameCount)).next().unwrap();
    assert_eq!(count(&d), Response::frame_count(3));
    for _ in 0..4 {
        let _ = d.dispatch(Ok(Command::GetData { from: 0, to: 3 })).count();
    }
    assert_eq!(count(&d), Response::frame_count(d.store().size()));
}

#[test]
fn request_errors_echo_their_type() {
    let d = dispatcher(1);
    let out: Vec<_> = d
        .dispatch(Err(RequestError::UnknownCommand("REWIND".to_owned())))
        .collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].kind, "REWIND");
    assert_eq!(
        out[0].data,
        ResponseData::Error {
            err: "unknown command: REWIND".to_owned()
        }
    );
}
