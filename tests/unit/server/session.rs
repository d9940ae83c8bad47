use std::convert::Infallible;

use futures::channel::mpsc as fmpsc;

use super::*;
use crate::cache::CacheRecord;
use crate::render::frame::RenderedFrame;

fn store(n: u64) -> Arc<CacheStore> {
    let mut record = CacheRecord::with_capacity(n);
    for i in 0..n {
        record.push(RenderedFrame::from(format!("f{i}")));
    }
    Arc::new(record.into_store())
}

#[test]
fn default_queue_holds_ten_requests() {
    assert_eq!(SessionOpts::default().queue_capacity, 10);
}

#[tokio::test]
async fn clean_end_of_stream_drains_the_queue() {
    let reader = futures::stream::iter(vec![
        Ok::<_, Infallible>(r#"{"Type":"GETFRAMECOUNT"}"#.to_owned()),
        Ok(r#"{"Type":"GETDATA","Args":{"from":0,"to":2}}"#.to_owned()),
    ]);
    let (tx, rx) = fmpsc::unbounded::<String>();

    let stats = run_session(store(2), reader, tx, SessionOpts::default()).await;
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.responses, 3);
    assert_eq!(stats.error, None);

    let written: Vec<String> = rx.collect().await;
    assert_eq!(written.len(), 3);
}

#[tokio::test]
async fn write_failure_ends_a_session_whose_reader_is_still_open() {
    let reader = futures::stream::iter(vec![Ok::<_, Infallible>(
        r#"{"Type":"GETFRAMECOUNT"}"#.to_owned(),
    )])
    .chain(futures::stream::pending());
    let (tx, rx) = fmpsc::channel::<String>(0);
    drop(rx);

    let stats = run_session(store(1), reader, tx, SessionOpts::default()).await;
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.responses, 0);
    assert!(stats.error.unwrap().starts_with("connection error"));
}

#[tokio::test]
async fn read_error_is_reported_after_draining() {
    let reader = futures::stream::iter(vec![
        Ok(r#"{"Type":"GETFRAMECOUNT"}"#.to_owned()),
        Err("reset by peer"),
    ]);
    let (tx, rx) = fmpsc::unbounded::<String>();

    let stats = run_session(store(1), reader, tx, SessionOpts::default()).await;
    assert_eq!(stats.responses, 1);
    assert!(stats.error.unwrap().contains("reset by peer"));
    assert_eq!(rx.collect::<Vec<_>>().await.len(), 1);
}
