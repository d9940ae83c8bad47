use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::cache::CacheStore;
use crate::foundation::error::{ReelError, ReelResult};
use crate::server::dispatch::Dispatcher;
use crate::server::protocol::{Command, RequestError, decode_request};

/// Default bound of the per-session request queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Per-session tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOpts {
    /// Requests buffered between the reader and the worker. The reader waits when full.
    pub queue_capacity: usize,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Counters reported when a session ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Request messages read from the connection.
    pub requests: u64,
    /// Response messages written to the connection.
    pub responses: u64,
    /// Why the session ended early, if it did.
    pub error: Option<String>,
}

type Queued = Result<Command, RequestError>;

/// Serve one connection until it closes.
///
/// The caller's task reads and decodes requests and pushes them onto a bounded queue. A single
/// worker task dispatches them in arrival order and writes every response to `writer`. When
/// reading stops the queue is closed, the worker drains what is left, and this function
/// returns only after the worker has finished.
#[tracing::instrument(skip_all, fields(queue = opts.queue_capacity))]
pub async fn run_session<R, E, W>(
    store: Arc<CacheStore>,
    mut reader: R,
    writer: W,
    opts: SessionOpts,
) -> SessionStats
where
    R: Stream<Item = Result<String, E>> + Unpin,
    E: Display,
    W: Sink<String> + Unpin + Send + 'static,
    W::Error: Display,
{
    let (tx, rx) = mpsc::channel::<Queued>(opts.queue_capacity.max(1));
    let worker = tokio::spawn(run_worker(Dispatcher::new(store), rx, writer));

    let mut requests = 0u64;
    let mut read_error = None;
    loop {
        let next = tokio::select! {
            next = reader.next() => next,
            // The worker is gone (write failure); stop reading.
            _ = tx.closed() => break,
        };
        let text = match next {
            Some(Ok(text)) => text,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "read failed, closing session");
                read_error = Some(ReelError::connection(e.to_string()).to_string());
                break;
            }
            None => break,
        };
        requests += 1;
        let request = decode_request(&text);
        if let Err(err) = &request {
            tracing::debug!(error = %err, "rejected request");
        }
        if tx.send(request).await.is_err() {
            break;
        }
    }
    drop(tx);

    let (responses, write_error) = match worker.await {
        Ok((responses, result)) => (responses, result.err().map(|e| e.to_string())),
        Err(e) => (0, Some(format!("session worker panicked: {e}"))),
    };
    let stats = SessionStats {
        requests,
        responses,
        error: write_error.or(read_error),
    };
    tracing::debug!(
        requests = stats.requests,
        responses = stats.responses,
        error = stats.error.as_deref(),
        "session finished"
    );
    stats
}

async fn run_worker<W>(
    dispatcher: Dispatcher,
    mut rx: mpsc::Receiver<Queued>,
    mut writer: W,
) -> (u64, ReelResult<()>)
where
    W: Sink<String> + Unpin + Send + 'static,
    W::Error: Display,
{
    let mut sent = 0u64;
    while let Some(request) = rx.recv().await {
        for response in dispatcher.dispatch(request) {
            let text = match response.to_json() {
                Ok(text) => text,
                Err(e) => return (sent, Err(e)),
            };
            if let Err(e) = writer.send(text).await {
                return (sent, Err(ReelError::connection(e.to_string())));
            }
            sent += 1;
        }
    }
    let closed = writer
        .close()
        .await
        .map_err(|e| ReelError::connection(e.to_string()));
    (sent, closed)
}

#[cfg(test)]
#[path = "../../tests/unit/server/session.rs"]
mod tests;
