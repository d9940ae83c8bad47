use std::sync::Arc;

use crate::cache::CacheStore;
use crate::foundation::error::ReelError;
use crate::render::frame::RenderedFrame;
use crate::server::protocol::{Command, GET_DATA, RequestError, Response};

/// Maps decoded requests onto the read-only store.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    store: Arc<CacheStore>,
}

impl Dispatcher {
    /// Dispatch against `store`.
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    /// The store requests are answered from.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Responses for one request, in send order.
    ///
    /// Request errors yield exactly one error response. A valid `GETDATA` yields one response
    /// per frame, lazily, so large ranges are never materialized.
    pub fn dispatch(&self, request: Result<Command, RequestError>) -> Reply<'_> {
        let command = match request {
            Ok(command) => command,
            Err(err) => return Reply::single(Response::error(&err)),
        };
        match command {
            Command::GetFrameCount => Reply::single(Response::frame_count(self.store.size())),
            Command::GetData { from, to } => match self.store.get(from, to) {
                Ok(frames) => Reply::Frames(frames.iter()),
                Err(ReelError::OutOfRange {
                    from,
                    to,
                    frame_count,
                }) => Reply::single(Response::error(&RequestError::OutOfRange {
                    from,
                    to,
                    frame_count,
                })),
                Err(other) => Reply::single(Response::error(&RequestError::InvalidArgs {
                    command: GET_DATA.to_owned(),
                    reason: other.to_string(),
                })),
            },
        }
    }
}

/// Iterator over the responses to one request.
#[derive(Debug)]
pub enum Reply<'a> {
    /// One response, or none once taken.
    Single(Option<Response>),
    /// One frame response per remaining frame.
    Frames(std::slice::Iter<'a, RenderedFrame>),
}

impl Reply<'_> {
    fn single(response: Response) -> Self {
        Self::Single(Some(response))
    }
}

impl Iterator for Reply<'_> {
    type Item = Response;

    fn next(&mut self) -> Option<Response> {
        match self {
            Self::Single(slot) => slot.take(),
            Self::Frames(frames) => frames.next().map(Response::frame),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Single(slot) => {
                let n = usize::from(slot.is_some());
                (n, Some(n))
            }
            Self::Frames(frames) => frames.size_hint(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/dispatch.rs"]
mod tests;
