//! Streaming server: wire protocol, dispatch, per-connection sessions, and the HTTP surface.

/// Request dispatch against the frame store.
pub mod dispatch;
/// axum router and server loop.
pub mod http;
/// Wire request/response shapes.
pub mod protocol;
/// Per-connection reader, queue, and worker.
pub mod session;

pub use dispatch::{Dispatcher, Reply};
pub use http::{AppState, router, serve};
pub use protocol::{Command, RequestError, Response, ResponseData, decode_request};
pub use session::{SessionOpts, SessionStats, run_session};
