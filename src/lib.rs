//! asciireel renders a movie into text frames once and streams them to browsers on demand.
//!
//! # Pipeline overview
//!
//! 1. **Warm up**: take the cross-process lock on the cache artifact, then either load the
//!    artifact or decode the movie ([`FrameSource`]) and render every frame ([`FrameRenderer`])
//!    into a [`CacheRecord`] that is persisted atomically.
//! 2. **Freeze**: the record becomes a read-only [`CacheStore`] shared by all sessions.
//! 3. **Serve**: each websocket connection gets a session with a bounded request queue and a
//!    single worker, answering `GETFRAMECOUNT` and `GETDATA` range queries in order.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No shared mutable state after warm-up**: the store has no mutating API.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod config;
mod foundation;
mod media;
mod render;
mod server;
mod warmup;

pub use cache::persist::{FORMAT_VERSION, MAGIC, decode_record, encode_record, tmp_path};
pub use cache::{CacheRecord, CacheStore, LockGuard, acquire, load, lock_path, write_atomic};
pub use config::ReelConfig;
pub use foundation::core::{FrameIndex, FrameRange, MovieMetadata};
pub use foundation::error::{ReelError, ReelResult};
pub use media::ffmpeg::{RGB24_BITS_PER_PIXEL, probe_movie};
pub use media::{FfmpegSource, FrameSource, OpenedMovie, RawFrame, RawFrames, is_ffmpeg_on_path};
pub use render::gzip::gzip_bytes;
pub use render::{
    AsciiRenderer, AsciiRendererFactory, FrameRenderer, GzipRendererFactory, RenderedFrame,
    RendererFactory, TextFormat, factory_for,
};
pub use server::protocol::{GET_DATA, GET_FRAME_COUNT, STATUS_ERROR, STATUS_OK};
pub use server::session::DEFAULT_QUEUE_CAPACITY;
pub use server::{
    AppState, Command, Dispatcher, Reply, RequestError, Response, ResponseData, SessionOpts,
    SessionStats, decode_request, router, run_session, serve,
};
pub use warmup::{PROGRESS_EVERY, WarmupOptions, WarmupOrchestrator, WarmupOutcome, WarmupReport};
