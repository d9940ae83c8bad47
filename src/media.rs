//! Frame sources: where raw pixel buffers come from.
//!
//! The warm-up pipeline only sees the [`FrameSource`] trait. The shipped implementation shells
//! out to `ffprobe`/`ffmpeg`.

/// `ffmpeg`-backed frame source.
pub mod ffmpeg;
/// Frame source contract and raw frame type.
pub mod source;

pub use ffmpeg::{FfmpegSource, is_ffmpeg_on_path};
pub use source::{FrameSource, OpenedMovie, RawFrame, RawFrames};
