use std::path::Path;

use crate::foundation::core::MovieMetadata;
use crate::foundation::error::ReelResult;

/// One decoded frame as a packed pixel buffer.
///
/// Dimensions are implicit and come from the [`MovieMetadata`] the buffer was decoded with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    /// Packed pixels, row-major, `bits_per_pixel / 8` bytes each.
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Wrap a packed pixel buffer.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// Ordered, finite, single-pass sequence of decoded frames.
pub type RawFrames = Box<dyn Iterator<Item = ReelResult<RawFrame>> + Send>;

/// A movie opened for decoding: metadata plus its frame stream.
pub struct OpenedMovie {
    /// Properties reported by the source before decoding starts.
    pub metadata: MovieMetadata,
    /// Frames in playback order. Consuming the iterator consumes the movie.
    pub frames: RawFrames,
}

impl std::fmt::Debug for OpenedMovie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedMovie")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Source contract used by warm-up.
///
/// `open` fails with [`crate::ReelError::Decode`] when the movie cannot be opened; the frame
/// iterator yields the same error kind for mid-stream decode failures.
pub trait FrameSource: Send {
    /// Open `path` and return its metadata and frame stream.
    fn open(&self, path: &Path) -> ReelResult<OpenedMovie>;
}
