use std::sync::Arc;

use crate::foundation::core::MovieMetadata;
use crate::foundation::error::ReelResult;
use crate::media::source::RawFrame;

/// Text payload for one video frame (HTML fragment, ANSI text, or a gzip of either).
///
/// Immutable once produced. Cloning shares the underlying bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderedFrame {
    bytes: Arc<[u8]>,
}

impl RenderedFrame {
    /// Wrap an already rendered payload.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Borrow the payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Return `true` for an empty payload.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<String> for RenderedFrame {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&str> for RenderedFrame {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

/// A configured renderer turning raw frames into text frames.
pub trait FrameRenderer: Send {
    /// Render one frame. Any failure aborts warm-up.
    fn render(&mut self, frame: &RawFrame) -> ReelResult<RenderedFrame>;
}

/// Builds a [`FrameRenderer`] for a specific movie.
pub trait RendererFactory: Send {
    /// Configure a renderer for `metadata`, producing `columns` characters per row.
    fn configure(
        &self,
        metadata: &MovieMetadata,
        columns: u32,
    ) -> ReelResult<Box<dyn FrameRenderer>>;
}
