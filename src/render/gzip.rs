use std::io::Write as _;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::foundation::core::MovieMetadata;
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::source::RawFrame;
use crate::render::frame::{FrameRenderer, RenderedFrame, RendererFactory};

/// Wraps another factory so every rendered payload is gzipped before it is cached.
///
/// Clients inflate frames after base64-decoding them.
#[derive(Clone, Debug, Default)]
pub struct GzipRendererFactory<F> {
    inner: F,
}

impl<F: RendererFactory> GzipRendererFactory<F> {
    /// Wrap `inner`.
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<F: RendererFactory> RendererFactory for GzipRendererFactory<F> {
    fn configure(
        &self,
        metadata: &MovieMetadata,
        columns: u32,
    ) -> ReelResult<Box<dyn FrameRenderer>> {
        let inner = self.inner.configure(metadata, columns)?;
        Ok(Box::new(GzipRenderer { inner }))
    }
}

struct GzipRenderer {
    inner: Box<dyn FrameRenderer>,
}

impl FrameRenderer for GzipRenderer {
    fn render(&mut self, frame: &RawFrame) -> ReelResult<RenderedFrame> {
        let plain = self.inner.render(frame)?;
        gzip_bytes(plain.as_bytes()).map(RenderedFrame::new)
    }
}

/// Gzip `bytes` with fast compression.
pub fn gzip_bytes(bytes: &[u8]) -> ReelResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 4), Compression::fast());
    encoder
        .write_all(bytes)
        .and_then(|_| encoder.finish())
        .map_err(|e| ReelError::render(format!("gzip frame payload: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/gzip.rs"]
mod tests;
