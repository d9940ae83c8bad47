//! Text renderers: raw pixel buffers in, text frames out.

/// Luminance-ramp text renderer.
pub mod ascii;
/// Renderer contracts and the rendered frame type.
pub mod frame;
/// Gzip decorator for rendered payloads.
pub mod gzip;

pub use ascii::{AsciiRenderer, AsciiRendererFactory, TextFormat};
pub use frame::{FrameRenderer, RenderedFrame, RendererFactory};
pub use gzip::GzipRendererFactory;

/// Build the renderer factory described by `format` and `gzip`.
pub fn factory_for(format: TextFormat, gzip: bool) -> Box<dyn RendererFactory> {
    let ascii = AsciiRendererFactory::new(format);
    if gzip {
        Box::new(GzipRendererFactory::new(ascii))
    } else {
        Box::new(ascii)
    }
}
