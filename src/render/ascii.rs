use std::fmt::Write as _;
use std::str::FromStr;

use image::{ImageBuffer, Rgb, imageops};

use crate::foundation::core::MovieMetadata;
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::ffmpeg::RGB24_BITS_PER_PIXEL;
use crate::media::source::RawFrame;
use crate::render::frame::{FrameRenderer, RenderedFrame, RendererFactory};

/// Characters from darkest to brightest.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Export format for rendered text frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// `<pre>` fragment, HTML-escaped, for the browser player.
    #[default]
    Html,
    /// Rows coloured with 24-bit ANSI foreground escapes.
    Ansi,
    /// Bare characters, one row per line.
    Text,
}

impl FromStr for TextFormat {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "ansi" => Ok(Self::Ansi),
            "text" => Ok(Self::Text),
            other => Err(ReelError::validation(format!(
                "unknown text format '{other}' (expected html, ansi or text)"
            ))),
        }
    }
}

/// Factory for luminance-ramp text renderers.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiRendererFactory {
    /// Export format of every rendered frame.
    pub format: TextFormat,
}

impl AsciiRendererFactory {
    /// Create a factory exporting `format`.
    pub fn new(format: TextFormat) -> Self {
        Self { format }
    }
}

impl RendererFactory for AsciiRendererFactory {
    fn configure(
        &self,
        metadata: &MovieMetadata,
        columns: u32,
    ) -> ReelResult<Box<dyn FrameRenderer>> {
        Ok(Box::new(AsciiRenderer::new(metadata, columns, self.format)?))
    }
}

/// Downsamples RGB24 frames to a character grid and maps luminance onto [`RAMP`].
#[derive(Clone, Debug)]
pub struct AsciiRenderer {
    width: u32,
    height: u32,
    columns: u32,
    lines: u32,
    format: TextFormat,
}

impl AsciiRenderer {
    /// Configure a renderer for `metadata`.
    ///
    /// Character cells are about twice as tall as wide, so the grid gets half as many lines as
    /// the aspect ratio alone would suggest.
    pub fn new(metadata: &MovieMetadata, columns: u32, format: TextFormat) -> ReelResult<Self> {
        if columns == 0 {
            return Err(ReelError::render("renderer columns must be non-zero"));
        }
        if metadata.width == 0 || metadata.height == 0 {
            return Err(ReelError::render(format!(
                "cannot render a {}x{} movie",
                metadata.width, metadata.height
            )));
        }
        if metadata.bits_per_pixel != RGB24_BITS_PER_PIXEL {
            return Err(ReelError::render(format!(
                "renderer expects {RGB24_BITS_PER_PIXEL} bits per pixel, got {}",
                metadata.bits_per_pixel
            )));
        }

        let lines = (u64::from(columns) * u64::from(metadata.height)
            / u64::from(metadata.width)
            / 2)
        .clamp(1, u64::from(u32::MAX)) as u32;

        Ok(Self {
            width: metadata.width,
            height: metadata.height,
            columns,
            lines,
            format,
        })
    }

    /// Grid size as `(columns, lines)`.
    pub fn grid(&self) -> (u32, u32) {
        (self.columns, self.lines)
    }

    fn export(&self, grid: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> String {
        let cells = (self.columns as usize + 1) * self.lines as usize;
        let mut out = String::with_capacity(cells + 64);
        match self.format {
            TextFormat::Html => {
                out.push_str("<pre class=\"asciireel-frame\">");
                for (y, row) in grid.rows().enumerate() {
                    if y > 0 {
                        out.push('\n');
                    }
                    for px in row {
                        push_html_escaped(&mut out, glyph(luminance(*px)));
                    }
                }
                out.push_str("</pre>");
            }
            TextFormat::Ansi => {
                for row in grid.rows() {
                    let mut last: Option<Rgb<u8>> = None;
                    for px in row {
                        if last != Some(*px) {
                            let _ = write!(out, "\x1b[38;2;{};{};{}m", px[0], px[1], px[2]);
                            last = Some(*px);
                        }
                        out.push(glyph(luminance(*px)));
                    }
                    out.push_str("\x1b[0m\n");
                }
            }
            TextFormat::Text => {
                for row in grid.rows() {
                    for px in row {
                        out.push(glyph(luminance(*px)));
                    }
                    out.push('\n');
                }
            }
        }
        out
    }
}

impl FrameRenderer for AsciiRenderer {
    fn render(&mut self, frame: &RawFrame) -> ReelResult<RenderedFrame> {
        let expected = self.width as usize * self.height as usize * 3;
        if frame.data.len() != expected {
            return Err(ReelError::render(format!(
                "frame buffer has {} bytes, expected {expected} for {}x{} rgb24",
                frame.data.len(),
                self.width,
                self.height
            )));
        }
        let view: ImageBuffer<Rgb<u8>, &[u8]> =
            ImageBuffer::from_raw(self.width, self.height, frame.data.as_slice())
                .ok_or_else(|| ReelError::render("frame buffer does not fit its dimensions"))?;

        let grid = imageops::resize(
            &view,
            self.columns,
            self.lines,
            imageops::FilterType::Triangle,
        );
        Ok(RenderedFrame::from(self.export(&grid)))
    }
}

/// Rec. 709 luma in fixed point.
fn luminance(px: Rgb<u8>) -> u8 {
    let r = u32::from(px[0]);
    let g = u32::from(px[1]);
    let b = u32::from(px[2]);
    ((2126 * r + 7152 * g + 722 * b + 5000) / 10_000) as u8
}

fn glyph(luma: u8) -> char {
    let idx = (usize::from(luma) * (RAMP.len() - 1) + 127) / 255;
    RAMP[idx] as char
}

fn push_html_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        c => out.push(c),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/ascii.rs"]
mod tests;
