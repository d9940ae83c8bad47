use crate::foundation::error::{ReelError, ReelResult};

/// Absolute 0-based frame index in playback order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameIndex(pub u64);

/// Non-empty half-open frame range `[start, end)` in playback order.
///
/// Built by [`FrameRange::bounded`], which checks it against a store size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Validate client-supplied signed bounds against `frame_count`.
    ///
    /// Accepts exactly `0 <= from < to <= frame_count`; empty ranges are rejected.
    pub fn bounded(from: i64, to: i64, frame_count: u64) -> ReelResult<Self> {
        let out_of_range = || ReelError::OutOfRange {
            from,
            to,
            frame_count,
        };
        let start = u64::try_from(from).map_err(|_| out_of_range())?;
        let end = u64::try_from(to).map_err(|_| out_of_range())?;
        if start >= end || end > frame_count {
            return Err(out_of_range());
        }
        Ok(Self {
            start: FrameIndex(start),
            end: FrameIndex(end),
        })
    }
}

/// Movie properties reported once by a frame source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovieMetadata {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bits per packed pixel (24 for RGB24).
    pub bits_per_pixel: u16,
    /// Frame count as reported by the container. Only a capacity hint.
    pub frame_count: u64,
}

impl MovieMetadata {
    /// Bytes in one tightly packed frame buffer.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * (self.bits_per_pixel as usize / 8)
    }

    /// Reject metadata that cannot describe a decodable frame.
    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation(format!(
                "movie dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.bits_per_pixel == 0 || !self.bits_per_pixel.is_multiple_of(8) {
            return Err(ReelError::validation(format!(
                "bits per pixel must be a non-zero multiple of 8, got {}",
                self.bits_per_pixel
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
