use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::RenderedFrame;

/// Rendered frames in playback order plus the number of valid entries.
///
/// Only the first `frame_count` entries are valid. The record is appended to during warm-up and
/// frozen into a [`CacheStore`] afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheRecord {
    frames: Vec<RenderedFrame>,
    frame_count: u64,
}

impl CacheRecord {
    /// Create an empty record, reserving room for `capacity_hint` frames.
    pub fn with_capacity(capacity_hint: u64) -> Self {
        // The hint comes from container metadata; cap the up-front allocation.
        let reserve = usize::try_from(capacity_hint.min(1 << 20)).unwrap_or(0);
        Self {
            frames: Vec::with_capacity(reserve),
            frame_count: 0,
        }
    }

    /// Rebuild a record from decoded parts.
    pub(crate) fn from_parts(frames: Vec<RenderedFrame>, frame_count: u64) -> ReelResult<Self> {
        if (frames.len() as u64) < frame_count {
            return Err(ReelError::cache(format!(
                "record claims {frame_count} frames but holds {}",
                frames.len()
            )));
        }
        Ok(Self {
            frames,
            frame_count,
        })
    }

    /// Append the next frame in playback order.
    pub fn push(&mut self, frame: RenderedFrame) {
        let next = self.frame_count as usize;
        if next < self.frames.len() {
            self.frames[next] = frame;
        } else {
            self.frames.push(frame);
        }
        self.frame_count += 1;
    }

    /// Number of valid frames.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The valid frames, in playback order.
    pub fn frames(&self) -> &[RenderedFrame] {
        &self.frames[..self.frame_count as usize]
    }

    /// Freeze the record. Unused capacity is dropped.
    pub fn into_store(mut self) -> CacheStore {
        self.frames.truncate(self.frame_count as usize);
        self.frames.shrink_to_fit();
        CacheStore { record: self }
    }
}

/// Read-only frame store shared by every session once warm-up completes.
///
/// There is no mutating API: concurrent reads need no locking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStore {
    record: CacheRecord,
}

impl CacheStore {
    /// Frames `[from, to)`, or [`ReelError::OutOfRange`] unless `0 <= from < to <= size()`.
    pub fn get(&self, from: i64, to: i64) -> ReelResult<&[RenderedFrame]> {
        let range = FrameRange::bounded(from, to, self.size())?;
        let (start, end) = (range.start.0 as usize, range.end.0 as usize);
        self.record
            .frames()
            .get(start..end)
            .ok_or(ReelError::OutOfRange {
                from,
                to,
                frame_count: self.size(),
            })
    }

    /// A single frame.
    pub fn frame(&self, idx: FrameIndex) -> Option<&RenderedFrame> {
        self.record.frames().get(idx.0 as usize)
    }

    /// Number of frames.
    pub fn size(&self) -> u64 {
        self.record.frame_count()
    }

    /// Total payload bytes across all frames.
    pub fn total_bytes(&self) -> u64 {
        self.record.frames().iter().map(|f| f.len() as u64).sum()
    }

    /// Borrow the frozen record (for persistence).
    pub fn record(&self) -> &CacheRecord {
        &self.record
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
