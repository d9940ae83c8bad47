use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::cache::store::{CacheRecord, CacheStore};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::RenderedFrame;

/// Leading bytes of every cache artifact.
pub const MAGIC: [u8; 4] = *b"AREL";

/// Artifact layout version. Bumped whenever the layout changes.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2 + 8;
const CHECKSUM_LEN: usize = 8;

/// Serialize `record` into the artifact layout:
///
/// ```text
/// magic "AREL" | version u16 BE | frame_count u64 BE
/// frame_count * (len u32 BE | payload)
/// xxh3-64 of everything above, u64 BE
/// ```
pub fn encode_record(record: &CacheRecord) -> ReelResult<Vec<u8>> {
    let frames = record.frames();
    let payload: usize = frames.iter().map(|f| 4 + f.len()).sum();
    let mut out = Vec::with_capacity(HEADER_LEN + payload + CHECKSUM_LEN);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
    out.extend_from_slice(&record.frame_count().to_be_bytes());
    for (idx, frame) in frames.iter().enumerate() {
        let len = u32::try_from(frame.len()).map_err(|_| {
            ReelError::cache(format!(
                "frame {idx} is {} bytes, larger than the artifact allows",
                frame.len()
            ))
        })?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(frame.as_bytes());
    }
    let checksum = xxhash_rust::xxh3::xxh3_64(&out);
    out.extend_from_slice(&checksum.to_be_bytes());
    Ok(out)
}

/// Parse an artifact produced by [`encode_record`].
///
/// Every structural problem is a [`ReelError::Cache`]: wrong magic or version, truncation,
/// trailing bytes, or a checksum mismatch.
pub fn decode_record(bytes: &[u8]) -> ReelResult<CacheRecord> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(ReelError::cache(format!(
            "artifact is {} bytes, too short for a header",
            bytes.len()
        )));
    }
    let (body, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let stored = u64::from_be_bytes(array_at(trailer, 0)?);
    let actual = xxhash_rust::xxh3::xxh3_64(body);
    if stored != actual {
        return Err(ReelError::cache(format!(
            "checksum mismatch (stored {stored:016x}, computed {actual:016x})"
        )));
    }

    if body[..MAGIC.len()] != MAGIC {
        return Err(ReelError::cache("artifact magic mismatch"));
    }
    let version = u16::from_be_bytes(array_at(body, MAGIC.len())?);
    if version != FORMAT_VERSION {
        return Err(ReelError::cache(format!(
            "unsupported artifact version {version} (expected {FORMAT_VERSION})"
        )));
    }
    let frame_count = u64::from_be_bytes(array_at(body, MAGIC.len() + 2)?);

    let mut cursor = HEADER_LEN;
    let mut frames = Vec::new();
    for idx in 0..frame_count {
        let len = u32::from_be_bytes(
            array_at(body, cursor)
                .map_err(|_| ReelError::cache(format!("artifact truncated at frame {idx}")))?,
        ) as usize;
        cursor += 4;
        let end = cursor
            .checked_add(len)
            .filter(|end| *end <= body.len())
            .ok_or_else(|| ReelError::cache(format!("artifact truncated in frame {idx}")))?;
        frames.push(RenderedFrame::new(&body[cursor..end]));
        cursor = end;
    }
    if cursor != body.len() {
        return Err(ReelError::cache(format!(
            "{} trailing bytes after frame {frame_count}",
            body.len() - cursor
        )));
    }
    CacheRecord::from_parts(frames, frame_count)
}

fn array_at<const N: usize>(bytes: &[u8], at: usize) -> ReelResult<[u8; N]> {
    bytes
        .get(at..at + N)
        .and_then(|s| <[u8; N]>::try_from(s).ok())
        .ok_or_else(|| ReelError::cache("artifact truncated"))
}

/// Sibling path the artifact is staged at before the rename.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `record` to `path` so that readers only ever see a complete artifact.
///
/// The bytes go to `<path>.tmp`, are synced, and the file is renamed over `path`. The
/// temporary file is removed if any step fails.
#[tracing::instrument(skip(record), fields(frames = record.frame_count()))]
pub fn write_atomic(path: &Path, record: &CacheRecord) -> ReelResult<()> {
    let bytes = encode_record(record)?;
    let tmp = tmp_path(path);
    let mut guard = TempFileGuard(Some(tmp.clone()));

    let mut file = File::create(&tmp)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp, path)?;
    guard.0 = None;

    tracing::debug!(bytes = bytes.len(), path = %path.display(), "cache artifact written");
    Ok(())
}

/// Load and validate the artifact at `path`.
#[tracing::instrument]
pub fn load(path: &Path) -> ReelResult<CacheStore> {
    let bytes = fs::read(path).map_err(|e| {
        ReelError::cache(format!("read artifact '{}': {e}", path.display()))
    })?;
    let record = decode_record(&bytes)?;
    tracing::debug!(frames = record.frame_count(), bytes = bytes.len(), "cache artifact loaded");
    Ok(record.into_store())
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/persist.rs"]
mod tests;
