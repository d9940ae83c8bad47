use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::{debug, warn};

use crate::foundation::core::MovieMetadata;
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::source::{FrameSource, OpenedMovie, RawFrame};

/// Packed RGB24: the only pixel layout the decoder emits.
pub const RGB24_BITS_PER_PIXEL: u16 = 24;

/// Frame source that probes with `ffprobe` and streams raw RGB24 frames out of `ffmpeg`.
///
/// Both tools must be on `PATH`. The decoder runs as a child process for the lifetime of the
/// returned frame iterator.
#[derive(Clone, Debug, Default)]
pub struct FfmpegSource {
    _priv: (),
}

impl FfmpegSource {
    /// Create a new source.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for FfmpegSource {
    fn open(&self, path: &Path) -> ReelResult<OpenedMovie> {
        if !path.is_file() {
            return Err(ReelError::decode(format!(
                "movie '{}' does not exist or is not a file",
                path.display()
            )));
        }
        let metadata = probe_movie(path)?;
        let frames = FfmpegFrames::spawn(path, metadata.frame_len())?;
        Ok(OpenedMovie {
            metadata,
            frames: Box::new(frames),
        })
    }
}

/// Probe the first video stream of `path` through `ffprobe`.
pub fn probe_movie(path: &Path) -> ReelResult<MovieMetadata> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        width: Option<u32>,
        height: Option<u32>,
        nb_frames: Option<String>,
        nb_read_packets: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-show_entries",
            "stream=width,height,nb_frames,nb_read_packets",
            "-print_format",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::decode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::decode(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| ReelError::decode("no video stream found"))?;
    let width = stream
        .width
        .ok_or_else(|| ReelError::decode("missing video width from ffprobe"))?;
    let height = stream
        .height
        .ok_or_else(|| ReelError::decode("missing video height from ffprobe"))?;

    // `nb_frames` is "N/A" for many containers; the packet count is the fallback.
    let parse_count = |v: &Option<String>| v.as_deref().and_then(|s| s.parse::<u64>().ok());
    let frame_count = parse_count(&stream.nb_frames)
        .or_else(|| parse_count(&stream.nb_read_packets))
        .unwrap_or(0);

    let metadata = MovieMetadata {
        width,
        height,
        bits_per_pixel: RGB24_BITS_PER_PIXEL,
        frame_count,
    };
    metadata
        .validate()
        .map_err(|e| ReelError::decode(e.to_string()))?;
    debug!(
        path = %path.display(),
        width,
        height,
        frame_count,
        "probed movie"
    );
    Ok(metadata)
}

/// Streaming RGB24 decoder backed by an `ffmpeg` child process.
struct FfmpegFrames {
    path: PathBuf,
    frame_len: usize,
    decoded: u64,

    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegFrames {
    fn spawn(path: &Path, frame_len: usize) -> ReelResult<Self> {
        if frame_len == 0 {
            return Err(ReelError::decode(
                "decoded frame size is zero (invalid source dimensions)",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args([
                "-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelError::decode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::decode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::decode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        Ok(Self {
            path: path.to_path_buf(),
            frame_len,
            decoded: 0,
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
        })
    }

    /// Reap the child after a clean end of stream and surface a non-zero exit.
    fn finish(&mut self) -> ReelResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let status = child
            .wait()
            .map_err(|e| ReelError::decode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::decode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::decode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            return Err(ReelError::decode(format!(
                "ffmpeg exited with status {} while decoding '{}': {}",
                status,
                self.path.display(),
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        debug!(path = %self.path.display(), frames = self.decoded, "decoder finished");
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!(path = %self.path.display(), %e, "failed to kill ffmpeg");
            }
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

impl Iterator for FfmpegFrames {
    type Item = ReelResult<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let stdout = self.stdout.as_mut()?;
        let mut buf = vec![0u8; self.frame_len];
        match read_frame(stdout, &mut buf) {
            Ok(true) => {
                self.decoded += 1;
                Some(Ok(RawFrame::new(buf)))
            }
            Ok(false) => self.finish().err().map(Err),
            Err(e) => {
                self.abort();
                Some(Err(e))
            }
        }
    }
}

impl Drop for FfmpegFrames {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Fill `buf` with exactly one frame.
///
/// Returns `Ok(false)` on a clean end of stream at a frame boundary.
fn read_frame(reader: &mut impl Read, buf: &mut [u8]) -> ReelResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(ReelError::decode(format!(
                    "truncated frame from decoder: got {filled} of {} bytes",
                    buf.len()
                )));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ReelError::decode(format!(
                    "failed to read frame from decoder: {e}"
                )));
            }
        }
    }
    Ok(true)
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}
