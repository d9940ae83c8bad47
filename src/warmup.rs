//! One-shot warm-up: lock, then load the cached artifact or render the movie into a new one.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::cache::{self, CacheRecord, CacheStore};
use crate::config::ReelConfig;
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::{FfmpegSource, FrameSource};
use crate::render::{self, RendererFactory};

/// Frames between progress log lines while rendering.
pub const PROGRESS_EVERY: u64 = 100;

/// Inputs to a warm-up run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarmupOptions {
    /// Movie decoded on a cache miss.
    pub movie_path: PathBuf,
    /// Artifact path. The lock marker lives next to it.
    pub cache_path: PathBuf,
    /// Characters per rendered row.
    pub columns: u32,
}

/// How the store was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarmupOutcome {
    /// The artifact existed and was loaded.
    CacheHit,
    /// The movie was rendered and the artifact written.
    Rendered,
}

/// Summary of a finished warm-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarmupReport {
    /// Hit or miss.
    pub outcome: WarmupOutcome,
    /// Frames in the resulting store.
    pub frame_count: u64,
    /// Wall time spent, lock included.
    pub elapsed: Duration,
}

/// Builds the [`CacheStore`] exactly once per artifact path.
///
/// The lock is held for the whole run and released on every exit path. Any failure is fatal
/// to the run: there is no retry and no partially rendered artifact.
pub struct WarmupOrchestrator {
    source: Box<dyn FrameSource>,
    factory: Box<dyn RendererFactory>,
    opts: WarmupOptions,
}

impl WarmupOrchestrator {
    /// Wire a source and renderer factory to `opts`.
    pub fn new(
        source: Box<dyn FrameSource>,
        factory: Box<dyn RendererFactory>,
        opts: WarmupOptions,
    ) -> Self {
        Self {
            source,
            factory,
            opts,
        }
    }

    /// Orchestrator using ffmpeg decoding and the renderer described by `config`.
    pub fn from_config(config: &ReelConfig) -> Self {
        Self::new(
            Box::new(FfmpegSource::new()),
            render::factory_for(config.format, config.gzip),
            WarmupOptions {
                movie_path: config.movie_path(),
                cache_path: config.cache_path(),
                columns: config.columns,
            },
        )
    }

    /// Run warm-up to completion.
    #[tracing::instrument(skip(self), fields(cache = %self.opts.cache_path.display()))]
    pub fn run(&self) -> ReelResult<(CacheStore, WarmupReport)> {
        let started = Instant::now();
        let guard = cache::acquire(&self.opts.cache_path)?;

        let (store, outcome) = if self.opts.cache_path.try_exists()? {
            tracing::info!("cache artifact found, loading");
            (cache::load(&self.opts.cache_path)?, WarmupOutcome::CacheHit)
        } else {
            tracing::info!(movie = %self.opts.movie_path.display(), "cache miss, rendering movie");
            let record = self.render_movie()?;
            cache::write_atomic(&self.opts.cache_path, &record)?;
            (record.into_store(), WarmupOutcome::Rendered)
        };

        guard.release()?;

        let report = WarmupReport {
            outcome,
            frame_count: store.size(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            outcome = ?report.outcome,
            frame_count = report.frame_count,
            bytes = store.total_bytes(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "warm-up complete"
        );
        Ok((store, report))
    }

    fn render_movie(&self) -> ReelResult<CacheRecord> {
        let movie = self.source.open(&self.opts.movie_path)?;
        let metadata = movie.metadata;
        tracing::debug!(
            width = metadata.width,
            height = metadata.height,
            bits_per_pixel = metadata.bits_per_pixel,
            frame_count = metadata.frame_count,
            "movie opened"
        );
        let mut renderer = self.factory.configure(&metadata, self.opts.columns)?;

        let mut record = CacheRecord::with_capacity(metadata.frame_count);
        for raw in movie.frames {
            let raw = raw?;
            record.push(renderer.render(&raw)?);
            let done = record.frame_count();
            if done.is_multiple_of(PROGRESS_EVERY) {
                tracing::info!(done, hint = metadata.frame_count, "rendering");
            }
        }

        if record.frame_count() == 0 {
            return Err(ReelError::decode(format!(
                "movie '{}' produced no frames",
                self.opts.movie_path.display()
            )));
        }
        if record.frame_count() != metadata.frame_count {
            tracing::warn!(
                decoded = record.frame_count(),
                reported = metadata.frame_count,
                "decoded frame count differs from container metadata"
            );
        }
        Ok(record)
    }
}
