//! Process configuration: an optional JSON file, overridden by CLI flags.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};
use crate::render::TextFormat;

/// Runtime configuration for warm-up and serving.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReelConfig {
    /// Directory holding the movie and its cache artifact.
    pub resources_path: PathBuf,
    /// Movie file name inside `resources_path`.
    pub movie: String,
    /// Static asset directory served at `/`, if any.
    pub public_path: Option<PathBuf>,
    /// Listen address for the HTTP server.
    pub listen: SocketAddr,
    /// Characters per rendered row.
    pub columns: u32,
    /// Export format of rendered frames.
    pub format: TextFormat,
    /// Gzip rendered frames before caching.
    pub gzip: bool,
    /// Per-session request queue bound.
    pub queue_capacity: usize,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            resources_path: PathBuf::from("resources"),
            movie: "demo.m4v".to_owned(),
            public_path: None,
            listen: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080)),
            columns: 120,
            format: TextFormat::Html,
            gzip: true,
            queue_capacity: 10,
        }
    }
}

impl ReelConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReelError::validation(format!("read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_str(&text).map_err(|e| {
            ReelError::serde(format!("parse config '{}': {e}", path.display()))
        })?;
        Ok(cfg)
    }

    /// `resources_path/movie`.
    pub fn movie_path(&self) -> PathBuf {
        self.resources_path.join(&self.movie)
    }

    /// `resources_path/movie.cache`.
    pub fn cache_path(&self) -> PathBuf {
        self.resources_path.join(format!("{}.cache", self.movie))
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> ReelResult<()> {
        if self.movie.is_empty() {
            return Err(ReelError::validation("movie file name must not be empty"));
        }
        if self.columns == 0 {
            return Err(ReelError::validation("columns must be >= 1"));
        }
        if self.queue_capacity == 0 {
            return Err(ReelError::validation("queue_capacity must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
