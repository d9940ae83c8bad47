use std::path::PathBuf;

/// Convenience result type used across asciireel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by library APIs.
///
/// Everything raised during warm-up is fatal to the process. Session code only sees
/// [`ReelError::Connection`] and [`ReelError::Serde`]; request-level problems have their own
/// type in [`crate::RequestError`].
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid configuration or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame range that does not satisfy `0 <= from < to <= frame_count`.
    #[error("frame range [{from}, {to}) is out of bounds for {frame_count} frames")]
    OutOfRange {
        /// Requested inclusive start.
        from: i64,
        /// Requested exclusive end.
        to: i64,
        /// Number of valid frames in the store.
        frame_count: u64,
    },

    /// Another process holds the warm-up lock marker.
    #[error("lock error: marker '{}' already exists", .marker.display())]
    AlreadyLocked {
        /// Path of the lock marker that could not be created.
        marker: PathBuf,
    },

    /// The persisted cache artifact is unreadable or corrupt.
    #[error("cache error: {0}")]
    Cache(String),

    /// The frame source failed to open or decode the movie.
    #[error("decode error: {0}")]
    Decode(String),

    /// The renderer failed to configure or to render a frame.
    #[error("render error: {0}")]
    Render(String),

    /// The client connection failed while sending responses.
    #[error("connection error: {0}")]
    Connection(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem or process IO failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Cache`] value.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Build a [`ReelError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReelError::Connection`] value.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
