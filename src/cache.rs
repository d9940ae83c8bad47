//! Frame cache: the in-memory store, its on-disk artifact, and the warm-up lock.

/// Cross-process advisory lock over a cache artifact path.
pub mod lock;
/// Binary artifact codec and atomic persistence.
pub mod persist;
/// Write-once record and the read-only store built from it.
pub mod store;

pub use lock::{LockGuard, acquire, lock_path};
pub use persist::{load, write_atomic};
pub use store::{CacheRecord, CacheStore};
