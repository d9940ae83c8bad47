/// Frame addressing and movie metadata.
pub mod core;
/// Error taxonomy.
pub mod error;
