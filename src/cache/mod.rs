//! Cache store: persisted manifest of loaded resources
//!
//! Entries are created on first successful load and updated on every
//! reload. They are never removed one at a time; only `invalidate_all`
//! clears them.

pub mod store;
pub mod types;

pub use store::{CacheStore, RestoreOutcome};
pub use types::{CacheEntry, CacheManifest, CacheStats, PerformanceStats};
