//! Batch loader: priority-tiered, wave-bounded resource loading
//!
//! ```text
//! candidates ─► partition by tier ─► [critical] [high] [medium] [low]
//!                                        │
//!                             chunks of max_concurrent_loads
//!                                        │
//!                cache hit? ──yes──► serve payload (no physical load)
//!                   │no
//!                   ▼
//!           ResourceLoader::load ──► CacheStore::put ──► progress snapshot
//! ```

pub mod physical;
pub mod scheduler;
pub mod types;

pub use physical::{FsLoader, LoadedContent, ResourceLoader};
pub use scheduler::BatchLoader;
pub use types::{
    LoadFailure, LoadedResource, LoadingProgress, NoProgress, ProgressSink, RunOptions, RunSummary,
};
