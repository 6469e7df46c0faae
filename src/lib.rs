//! Context Prefetch - priority-driven context cache and prefetch scheduler
//!
//! Decides which resources of a project belong in the working set for the
//! current session, loads them in priority order with bounded concurrency,
//! and reuses previous loads through a persisted, expiring cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         ContextManager                           │
//! │                                                                  │
//! │  SessionProvider ──► SessionBinder ──► SmartFilter + signals     │
//! │                                              │                   │
//! │  ResourceEnumerator ──► candidates ──► filter ──► prioritize     │
//! │                                                      │           │
//! │                                     working set (tier ordered)   │
//! │                                                      │           │
//! │  ┌───────────────────────────────────────────────────▼────────┐  │
//! │  │                      BatchLoader                           │  │
//! │  │  critical ─► high ─► medium ─► low   (waves of N loads)    │  │
//! │  │        │ hit                    │ miss                     │  │
//! │  │   CacheStore ◄──── put ──── ResourceLoader                 │  │
//! │  └────────┬───────────────────────────────────────────────────┘  │
//! │           │ persist / restore                                    │
//! │  KeyValueStore  ("context-cache", "context-config")              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`filter`]: Glob-based relevance filter and phase pattern table
//! - [`priority`]: Tier classification and scoring
//! - [`cache`]: Cache manifest, persistence and expiry
//! - [`loader`]: Tiered batch loader and physical loader interface
//! - [`session`]: Session providers and the session binder
//! - [`settings`]: Persisted loading configuration
//! - [`discovery`]: Resource enumerators
//! - [`storage`]: Key-value persistence backends
//! - [`manager`]: The `ContextManager` facade

pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod loader;
pub mod manager;
pub mod priority;
pub mod resource;
pub mod session;
pub mod settings;
pub mod storage;

pub use config::{ConfigUpdate, LoadingConfig, UpdateOutcome};
pub use error::{Error, Result};
pub use manager::{ContextManager, ContextManagerBuilder};
pub use resource::{PriorityTier, ResourceCategory, ResourceDescriptor};
