//! Settings module: loading configuration persistence
//!
//! Holds the runtime `LoadingConfig`, validates partial updates field by
//! field and persists the result under its own key, independent of the
//! cache manifest.

pub mod store;

pub use store::ConfigStore;
