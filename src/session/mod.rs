//! Session binding
//!
//! Reads the host session (phase, open resources, active features) and
//! derives the relevance filter, scoring signals and working-set size for a
//! discovery pass.

pub mod binder;
pub mod provider;

pub use binder::{BoundSession, SessionBinder};
pub use provider::{FileSessionProvider, SessionProvider, SessionSnapshot, StaticSessionProvider};
