//! Session state providers
//!
//! The host tool exposes its current session through a [`SessionProvider`].
//! "No session" is a valid answer, not an error.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Point-in-time view of the host session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub current_phase: String,
    pub open_resource_paths: Vec<String>,
    pub active_feature_tags: Vec<String>,
    pub recent_action_count: usize,
}

/// Source of session state
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session, or `None` when there is no session
    async fn snapshot(&self) -> Result<Option<SessionSnapshot>>;
}

/// Provider holding a snapshot set by the embedder
#[derive(Default)]
pub struct StaticSessionProvider {
    snapshot: RwLock<Option<SessionSnapshot>>,
}

impl StaticSessionProvider {
    pub fn new(snapshot: Option<SessionSnapshot>) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// A provider that never has a session
    pub fn none() -> Self {
        Self::default()
    }

    /// Replace the current snapshot
    pub async fn set(&self, snapshot: Option<SessionSnapshot>) {
        *self.snapshot.write().await = snapshot;
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn snapshot(&self) -> Result<Option<SessionSnapshot>> {
        Ok(self.snapshot.read().await.clone())
    }
}

/// Provider reading a JSON snapshot file on every query.
///
/// A missing file means no session; an unreadable or malformed file is an
/// error.
pub struct FileSessionProvider {
    path: PathBuf,
}

impl FileSessionProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionProvider for FileSessionProvider {
    async fn snapshot(&self) -> Result<Option<SessionSnapshot>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&data).map(Some).map_err(|e| {
            Error::Session(format!("Invalid session file {}: {}", self.path.display(), e))
        })
    }
}
