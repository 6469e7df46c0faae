//! Physical resource loading
//!
//! The scheduler treats a load as an opaque async operation returning text
//! and a latency. Any error is handled the same way regardless of cause.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

/// Content returned by a physical load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedContent {
    pub content: String,
    pub duration_ms: u64,
}

/// Physical loader interface.
///
/// Implementations read one resource by path. Errors should be
/// [`Error::Load`] carrying the path, though the scheduler accepts any.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, path: &str) -> Result<LoadedContent>;
}

/// Reads resources as text from a directory on disk
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a `/`-separated relative path under the root
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(Error::load(path, "path must be relative to the loader root"));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ResourceLoader for FsLoader {
    async fn load(&self, path: &str) -> Result<LoadedContent> {
        let full = self.resolve(path)?;
        let started = Instant::now();
        let bytes = tokio::fs::read(&full)
            .await
            .map_err(|e| Error::load(path, e.to_string()))?;
        Ok(LoadedContent {
            content: String::from_utf8_lossy(&bytes).into_owned(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}
