//! Resource enumeration
//!
//! A [`ResourceEnumerator`] lists the candidate namespace for a discovery
//! pass. The whole candidate set is held in memory; enumerators are expected
//! to return hundreds of entries, not millions.

use crate::error::{Error, Result};
use crate::resource::EnumeratedResource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Directories never descended into
const SKIP_DIRS: &[&str] = &[".git", ".hg", ".svn", "node_modules", "target"];

/// Default cap on enumerated files
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Source of candidate resources
#[async_trait]
pub trait ResourceEnumerator: Send + Sync {
    async fn enumerate(&self) -> Result<Vec<EnumeratedResource>>;
}

/// Enumerator returning a fixed list
#[derive(Debug, Clone, Default)]
pub struct StaticEnumerator {
    resources: Vec<EnumeratedResource>,
}

impl StaticEnumerator {
    pub fn new(resources: Vec<EnumeratedResource>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl ResourceEnumerator for StaticEnumerator {
    async fn enumerate(&self) -> Result<Vec<EnumeratedResource>> {
        Ok(self.resources.clone())
    }
}

/// Walks a directory tree and reports regular files relative to its root.
///
/// Paths always use `/` separators. VCS and build output directories are
/// pruned, and the walk stops after `max_entries` files.
#[derive(Debug, Clone)]
pub struct FsEnumerator {
    root: PathBuf,
    max_entries: usize,
}

impl FsEnumerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Set the file cap
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ResourceEnumerator for FsEnumerator {
    async fn enumerate(&self) -> Result<Vec<EnumeratedResource>> {
        if !self.root.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", self.root.display()),
            )));
        }

        let root = self.root.clone();
        let max_entries = self.max_entries;
        let resources = tokio::task::spawn_blocking(move || walk(&root, max_entries))
            .await
            .map_err(|e| Error::Internal(format!("Enumeration task failed: {}", e)))?;

        tracing::debug!(
            root = %self.root.display(),
            count = resources.len(),
            "Enumerated resources"
        );
        Ok(resources)
    }
}

fn walk(root: &Path, max_entries: usize) -> Vec<EnumeratedResource> {
    let walker = walkdir::WalkDir::new(root).into_iter().filter_entry(|e| {
        !(e.depth() > 0
            && e.file_type().is_dir()
            && SKIP_DIRS.contains(&e.file_name().to_string_lossy().as_ref()))
    });

    let mut resources = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };

        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        resources.push(EnumeratedResource {
            path: to_slash(rel),
            size_bytes: metadata.len(),
            last_modified,
            dependencies: Default::default(),
        });

        if resources.len() >= max_entries {
            tracing::warn!(max_entries, "Enumeration cap reached, remaining files skipped");
            break;
        }
    }
    resources
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
