//! Persisted cache store
//!
//! Owns the in-memory `CacheManifest` and mirrors it to a `KeyValueStore`
//! under [`CACHE_KEY`]. Restoring never fails: a missing, corrupt or
//! expired record leaves the store with an empty manifest.

use crate::cache::types::*;
use crate::error::{Error, Result};
use crate::storage::{KeyValueStore, CACHE_KEY};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// What `restore` found in the persistent store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A valid manifest with this many entries was loaded
    Restored(usize),
    /// Nothing was persisted
    Missing,
    /// The persisted manifest was older than the expiry window
    Expired,
    /// The persisted manifest could not be read or parsed
    Corrupt,
}

/// Cache of loaded resources keyed by path
pub struct CacheStore {
    kv: Arc<dyn KeyValueStore>,
    manifest: RwLock<CacheManifest>,
    expiry_hours: AtomicU64,
}

impl CacheStore {
    /// Create a store with an empty manifest (nothing is read)
    pub fn new(kv: Arc<dyn KeyValueStore>, expiry_hours: u64) -> Self {
        Self {
            kv,
            manifest: RwLock::new(CacheManifest::empty(Utc::now())),
            expiry_hours: AtomicU64::new(expiry_hours),
        }
    }

    /// Create a store and restore its manifest from the persistent store
    pub async fn open(kv: Arc<dyn KeyValueStore>, expiry_hours: u64) -> Self {
        let store = Self::new(kv, expiry_hours);
        store.restore().await;
        store
    }

    pub fn expiry_hours(&self) -> u64 {
        self.expiry_hours.load(Ordering::Relaxed)
    }

    /// Change the expiry window (takes effect on the next check)
    pub fn set_expiry_hours(&self, hours: u64) {
        self.expiry_hours.store(hours, Ordering::Relaxed);
    }

    /// Look up an entry. Never triggers a load.
    pub async fn get(&self, path: &str) -> Option<CacheEntry> {
        self.manifest.read().await.entries.get(path).cloned()
    }

    /// Insert or replace an entry and recompute aggregates
    pub async fn put(&self, entry: CacheEntry) {
        let mut manifest = self.manifest.write().await;
        manifest.entries.insert(entry.descriptor.path.clone(), entry);
        manifest.recompute_totals();
    }

    /// Record an access to an existing entry
    pub async fn touch(&self, path: &str) {
        let mut manifest = self.manifest.write().await;
        if let Some(entry) = manifest.entries.get_mut(path) {
            entry.last_accessed = Some(Utc::now());
            entry.access_count += 1;
        }
    }

    /// Store the aggregates of a completed loading run
    pub async fn record_run(&self, performance: PerformanceStats, hits: u64, processed: u64) {
        let mut manifest = self.manifest.write().await;
        manifest.performance = performance;
        manifest.lifetime_hits += hits;
        manifest.lifetime_lookups += processed;
    }

    /// True when the manifest is older than the expiry window
    pub async fn is_expired(&self) -> bool {
        self.manifest
            .read()
            .await
            .is_expired_at(self.expiry_hours(), Utc::now())
    }

    /// Clear every entry and aggregate, then persist the empty manifest.
    ///
    /// The in-memory manifest is cleared even when persisting fails.
    pub async fn invalidate_all(&self) -> Result<()> {
        {
            let mut manifest = self.manifest.write().await;
            let dropped = manifest.entries.len();
            *manifest = CacheManifest::empty(Utc::now());
            tracing::info!(dropped, "Cache invalidated");
        }
        self.persist().await
    }

    /// Stamp the manifest and write it to the persistent store
    pub async fn persist(&self) -> Result<()> {
        let json = {
            let mut manifest = self.manifest.write().await;
            manifest.last_update = Utc::now();
            manifest.recompute_totals();
            serde_json::to_string(&manifest.to_persisted())?
        };
        self.kv.set(CACHE_KEY, &json).await?;
        tracing::debug!(bytes = json.len(), "Cache manifest persisted");
        Ok(())
    }

    /// Replace the in-memory manifest with the persisted one.
    ///
    /// A missing record leaves a fresh empty manifest. A corrupt record
    /// does the same and logs a warning. An expired record yields an empty
    /// manifest that keeps the stale `last_update`, so `is_expired` stays
    /// true until the next persist.
    pub async fn restore(&self) -> RestoreOutcome {
        let raw = match self.kv.get(CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                *self.manifest.write().await = CacheManifest::empty(Utc::now());
                return RestoreOutcome::Missing;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cache manifest, starting empty");
                *self.manifest.write().await = CacheManifest::empty(Utc::now());
                return RestoreOutcome::Corrupt;
            }
        };

        let restored = serde_json::from_str::<PersistedManifest>(&raw)
            .map_err(|e| Error::Cache(format!("unreadable manifest: {}", e)))
            .and_then(|p| {
                CacheManifest::from_persisted(p)
                    .ok_or_else(|| Error::Cache("manifest has no lastUpdate".to_string()))
            });

        let manifest = match restored {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt cache manifest, starting empty");
                *self.manifest.write().await = CacheManifest::empty(Utc::now());
                return RestoreOutcome::Corrupt;
            }
        };

        if manifest.is_expired_at(self.expiry_hours(), Utc::now()) {
            tracing::info!(
                last_update = %manifest.last_update,
                expiry_hours = self.expiry_hours(),
                "Cache manifest expired, starting empty"
            );
            *self.manifest.write().await = CacheManifest::empty(manifest.last_update);
            return RestoreOutcome::Expired;
        }

        let count = manifest.entries.len();
        *self.manifest.write().await = manifest;
        tracing::info!(entries = count, "Cache manifest restored");
        RestoreOutcome::Restored(count)
    }

    /// Copy of the current manifest
    pub async fn snapshot(&self) -> CacheManifest {
        self.manifest.read().await.clone()
    }

    /// Aggregate statistics
    pub async fn stats(&self) -> CacheStats {
        let manifest = self.manifest.read().await;
        CacheStats {
            entry_count: manifest.entries.len(),
            loaded_count: manifest.loaded_count(),
            total_size_bytes: manifest.total_size_bytes,
            last_update: manifest.last_update,
            expired: manifest.is_expired_at(self.expiry_hours(), Utc::now()),
            performance: manifest.performance.clone(),
            lifetime_hits: manifest.lifetime_hits,
            lifetime_lookups: manifest.lifetime_lookups,
            lifetime_hit_rate_pct: hit_rate_pct(manifest.lifetime_hits, manifest.lifetime_lookups),
        }
    }

    /// Up to `limit` entries, most recently accessed first
    pub async fn recent_entries(&self, limit: usize) -> Vec<CacheEntry> {
        let manifest = self.manifest.read().await;
        let mut entries: Vec<CacheEntry> = manifest.entries.values().cloned().collect();
        entries.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        entries.truncate(limit);
        entries
    }
}
