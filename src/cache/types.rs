//! Cache manifest data types
//!
//! The manifest is persisted as a single JSON record:
//!
//! ```json
//! {
//!   "entries": [["src/types/user.ts", { "descriptor": {..}, "payload": "..", .. }]],
//!   "metadata": { "lastUpdate": "..", "totalSizeBytes": 120, .. },
//!   "performance": { "averageLoadTimeMs": 4.5, "cacheHitRatePct": 50.0, "totalLoadTimeMs": 9 }
//! }
//! ```

use crate::resource::ResourceDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cached record for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Last-seen descriptor
    pub descriptor: ResourceDescriptor,
    /// Loaded content; absent until the first successful load
    #[serde(default)]
    pub payload: Option<String>,
    /// Time of the last successful load
    #[serde(default)]
    pub loaded_at: Option<DateTime<Utc>>,
    /// Last observed load latency
    #[serde(default)]
    pub load_duration_ms: u64,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_count: u64,
}

impl CacheEntry {
    /// Entry for a successful physical load
    pub fn loaded(
        descriptor: ResourceDescriptor,
        payload: String,
        load_duration_ms: u64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            descriptor,
            payload: Some(payload),
            loaded_at: Some(at),
            load_duration_ms,
            last_accessed: Some(at),
            access_count: 1,
        }
    }

    /// Whether this entry can serve a request without a physical load
    pub fn is_hit(&self) -> bool {
        self.payload.is_some()
    }

    /// `payload` present implies `loaded_at` present
    pub fn is_consistent(&self) -> bool {
        self.payload.is_none() || self.loaded_at.is_some()
    }
}

/// Rolling performance aggregates, recomputed each loading run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceStats {
    pub average_load_time_ms: f64,
    pub cache_hit_rate_pct: f64,
    pub total_load_time_ms: u64,
}

impl PerformanceStats {
    /// Aggregate one run.
    ///
    /// `hits` resources were served from cache out of `processed`; the
    /// physical loads took `load_times_ms` each.
    pub fn for_run(hits: usize, processed: usize, load_times_ms: &[u64]) -> Self {
        let total_load_time_ms: u64 = load_times_ms.iter().sum();
        let average_load_time_ms = if load_times_ms.is_empty() {
            0.0
        } else {
            total_load_time_ms as f64 / load_times_ms.len() as f64
        };
        Self {
            average_load_time_ms,
            cache_hit_rate_pct: hit_rate_pct(hits as u64, processed as u64),
            total_load_time_ms,
        }
    }
}

/// `hits / lookups` as a percentage, 0 when nothing was looked up
pub fn hit_rate_pct(hits: u64, lookups: u64) -> f64 {
    if lookups == 0 {
        0.0
    } else {
        hits as f64 / lookups as f64 * 100.0
    }
}

/// `hours` as a duration, or `None` when it does not fit
pub(crate) fn hours(hours: u64) -> Option<chrono::Duration> {
    i64::try_from(hours).ok().and_then(chrono::Duration::try_hours)
}

/// Process-wide cache aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct CacheManifest {
    pub entries: BTreeMap<String, CacheEntry>,
    /// Time of the last manifest write
    pub last_update: DateTime<Utc>,
    /// Sum of `descriptor.size_bytes` over all entries
    pub total_size_bytes: u64,
    pub performance: PerformanceStats,
    /// Cache hits across all runs since the cache was last cleared
    pub lifetime_hits: u64,
    /// Resources processed across all runs since the cache was last cleared
    pub lifetime_lookups: u64,
}

impl CacheManifest {
    /// An empty manifest stamped with `now`
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            entries: BTreeMap::new(),
            last_update: now,
            total_size_bytes: 0,
            performance: PerformanceStats::default(),
            lifetime_hits: 0,
            lifetime_lookups: 0,
        }
    }

    /// Recompute size aggregates from the entries
    pub fn recompute_totals(&mut self) {
        self.total_size_bytes = self.entries.values().map(|e| e.descriptor.size_bytes).sum();
    }

    /// Whether the manifest is older than `expiry_hours` at `now`.
    ///
    /// A window too large for `chrono::Duration` never expires.
    pub fn is_expired_at(&self, expiry_hours: u64, now: DateTime<Utc>) -> bool {
        match hours(expiry_hours) {
            Some(window) => now.signed_duration_since(self.last_update) > window,
            None => false,
        }
    }

    /// Number of entries holding a payload
    pub fn loaded_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_hit()).count()
    }

    pub fn to_persisted(&self) -> PersistedManifest {
        PersistedManifest {
            entries: self
                .entries
                .iter()
                .map(|(path, entry)| (path.clone(), entry.clone()))
                .collect(),
            metadata: ManifestMetadata {
                last_update: Some(self.last_update),
                total_size_bytes: self.total_size_bytes,
                entry_count: self.entries.len(),
                lifetime_hits: self.lifetime_hits,
                lifetime_lookups: self.lifetime_lookups,
            },
            performance: self.performance.clone(),
        }
    }

    /// Rebuild from the persisted form.
    ///
    /// Returns `None` when the record carries no `lastUpdate` (its age is
    /// unknown). Entries whose key disagrees with their descriptor, or that
    /// hold a payload without a load time, are dropped. Aggregates are
    /// recomputed rather than trusted.
    pub fn from_persisted(persisted: PersistedManifest) -> Option<Self> {
        let last_update = persisted.metadata.last_update?;

        let mut entries = BTreeMap::new();
        for (path, entry) in persisted.entries {
            if path != entry.descriptor.path || !entry.is_consistent() {
                tracing::warn!(path = %path, "Dropping inconsistent cache entry");
                continue;
            }
            entries.insert(path, entry);
        }

        let mut manifest = Self {
            entries,
            last_update,
            total_size_bytes: 0,
            performance: persisted.performance,
            lifetime_hits: persisted.metadata.lifetime_hits,
            lifetime_lookups: persisted.metadata.lifetime_lookups,
        };
        manifest.recompute_totals();
        Some(manifest)
    }
}

/// On-disk manifest layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedManifest {
    pub entries: Vec<(String, CacheEntry)>,
    pub metadata: ManifestMetadata,
    pub performance: PerformanceStats,
}

/// Manifest-level metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestMetadata {
    pub last_update: Option<DateTime<Utc>>,
    pub total_size_bytes: u64,
    pub entry_count: usize,
    pub lifetime_hits: u64,
    pub lifetime_lookups: u64,
}

/// Summary returned by `cache_stats`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entry_count: usize,
    pub loaded_count: usize,
    pub total_size_bytes: u64,
    pub last_update: DateTime<Utc>,
    pub expired: bool,
    pub performance: PerformanceStats,
    pub lifetime_hits: u64,
    pub lifetime_lookups: u64,
    pub lifetime_hit_rate_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, size: u64) -> CacheEntry {
        CacheEntry::loaded(
            ResourceDescriptor::new(path, size, Utc::now()),
            format!("content of {}", path),
            7,
            Utc::now(),
        )
    }

    #[test]
    fn test_loaded_entry_is_consistent() {
        let e = entry("src/a.ts", 10);
        assert!(e.is_hit());
        assert!(e.is_consistent());
        assert_eq!(e.access_count, 1);
    }

    #[test]
    fn test_payload_without_loaded_at_is_inconsistent() {
        let mut e = entry("src/a.ts", 10);
        e.loaded_at = None;
        assert!(!e.is_consistent());
    }

    #[test]
    fn test_performance_for_run() {
        let perf = PerformanceStats::for_run(1, 4, &[10, 20, 30]);
        assert_eq!(perf.total_load_time_ms, 60);
        assert!((perf.average_load_time_ms - 20.0).abs() < f64::EPSILON);
        assert!((perf.cache_hit_rate_pct - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_performance_for_empty_run() {
        let perf = PerformanceStats::for_run(0, 0, &[]);
        assert_eq!(perf, PerformanceStats::default());
    }

    #[test]
    fn test_recompute_totals() {
        let mut manifest = CacheManifest::empty(Utc::now());
        manifest.entries.insert("a".to_string(), entry("a", 100));
        manifest.entries.insert("b".to_string(), entry("b", 23));
        manifest.recompute_totals();
        assert_eq!(manifest.total_size_bytes, 123);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let manifest = CacheManifest::empty(now - chrono::Duration::hours(48));
        assert!(manifest.is_expired_at(24, now));
        assert!(!manifest.is_expired_at(72, now));
    }

    #[test]
    fn test_huge_expiry_window_never_expires() {
        let now = Utc::now();
        let manifest = CacheManifest::empty(now - chrono::Duration::hours(48));
        assert!(!manifest.is_expired_at(3_000_000_000_000_000, now));
        assert!(!manifest.is_expired_at(u64::MAX, now));
    }

    #[test]
    fn test_persisted_round_trip_recomputes_aggregates() {
        let mut manifest = CacheManifest::empty(Utc::now());
        manifest.entries.insert("src/a.ts".to_string(), entry("src/a.ts", 40));
        manifest.recompute_totals();

        let mut persisted = manifest.to_persisted();
        persisted.metadata.total_size_bytes = 999_999;

        let json = serde_json::to_string(&persisted).unwrap();
        assert!(json.contains("\"entries\":[[\"src/a.ts\""));
        assert!(json.contains("\"lastUpdate\""));

        let parsed: PersistedManifest = serde_json::from_str(&json).unwrap();
        let restored = CacheManifest::from_persisted(parsed).unwrap();
        assert_eq!(restored.total_size_bytes, 40);
        assert_eq!(restored.entries.len(), 1);
    }

    #[test]
    fn test_from_persisted_without_last_update() {
        let persisted: PersistedManifest = serde_json::from_str(r#"{"entries":[]}"#).unwrap();
        assert!(CacheManifest::from_persisted(persisted).is_none());
    }

    #[test]
    fn test_from_persisted_drops_mismatched_keys() {
        let mut persisted = CacheManifest::empty(Utc::now()).to_persisted();
        persisted.entries.push(("wrong-key".to_string(), entry("src/a.ts", 1)));
        persisted.entries.push(("src/b.ts".to_string(), entry("src/b.ts", 2)));
        let restored = CacheManifest::from_persisted(persisted).unwrap();
        assert_eq!(restored.entries.len(), 1);
        assert!(restored.entries.contains_key("src/b.ts"));
    }
}
