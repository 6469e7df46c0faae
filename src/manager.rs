//! Context manager
//!
//! Wires the session binder, resource enumerator, cache store and batch
//! loader together and exposes the operations an embedding tool calls.
//! None of these operations return errors: every collaborator failure is
//! logged and degrades the feature it backs.

use crate::cache::{CacheStats, CacheStore};
use crate::config::{ConfigUpdate, LoadingConfig, UpdateOutcome};
use crate::discovery::{FsEnumerator, ResourceEnumerator};
use crate::filter::SmartFilter;
use crate::loader::{BatchLoader, FsLoader, ProgressSink, ResourceLoader, RunOptions, RunSummary};
use crate::priority::{prioritize, ScoredResource};
use crate::resource::{EnumeratedResource, ResourceDescriptor};
use crate::session::{SessionBinder, SessionProvider, StaticSessionProvider};
use crate::settings::ConfigStore;
use crate::storage::{KeyValueStore, MemoryStore};
use chrono::Utc;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Entries listed in the report's recent-access section
const REPORT_RECENT_ENTRIES: usize = 10;

/// Facade over one cache, one config and one set of collaborators
pub struct ContextManager {
    config: ConfigStore,
    cache: Arc<CacheStore>,
    binder: SessionBinder,
    enumerator: Arc<dyn ResourceEnumerator>,
    batch_loader: BatchLoader,
    batch_pause: Duration,
}

impl ContextManager {
    pub fn builder() -> ContextManagerBuilder {
        ContextManagerBuilder::new()
    }

    /// Current loading config
    pub async fn config(&self) -> LoadingConfig {
        self.config.get().await
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn session(&self) -> &SessionBinder {
        &self.binder
    }

    /// Compute the prioritized working set for the current session.
    ///
    /// Candidates are filtered, extended with the direct dependencies of
    /// included candidates, ordered by tier and score, then truncated to
    /// the session's target working-set size.
    pub async fn discover(&self) -> Vec<ScoredResource> {
        let config = self.config.get().await;
        let now = Utc::now();
        let bound = self.binder.bind(&config, now).await;

        let enumerated = match self.enumerator.enumerate().await {
            Ok(resources) => resources,
            Err(e) => {
                tracing::warn!(error = %e, "Resource enumeration failed, working set is empty");
                Vec::new()
            }
        };
        let enumerated_count = enumerated.len();

        let candidates = select(enumerated, &bound.filter);
        let recent = candidates
            .iter()
            .filter(|d| bound.filter.is_recent(d.last_modified, now))
            .count();

        let mut working_set = prioritize(candidates, &bound.signals);
        let selected = working_set.len();
        working_set.truncate(bound.target_size);

        tracing::info!(
            phase = %bound.filter.phase,
            enumerated = enumerated_count,
            selected,
            recent,
            working_set = working_set.len(),
            target_size = bound.target_size,
            "Discovery complete"
        );
        working_set
    }

    /// Discover the working set and load it in one run.
    ///
    /// A cache that expired while the manager was running is cleared
    /// first so nothing is served from it.
    pub async fn load_optimized_context(
        &self,
        sink: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> RunSummary {
        if self.cache.is_expired().await && self.cache.stats().await.entry_count > 0 {
            tracing::info!("Cache expired, clearing before load");
            if let Err(e) = self.cache.invalidate_all().await {
                tracing::warn!(error = %e, "Failed to persist cleared cache");
            }
        }

        let config = self.config.get().await;
        let candidates: Vec<ResourceDescriptor> =
            self.discover().await.into_iter().map(|s| s.descriptor).collect();

        let options = RunOptions::from_config(&config)
            .with_cancellation(cancel)
            .with_batch_pause(self.batch_pause);
        self.batch_loader.run(candidates, &options, sink).await
    }

    /// Apply a partial config update.
    ///
    /// Rejected fields keep their prior value and are listed in the
    /// outcome. A new expiry window takes effect on the cache immediately.
    pub async fn update_config(&self, update: &ConfigUpdate) -> UpdateOutcome {
        let outcome = self.config.update(update).await;
        self.cache.set_expiry_hours(outcome.config.cache_expiry_hours);
        outcome
    }

    /// Restore the default config. Returns whether it was persisted.
    pub async fn reset_config(&self) -> bool {
        let persisted = self.config.reset().await;
        self.cache
            .set_expiry_hours(self.config.get().await.cache_expiry_hours);
        persisted
    }

    /// Drop every cache entry. Returns whether the empty manifest was persisted.
    pub async fn invalidate_cache(&self) -> bool {
        match self.cache.invalidate_all().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist cleared cache");
                false
            }
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Plain-text summary of config, cache aggregates and recent entries
    pub async fn generate_report(&self) -> String {
        let config = self.config.get().await;
        let stats = self.cache.stats().await;
        let recent = self.cache.recent_entries(REPORT_RECENT_ENTRIES).await;

        let mut lines = vec![
            "Context Prefetch Report".to_string(),
            "=======================".to_string(),
            String::new(),
            "Configuration".to_string(),
            format!("  maxConcurrentLoads:  {}", config.max_concurrent_loads),
            format!("  priorityTimeoutMs:   {}", config.priority_timeout_ms),
            format!("  maxMemoryMb:         {}", config.max_memory_mb),
            format!("  cacheExpiryHours:    {}", config.cache_expiry_hours),
            format!("  progressiveLoading:  {}", config.progressive_loading),
            format!("  smartFiltering:      {}", config.smart_filtering),
            format!("  phaseAwareLoading:   {}", config.phase_aware_loading),
            String::new(),
            "Cache".to_string(),
            format!(
                "  entries:             {} ({} loaded)",
                stats.entry_count, stats.loaded_count
            ),
            format!("  totalSizeBytes:      {}", stats.total_size_bytes),
            format!("  lastUpdate:          {}", stats.last_update.to_rfc3339()),
            format!("  expired:             {}", stats.expired),
            format!(
                "  averageLoadTimeMs:   {:.1}",
                stats.performance.average_load_time_ms
            ),
            format!(
                "  lastRunHitRate:      {:.1}%",
                stats.performance.cache_hit_rate_pct
            ),
            format!(
                "  lifetimeHitRate:     {:.1}% ({}/{})",
                stats.lifetime_hit_rate_pct, stats.lifetime_hits, stats.lifetime_lookups
            ),
            String::new(),
            "Recently accessed".to_string(),
        ];

        if recent.is_empty() {
            lines.push("  (none)".to_string());
        }
        for entry in &recent {
            let accessed = entry
                .last_accessed
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            lines.push(format!(
                "  {:<8} {:>4}x  {}  {}",
                entry.descriptor.priority_tier, entry.access_count, accessed, entry.descriptor.path
            ));
        }

        lines.join("\n")
    }
}

/// Filter enumerated candidates, then pull in the direct dependencies of
/// whatever was included. Excludes still win over dependencies. Discovery
/// order is preserved.
fn select(enumerated: Vec<EnumeratedResource>, filter: &SmartFilter) -> Vec<ResourceDescriptor> {
    let descriptors: Vec<ResourceDescriptor> =
        enumerated.into_iter().map(ResourceDescriptor::from).collect();

    let included: Vec<bool> = descriptors
        .iter()
        .map(|d| filter.should_include(&d.path))
        .collect();

    let dependencies: BTreeSet<&str> = descriptors
        .iter()
        .zip(&included)
        .filter(|(_, included)| **included)
        .flat_map(|(d, _)| d.dependencies.iter().map(String::as_str))
        .collect();

    if dependencies.is_empty() {
        return descriptors
            .into_iter()
            .zip(included)
            .filter_map(|(d, keep)| keep.then_some(d))
            .collect();
    }

    let extended = filter.clone().with_dependency_paths(dependencies);
    descriptors
        .into_iter()
        .filter(|d| extended.should_include(&d.path))
        .collect()
}

/// Builder for [`ContextManager`]
pub struct ContextManagerBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    session: Option<Arc<dyn SessionProvider>>,
    enumerator: Option<Arc<dyn ResourceEnumerator>>,
    loader: Option<Arc<dyn ResourceLoader>>,
    root: PathBuf,
    batch_pause: Duration,
}

impl ContextManagerBuilder {
    /// Builder with an in-memory store, no session and the current
    /// directory as the resource root
    pub fn new() -> Self {
        Self {
            store: None,
            session: None,
            enumerator: None,
            loader: None,
            root: PathBuf::from("."),
            batch_pause: Duration::ZERO,
        }
    }

    /// Persistent store for the cache manifest and config
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn session_provider(mut self, provider: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(provider);
        self
    }

    pub fn enumerator(mut self, enumerator: Arc<dyn ResourceEnumerator>) -> Self {
        self.enumerator = Some(enumerator);
        self
    }

    pub fn loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Directory used by the default filesystem enumerator and loader
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Pause between loading batches
    pub fn batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    /// Open the config and cache stores and assemble the manager
    pub async fn build(self) -> ContextManager {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>);
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(StaticSessionProvider::none()) as Arc<dyn SessionProvider>);
        let enumerator = self.enumerator.unwrap_or_else(|| {
            Arc::new(FsEnumerator::new(self.root.clone())) as Arc<dyn ResourceEnumerator>
        });
        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(FsLoader::new(self.root.clone())) as Arc<dyn ResourceLoader>);

        let config = ConfigStore::open(store.clone()).await;
        let expiry_hours = config.get().await.cache_expiry_hours;
        let cache = Arc::new(CacheStore::open(store, expiry_hours).await);

        ContextManager {
            config,
            batch_loader: BatchLoader::new(cache.clone(), loader),
            cache,
            binder: SessionBinder::new(session),
            enumerator,
            batch_pause: self.batch_pause,
        }
    }
}

impl Default for ContextManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, CacheManifest};
    use crate::discovery::StaticEnumerator;
    use crate::error::{Error, Result};
    use crate::loader::{LoadedContent, LoadingProgress, NoProgress};
    use crate::resource::PriorityTier;
    use crate::session::SessionSnapshot;
    use crate::storage::{CACHE_KEY, CONFIG_KEY};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResourceLoader for CountingLoader {
        async fn load(&self, path: &str) -> Result<LoadedContent> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LoadedContent {
                content: format!("content of {}", path),
                duration_ms: 3,
            })
        }
    }

    struct FailingEnumerator;

    #[async_trait]
    impl ResourceEnumerator for FailingEnumerator {
        async fn enumerate(&self) -> Result<Vec<EnumeratedResource>> {
            Err(Error::Internal("namespace unavailable".to_string()))
        }
    }

    fn resource(path: &str) -> EnumeratedResource {
        EnumeratedResource {
            path: path.to_string(),
            size_bytes: 500,
            last_modified: Utc::now() - chrono::Duration::days(30),
            dependencies: BTreeSet::new(),
        }
    }

    fn project() -> Vec<EnumeratedResource> {
        vec![
            resource("src/utils/format.ts"),
            resource("src/routes/users.ts"),
            resource("src/components/Button.tsx"),
            resource("node_modules/react/index.js"),
            resource("src/types/user.ts"),
        ]
    }

    async fn manager(
        kv: Arc<dyn KeyValueStore>,
        resources: Vec<EnumeratedResource>,
        loader: Arc<CountingLoader>,
    ) -> ContextManager {
        ContextManager::builder()
            .store(kv)
            .enumerator(Arc::new(StaticEnumerator::new(resources)))
            .loader(loader)
            .build()
            .await
    }

    fn paths(working_set: &[ScoredResource]) -> Vec<&str> {
        working_set.iter().map(|s| s.descriptor.path.as_str()).collect()
    }

    #[tokio::test]
    async fn test_discover_filters_and_orders() {
        let m = manager(
            Arc::new(MemoryStore::new()),
            project(),
            Arc::new(CountingLoader::default()),
        )
        .await;

        let working_set = m.discover().await;
        assert_eq!(
            paths(&working_set),
            vec![
                "src/types/user.ts",
                "src/components/Button.tsx",
                "src/routes/users.ts",
                "src/utils/format.ts",
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_pulls_in_direct_dependencies() {
        let mut resources = project();
        resources[1].dependencies.insert("scripts/gen-routes.sh".to_string());
        resources.push(resource("scripts/gen-routes.sh"));
        resources.push(resource("scripts/unrelated.sh"));

        let m = manager(
            Arc::new(MemoryStore::new()),
            resources,
            Arc::new(CountingLoader::default()),
        )
        .await;

        let working_set = m.discover().await;
        let paths = paths(&working_set);
        assert!(paths.contains(&"scripts/gen-routes.sh"));
        assert!(!paths.contains(&"scripts/unrelated.sh"));
    }

    #[tokio::test]
    async fn test_discover_truncates_to_working_set_size() {
        let resources: Vec<EnumeratedResource> = (0..80)
            .map(|i| resource(&format!("src/utils/f{}.ts", i)))
            .collect();
        let m = manager(
            Arc::new(MemoryStore::new()),
            resources,
            Arc::new(CountingLoader::default()),
        )
        .await;

        assert_eq!(m.discover().await.len(), 50);
    }

    #[tokio::test]
    async fn test_discover_uses_session_phase_and_signals() {
        let session = SessionSnapshot {
            current_phase: "testing".to_string(),
            open_resource_paths: vec!["src/utils/format.ts".to_string()],
            active_feature_tags: vec![],
            recent_action_count: 0,
        };
        let mut resources = project();
        resources.push(resource("src/utils/parse.ts"));
        resources.push(resource("tests/users.test.ts"));

        let m = ContextManager::builder()
            .enumerator(Arc::new(StaticEnumerator::new(resources)))
            .loader(Arc::new(CountingLoader::default()))
            .session_provider(Arc::new(StaticSessionProvider::new(Some(session))))
            .build()
            .await;

        let working_set = m.discover().await;
        let paths = paths(&working_set);
        assert!(paths.contains(&"tests/users.test.ts"));

        let open = paths.iter().position(|p| *p == "src/utils/format.ts").unwrap();
        let other = paths.iter().position(|p| *p == "src/utils/parse.ts").unwrap();
        assert!(open < other);
    }

    #[tokio::test]
    async fn test_discover_survives_enumeration_failure() {
        let m = ContextManager::builder()
            .enumerator(Arc::new(FailingEnumerator))
            .loader(Arc::new(CountingLoader::default()))
            .build()
            .await;
        assert!(m.discover().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_then_reload_is_served_from_cache() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::default());
        let m = manager(kv, project(), loader.clone()).await;

        let first = m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        assert_eq!(first.progress.total, 4);
        assert_eq!(first.progress.loaded, 4);
        assert_eq!(first.progress.cache_hits, 0);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 4);

        let second = m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        assert_eq!(second.progress.cache_hits, 4);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 4);
        assert_eq!(second.performance.cache_hit_rate_pct, 100.0);

        let content = |s: &RunSummary| {
            s.resources
                .iter()
                .find(|r| r.descriptor.path == "src/types/user.ts")
                .map(|r| r.content.clone())
        };
        assert_eq!(content(&first), content(&second));
    }

    #[tokio::test]
    async fn test_cache_survives_restart() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::default());

        let m = manager(kv.clone(), project(), loader.clone()).await;
        m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        drop(m);

        let m = manager(kv, project(), loader.clone()).await;
        let summary = m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        assert_eq!(summary.progress.cache_hits, 4);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_stale_manifest_forces_physical_load() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let path = "src/types/user.ts";
        let mut stale = CacheManifest::empty(Utc::now() - chrono::Duration::hours(48));
        stale.entries.insert(
            path.to_string(),
            CacheEntry::loaded(
                ResourceDescriptor::new(path, 500, Utc::now()),
                "old content".to_string(),
                5,
                Utc::now() - chrono::Duration::hours(48),
            ),
        );
        stale.recompute_totals();
        kv.set(CACHE_KEY, &serde_json::to_string(&stale.to_persisted()).unwrap())
            .await
            .unwrap();

        let loader = Arc::new(CountingLoader::default());
        let m = manager(kv, vec![resource(path)], loader.clone()).await;
        assert!(m.cache().get(path).await.is_none());
        assert!(m.cache_stats().await.expired);

        let summary = m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        assert_eq!(summary.progress.cache_hits, 0);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.resources[0].content, "content of src/types/user.ts");
        assert!(!m.cache_stats().await.expired);
    }

    #[tokio::test]
    async fn test_progress_is_reported() {
        let m = manager(
            Arc::new(MemoryStore::new()),
            project(),
            Arc::new(CountingLoader::default()),
        )
        .await;

        let snapshots = Mutex::new(Vec::new());
        let sink = |p: &LoadingProgress| snapshots.lock().unwrap().push(p.settled());
        m.load_optimized_context(&sink, CancellationToken::new()).await;

        assert_eq!(*snapshots.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_progressive_loading_off_skips_lower_tiers() {
        let loader = Arc::new(CountingLoader::default());
        let m = manager(Arc::new(MemoryStore::new()), project(), loader.clone()).await;
        m.update_config(&ConfigUpdate {
            progressive_loading: Some(false),
            ..Default::default()
        })
        .await;

        let summary = m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        assert_eq!(summary.progress.total, 2);
        assert!(summary
            .resources
            .iter()
            .all(|r| r.descriptor.priority_tier <= PriorityTier::High));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_loads_nothing() {
        let loader = Arc::new(CountingLoader::default());
        let m = manager(Arc::new(MemoryStore::new()), project(), loader.clone()).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = m.load_optimized_context(&NoProgress, cancel).await;

        assert!(summary.cancelled);
        assert_eq!(summary.progress.total, 4);
        assert_eq!(summary.progress.settled(), 0);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_config_rejects_zero_concurrency() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let m = manager(kv.clone(), project(), Arc::new(CountingLoader::default())).await;

        let outcome = m
            .update_config(&ConfigUpdate {
                max_concurrent_loads: Some(0),
                ..Default::default()
            })
            .await;
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(m.config().await.max_concurrent_loads, 5);
    }

    #[tokio::test]
    async fn test_update_config_rejects_oversized_expiry() {
        let m = manager(
            Arc::new(MemoryStore::new()),
            project(),
            Arc::new(CountingLoader::default()),
        )
        .await;

        let outcome = m
            .update_config(&ConfigUpdate {
                cache_expiry_hours: Some(3_000_000_000_000_000),
                ..Default::default()
            })
            .await;
        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.rejected[0].field, "cacheExpiryHours");
        assert_eq!(m.cache().expiry_hours(), 24);

        assert!(!m.cache_stats().await.expired);
        assert!(m.generate_report().await.contains("cacheExpiryHours:    24"));
    }

    #[tokio::test]
    async fn test_oversized_persisted_expiry_is_reset_on_build() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        kv.set(CONFIG_KEY, r#"{"cacheExpiryHours":3000000000000000}"#)
            .await
            .unwrap();
        let loader = Arc::new(CountingLoader::default());
        let m = manager(kv.clone(), project(), loader.clone()).await;
        m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        drop(m);

        let m = manager(kv, project(), loader).await;
        assert_eq!(m.config().await.cache_expiry_hours, 24);
        assert_eq!(m.cache_stats().await.entry_count, 4);
    }

    #[tokio::test]
    async fn test_update_config_changes_cache_expiry() {
        let m = manager(
            Arc::new(MemoryStore::new()),
            project(),
            Arc::new(CountingLoader::default()),
        )
        .await;
        m.update_config(&ConfigUpdate {
            cache_expiry_hours: Some(6),
            ..Default::default()
        })
        .await;
        assert_eq!(m.cache().expiry_hours(), 6);
    }

    #[tokio::test]
    async fn test_config_persists_across_managers() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let m = manager(kv.clone(), project(), Arc::new(CountingLoader::default())).await;
        m.update_config(&ConfigUpdate {
            cache_expiry_hours: Some(48),
            ..Default::default()
        })
        .await;
        drop(m);

        let m = manager(kv, project(), Arc::new(CountingLoader::default())).await;
        assert_eq!(m.config().await.cache_expiry_hours, 48);
        assert_eq!(m.cache().expiry_hours(), 48);
    }

    #[tokio::test]
    async fn test_reset_config() {
        let m = manager(
            Arc::new(MemoryStore::new()),
            project(),
            Arc::new(CountingLoader::default()),
        )
        .await;
        m.update_config(&ConfigUpdate {
            cache_expiry_hours: Some(2),
            max_memory_mb: Some(40),
            ..Default::default()
        })
        .await;

        assert!(m.reset_config().await);
        assert_eq!(m.config().await, LoadingConfig::default());
        assert_eq!(m.cache().expiry_hours(), 24);
    }

    #[tokio::test]
    async fn test_invalidate_cache() {
        let loader = Arc::new(CountingLoader::default());
        let m = manager(Arc::new(MemoryStore::new()), project(), loader.clone()).await;
        m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        assert_eq!(m.cache_stats().await.entry_count, 4);

        assert!(m.invalidate_cache().await);
        assert_eq!(m.cache_stats().await.entry_count, 0);

        m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        assert_eq!(loader.calls.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_generate_report() {
        let m = manager(
            Arc::new(MemoryStore::new()),
            project(),
            Arc::new(CountingLoader::default()),
        )
        .await;
        let empty = m.generate_report().await;
        assert!(empty.contains("maxConcurrentLoads:  5"));
        assert!(empty.contains("(none)"));

        m.load_optimized_context(&NoProgress, CancellationToken::new()).await;
        let report = m.generate_report().await;
        assert!(report.contains("entries:             4 (4 loaded)"));
        assert!(report.contains("src/types/user.ts"));
        assert!(!report.contains("(none)"));
    }
}
