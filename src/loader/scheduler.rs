//! Batch loader
//!
//! Loads prioritized resources in tier order (critical, high, medium, low)
//! as a sequence of waves. Each wave holds at most `max_concurrent_loads`
//! resources; every member of a wave settles before the next wave starts.
//!
//! All bookkeeping (cache writes, progress snapshots) happens in the single
//! driving task between settlements, so the manifest has one writer.

use crate::cache::{CacheEntry, CacheStore, PerformanceStats};
use crate::error::{Error, Result};
use crate::loader::physical::{LoadedContent, ResourceLoader};
use crate::loader::types::*;
use crate::resource::{PriorityTier, ResourceDescriptor};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Executes loading runs against a cache and a physical loader
pub struct BatchLoader {
    cache: Arc<CacheStore>,
    loader: Arc<dyn ResourceLoader>,
}

/// Mutable state of one run
struct RunState<'a> {
    progress: LoadingProgress,
    started: Instant,
    sink: &'a dyn ProgressSink,
    resources: Vec<LoadedResource>,
    failures: Vec<LoadFailure>,
    load_times_ms: Vec<u64>,
}

impl RunState<'_> {
    fn publish(&mut self) {
        self.progress.recompute(self.started.elapsed());
        self.sink.on_progress(&self.progress);
    }
}

impl BatchLoader {
    pub fn new(cache: Arc<CacheStore>, loader: Arc<dyn ResourceLoader>) -> Self {
        Self { cache, loader }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Run one loading pass over `candidates`.
    ///
    /// `candidates` should already be filtered and ordered by the
    /// prioritizer; order within each tier is preserved. Medium and low
    /// tiers are skipped unless `progressive_loading` is set. Failures are
    /// recorded and never abort the run. The cache is persisted exactly
    /// once at the end, including after cancellation.
    pub async fn run(
        &self,
        candidates: Vec<ResourceDescriptor>,
        options: &RunOptions,
        sink: &dyn ProgressSink,
    ) -> RunSummary {
        let run_id = Uuid::new_v4();
        let batch_size = options.max_concurrent_loads.max(1);

        let mut groups = partition(candidates);
        if !options.progressive_loading {
            for tier in [PriorityTier::Medium, PriorityTier::Low] {
                groups[tier_index(tier)].clear();
            }
        }
        let total: usize = groups.iter().map(Vec::len).sum();

        tracing::info!(
            run_id = %run_id,
            total,
            batch_size,
            progressive = options.progressive_loading,
            "Starting loading run"
        );

        let mut state = RunState {
            progress: LoadingProgress::new(total),
            started: Instant::now(),
            sink,
            resources: Vec::new(),
            failures: Vec::new(),
            load_times_ms: Vec::new(),
        };
        state.publish();

        let mut cancelled = false;
        let mut first_batch = true;

        'tiers: for tier in PriorityTier::ALL {
            let budget = tier.is_time_boxed().then_some(options.priority_timeout);
            for batch in groups[tier_index(tier)].chunks(batch_size) {
                if options.cancel.is_cancelled() {
                    cancelled = true;
                    break 'tiers;
                }
                if !first_batch {
                    pause(options.batch_pause).await;
                }
                first_batch = false;

                tracing::debug!(run_id = %run_id, tier = %tier, size = batch.len(), "Starting batch");
                self.run_batch(batch, budget, &mut state).await;
            }
        }

        let processed = state.progress.settled();
        let hits = state.progress.cache_hits;
        let performance = PerformanceStats::for_run(hits, processed, &state.load_times_ms);
        self.cache
            .record_run(performance.clone(), hits as u64, processed as u64)
            .await;
        if let Err(e) = self.cache.persist().await {
            tracing::warn!(run_id = %run_id, error = %e, "Failed to persist cache manifest");
        }

        state.progress.recompute(state.started.elapsed());
        if cancelled {
            tracing::info!(
                run_id = %run_id,
                settled = processed,
                total,
                "Loading run cancelled"
            );
        } else {
            tracing::info!(
                run_id = %run_id,
                loaded = state.progress.loaded,
                failed = state.progress.failed,
                cache_hit_rate_pct = performance.cache_hit_rate_pct,
                elapsed_ms = state.progress.elapsed_ms,
                "Loading run complete"
            );
        }

        RunSummary {
            run_id,
            progress: state.progress,
            resources: state.resources,
            failures: state.failures,
            performance,
            cancelled,
        }
    }

    /// Start every member of a batch and wait for all of them to settle
    async fn run_batch(
        &self,
        batch: &[ResourceDescriptor],
        budget: Option<Duration>,
        state: &mut RunState<'_>,
    ) {
        let mut in_flight = FuturesUnordered::new();
        let mut settled: Vec<Option<LoadedResource>> = vec![None; batch.len()];

        for (index, descriptor) in batch.iter().enumerate() {
            state.progress.current_path = Some(descriptor.path.clone());

            let cached = self
                .cache
                .get(&descriptor.path)
                .await
                .and_then(|entry| entry.payload);

            match cached {
                Some(content) => {
                    self.cache.touch(&descriptor.path).await;
                    tracing::debug!(path = %descriptor.path, "Cache hit");
                    state.progress.loaded += 1;
                    state.progress.cache_hits += 1;
                    settled[index] = Some(LoadedResource {
                        descriptor: descriptor.clone(),
                        content,
                        from_cache: true,
                        duration_ms: 0,
                    });
                    state.publish();
                }
                None => {
                    in_flight.push(load_one(
                        index,
                        self.loader.clone(),
                        descriptor.clone(),
                        budget,
                    ));
                }
            }
        }

        while let Some((index, descriptor, outcome)) = in_flight.next().await {
            match outcome {
                Ok(loaded) => {
                    tracing::debug!(
                        path = %descriptor.path,
                        duration_ms = loaded.duration_ms,
                        "Loaded resource"
                    );
                    self.cache
                        .put(CacheEntry::loaded(
                            descriptor.clone(),
                            loaded.content.clone(),
                            loaded.duration_ms,
                            Utc::now(),
                        ))
                        .await;
                    state.load_times_ms.push(loaded.duration_ms);
                    state.progress.loaded += 1;
                    settled[index] = Some(LoadedResource {
                        descriptor,
                        content: loaded.content,
                        from_cache: false,
                        duration_ms: loaded.duration_ms,
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %descriptor.path, error = %e, "Failed to load resource");
                    state.progress.failed += 1;
                    state.failures.push(LoadFailure {
                        path: descriptor.path,
                        message: e.to_string(),
                    });
                }
            }
            state.publish();
        }

        // Settlement order varies; results keep scheduling order
        state.resources.extend(settled.into_iter().flatten());
    }
}

/// Physically load one resource, bounded by `budget` when set
async fn load_one(
    index: usize,
    loader: Arc<dyn ResourceLoader>,
    descriptor: ResourceDescriptor,
    budget: Option<Duration>,
) -> (usize, ResourceDescriptor, Result<LoadedContent>) {
    let outcome = match budget {
        Some(budget) => match tokio::time::timeout(budget, loader.load(&descriptor.path)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::load(
                descriptor.path.clone(),
                format!("timed out after {}ms", budget.as_millis()),
            )),
        },
        None => loader.load(&descriptor.path).await,
    };
    (index, descriptor, outcome)
}

async fn pause(duration: Duration) {
    if duration.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(duration).await;
    }
}

fn tier_index(tier: PriorityTier) -> usize {
    match tier {
        PriorityTier::Critical => 0,
        PriorityTier::High => 1,
        PriorityTier::Medium => 2,
        PriorityTier::Low => 3,
    }
}

/// Split into per-tier groups, keeping relative order
fn partition(candidates: Vec<ResourceDescriptor>) -> [Vec<ResourceDescriptor>; 4] {
    let mut groups: [Vec<ResourceDescriptor>; 4] = Default::default();
    for descriptor in candidates {
        groups[tier_index(descriptor.priority_tier)].push(descriptor);
    }
    groups
}
