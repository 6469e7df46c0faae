//! Loading run types: progress snapshots, options and results

use crate::cache::PerformanceStats;
use crate::config::LoadingConfig;
use crate::resource::ResourceDescriptor;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Progress of one loading run. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingProgress {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,
    /// Of `loaded`, how many were served from cache
    pub cache_hits: usize,
    pub progress_pct: f64,
    /// Last resource that started loading
    pub current_path: Option<String>,
    /// Estimated seconds remaining; `None` until something settles
    pub eta_seconds: Option<f64>,
    pub throughput_per_sec: f64,
    pub elapsed_ms: u64,
}

impl LoadingProgress {
    /// Fresh progress for a run of `total` resources
    pub fn new(total: usize) -> Self {
        Self {
            total,
            loaded: 0,
            failed: 0,
            cache_hits: 0,
            progress_pct: 0.0,
            current_path: None,
            eta_seconds: None,
            throughput_per_sec: 0.0,
            elapsed_ms: 0,
        }
    }

    /// Resources that have settled (success or failure)
    pub fn settled(&self) -> usize {
        self.loaded + self.failed
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.settled())
    }

    pub fn is_complete(&self) -> bool {
        self.settled() >= self.total
    }

    /// Recompute the derived fields after `elapsed` time
    pub fn recompute(&mut self, elapsed: Duration) {
        let settled = self.settled();
        self.elapsed_ms = elapsed.as_millis() as u64;
        self.progress_pct = if self.total == 0 {
            100.0
        } else {
            settled as f64 / self.total as f64 * 100.0
        };

        let secs = elapsed.as_secs_f64();
        if settled == 0 || secs <= 0.0 {
            self.throughput_per_sec = 0.0;
            self.eta_seconds = None;
            return;
        }

        self.throughput_per_sec = settled as f64 / secs;
        self.eta_seconds = Some(self.remaining() as f64 / self.throughput_per_sec);
    }
}

/// Receives a snapshot after every settlement
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, snapshot: &LoadingProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(&LoadingProgress) + Send + Sync,
{
    fn on_progress(&self, snapshot: &LoadingProgress) {
        self(snapshot)
    }
}

/// Sink that discards snapshots
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _snapshot: &LoadingProgress) {}
}

/// Options for a single loading run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Batch size; at most this many physical loads in flight
    pub max_concurrent_loads: usize,
    /// Wait budget for a single critical/high resource
    pub priority_timeout: Duration,
    /// Load medium and low tiers after critical and high
    pub progressive_loading: bool,
    /// Pause between batches; zero yields to the runtime instead
    pub batch_pause: Duration,
    /// Checked between batches
    pub cancel: CancellationToken,
}

impl RunOptions {
    /// Options derived from the loading config
    pub fn from_config(config: &LoadingConfig) -> Self {
        Self {
            max_concurrent_loads: config.max_concurrent_loads.max(1),
            priority_timeout: Duration::from_millis(config.priority_timeout_ms),
            progressive_loading: config.progressive_loading,
            batch_pause: Duration::ZERO,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&LoadingConfig::default())
    }
}

/// A resource whose content is available after the run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedResource {
    pub descriptor: ResourceDescriptor,
    pub content: String,
    pub from_cache: bool,
    /// Physical load latency; zero for cache hits
    pub duration_ms: u64,
}

/// A resource that failed to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadFailure {
    pub path: String,
    pub message: String,
}

/// Outcome of a loading run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Final progress snapshot
    pub progress: LoadingProgress,
    /// Loaded resources in scheduling order
    pub resources: Vec<LoadedResource>,
    pub failures: Vec<LoadFailure>,
    pub performance: PerformanceStats,
    /// The run stopped early on a cancellation signal
    pub cancelled: bool,
}
