//! Loading configuration
//!
//! `LoadingConfig` holds the tunable parameters of the prefetch scheduler.
//! It is serialized with camelCase field names; missing fields fall back to
//! their defaults and unknown fields are ignored, so older or newer persisted
//! records still load.

use serde::{Deserialize, Serialize};

/// Default ceiling on concurrently in-flight physical loads
pub const DEFAULT_MAX_CONCURRENT_LOADS: usize = 5;
/// Default per-resource wait budget for critical/high resources
pub const DEFAULT_PRIORITY_TIMEOUT_MS: u64 = 2000;
/// Default memory budget
pub const DEFAULT_MAX_MEMORY_MB: u64 = 512;
/// Default cache lifetime
pub const DEFAULT_CACHE_EXPIRY_HOURS: u64 = 24;
/// Longest accepted cache lifetime (100 years)
pub const MAX_CACHE_EXPIRY_HOURS: u64 = 24 * 365 * 100;

/// Scheduler and cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadingConfig {
    /// Maximum number of physical loads in flight at once (batch size)
    pub max_concurrent_loads: usize,

    /// How long to wait for a single critical/high resource before
    /// recording it as failed
    pub priority_timeout_ms: u64,

    /// Memory budget, also used to cap the working-set size
    pub max_memory_mb: u64,

    /// Age after which a persisted cache manifest is discarded
    pub cache_expiry_hours: u64,

    /// Load medium and low tiers after critical and high
    pub progressive_loading: bool,

    /// Apply phase include/exclude patterns during discovery
    pub smart_filtering: bool,

    /// Use the session phase to pick the pattern set
    pub phase_aware_loading: bool,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_loads: DEFAULT_MAX_CONCURRENT_LOADS,
            priority_timeout_ms: DEFAULT_PRIORITY_TIMEOUT_MS,
            max_memory_mb: DEFAULT_MAX_MEMORY_MB,
            cache_expiry_hours: DEFAULT_CACHE_EXPIRY_HOURS,
            progressive_loading: true,
            smart_filtering: true,
            phase_aware_loading: true,
        }
    }
}

impl LoadingConfig {
    /// Replace every field that violates its constraint with the default.
    ///
    /// Returns the names of the fields that were reset.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut reset = Vec::new();

        if self.max_concurrent_loads == 0 {
            self.max_concurrent_loads = defaults.max_concurrent_loads;
            reset.push("maxConcurrentLoads");
        }
        if self.priority_timeout_ms == 0 {
            self.priority_timeout_ms = defaults.priority_timeout_ms;
            reset.push("priorityTimeoutMs");
        }
        if self.max_memory_mb == 0 {
            self.max_memory_mb = defaults.max_memory_mb;
            reset.push("maxMemoryMb");
        }
        if self.cache_expiry_hours == 0 || self.cache_expiry_hours > MAX_CACHE_EXPIRY_HOURS {
            self.cache_expiry_hours = defaults.cache_expiry_hours;
            reset.push("cacheExpiryHours");
        }

        reset
    }

    /// Merge a partial update over this config.
    ///
    /// Each field is validated on its own; a rejected field keeps its
    /// current value and is reported in `UpdateOutcome::rejected`.
    pub fn merge(&mut self, update: &ConfigUpdate) -> (Vec<&'static str>, Vec<RejectedField>) {
        let mut applied = Vec::new();
        let mut rejected = Vec::new();

        if let Some(v) = update.max_concurrent_loads {
            if v > 0 {
                self.max_concurrent_loads = v;
                applied.push("maxConcurrentLoads");
            } else {
                rejected.push(RejectedField::positive("maxConcurrentLoads", v as u64));
            }
        }
        if let Some(v) = update.priority_timeout_ms {
            if v > 0 {
                self.priority_timeout_ms = v;
                applied.push("priorityTimeoutMs");
            } else {
                rejected.push(RejectedField::positive("priorityTimeoutMs", v));
            }
        }
        if let Some(v) = update.max_memory_mb {
            if v > 0 {
                self.max_memory_mb = v;
                applied.push("maxMemoryMb");
            } else {
                rejected.push(RejectedField::positive("maxMemoryMb", v));
            }
        }
        if let Some(v) = update.cache_expiry_hours {
            if v == 0 {
                rejected.push(RejectedField::positive("cacheExpiryHours", v));
            } else if v > MAX_CACHE_EXPIRY_HOURS {
                rejected.push(RejectedField::at_most(
                    "cacheExpiryHours",
                    MAX_CACHE_EXPIRY_HOURS,
                    v,
                ));
            } else {
                self.cache_expiry_hours = v;
                applied.push("cacheExpiryHours");
            }
        }
        if let Some(v) = update.progressive_loading {
            self.progressive_loading = v;
            applied.push("progressiveLoading");
        }
        if let Some(v) = update.smart_filtering {
            self.smart_filtering = v;
            applied.push("smartFiltering");
        }
        if let Some(v) = update.phase_aware_loading {
            self.phase_aware_loading = v;
            applied.push("phaseAwareLoading");
        }

        (applied, rejected)
    }
}

/// Partial config update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub max_concurrent_loads: Option<usize>,
    pub priority_timeout_ms: Option<u64>,
    pub max_memory_mb: Option<u64>,
    pub cache_expiry_hours: Option<u64>,
    pub progressive_loading: Option<bool>,
    pub smart_filtering: Option<bool>,
    pub phase_aware_loading: Option<bool>,
}

impl ConfigUpdate {
    /// True when the update names no field at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A field that was not applied because its value violates a constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedField {
    pub field: String,
    pub reason: String,
}

impl RejectedField {
    fn positive(field: &str, value: u64) -> Self {
        Self {
            field: field.to_string(),
            reason: format!("must be greater than 0, got {}", value),
        }
    }

    fn at_most(field: &str, max: u64, value: u64) -> Self {
        Self {
            field: field.to_string(),
            reason: format!("must be at most {}, got {}", max, value),
        }
    }
}

/// Result of a config update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    /// Config after the update
    pub config: LoadingConfig,
    /// Fields whose new value was applied
    pub applied: Vec<String>,
    /// Fields whose new value was rejected (prior value retained)
    pub rejected: Vec<RejectedField>,
    /// Whether the merged config reached the persistent store
    pub persisted: bool,
}

impl UpdateOutcome {
    /// True when every requested field was applied
    pub fn is_fully_applied(&self) -> bool {
        self.rejected.is_empty()
    }
}
