//! Prioritizer
//!
//! Two levels of ordering:
//! - a coarse tier from static path conventions ([`rules`])
//! - a numeric score from dynamic session signals
//!
//! The final order sorts by tier first, then by descending score. Ties keep
//! discovery order, so the sort must be stable.

pub mod rules;

use crate::resource::{PriorityTier, ResourceDescriptor};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Bonus for a path currently open in the session
pub const OPEN_BONUS: u32 = 500;
/// Bonus per active feature tag contained in the path
pub const FEATURE_BONUS: u32 = 200;
/// Bonus for a modification within the last day
pub const MODIFIED_DAY_BONUS: u32 = 100;
/// Additional bonus for a modification within the last week
pub const MODIFIED_WEEK_BONUS: u32 = 50;
/// Bonus for small resources
pub const SMALL_SIZE_BONUS: u32 = 25;
/// Size below which a resource counts as small
pub const SMALL_SIZE_BYTES: u64 = 10_000;

/// Dynamic signals read from the session
#[derive(Debug, Clone)]
pub struct SessionSignals {
    pub open_paths: HashSet<String>,
    pub active_features: Vec<String>,
    /// Reference time for recency bonuses
    pub now: DateTime<Utc>,
}

impl SessionSignals {
    /// Signals with nothing open and no active features
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            open_paths: HashSet::new(),
            active_features: Vec::new(),
            now,
        }
    }
}

/// A descriptor with its computed score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResource {
    pub descriptor: ResourceDescriptor,
    pub score: u32,
}

impl ScoredResource {
    pub fn tier(&self) -> PriorityTier {
        self.descriptor.priority_tier
    }
}

/// Tier for a descriptor, from its path alone
pub fn classify(descriptor: &ResourceDescriptor) -> PriorityTier {
    rules::classify_path(&descriptor.path)
}

/// Fine-grained score for a descriptor under the given session signals
pub fn score(descriptor: &ResourceDescriptor, signals: &SessionSignals) -> u32 {
    let mut total = classify(descriptor).base_weight();

    if signals.open_paths.contains(&descriptor.path) {
        total += OPEN_BONUS;
    }

    let feature_hits = signals
        .active_features
        .iter()
        .filter(|tag| !tag.is_empty() && descriptor.path.contains(tag.as_str()))
        .count() as u32;
    total += FEATURE_BONUS * feature_hits;

    let age = signals.now.signed_duration_since(descriptor.last_modified);
    if age <= Duration::hours(24) {
        total += MODIFIED_DAY_BONUS;
    }
    if age <= Duration::days(7) {
        total += MODIFIED_WEEK_BONUS;
    }

    if descriptor.size_bytes < SMALL_SIZE_BYTES {
        total += SMALL_SIZE_BONUS;
    }

    total
}

/// Classify, score and order candidates.
///
/// Tiers are recomputed for every descriptor. Every critical entry precedes
/// every high entry, and so on; within a tier higher scores come first.
pub fn prioritize(candidates: Vec<ResourceDescriptor>, signals: &SessionSignals) -> Vec<ScoredResource> {
    let mut scored: Vec<ScoredResource> = candidates
        .into_iter()
        .map(|mut descriptor| {
            descriptor.refresh_derived();
            let score = score(&descriptor, signals);
            ScoredResource { descriptor, score }
        })
        .collect();

    // `sort_by` is stable
    scored.sort_by(|a, b| a.tier().cmp(&b.tier()).then_with(|| b.score.cmp(&a.score)));
    scored
}
