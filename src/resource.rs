//! Resource descriptors
//!
//! A `ResourceDescriptor` identifies one loadable unit (originally a file).
//! Its tier and category are derived from the path and recomputed on every
//! discovery pass; they are never set by callers.

use crate::priority::rules;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Coarse priority bucket. Ordering follows scheduling order:
/// `Critical < High < Medium < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityTier {
    /// All tiers in scheduling order
    pub const ALL: [PriorityTier; 4] = [
        PriorityTier::Critical,
        PriorityTier::High,
        PriorityTier::Medium,
        PriorityTier::Low,
    ];

    /// Base score weight for the tier
    pub fn base_weight(self) -> u32 {
        match self {
            PriorityTier::Critical => 1000,
            PriorityTier::High => 100,
            PriorityTier::Medium => 10,
            PriorityTier::Low => 1,
        }
    }

    /// Whether the per-resource timeout budget applies to this tier
    pub fn is_time_boxed(self) -> bool {
        matches!(self, PriorityTier::Critical | PriorityTier::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriorityTier::Critical => "critical",
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content category, derived from path shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Types,
    Components,
    Api,
    Documentation,
    Config,
    Tests,
}

/// Raw candidate as returned by a resource enumerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumeratedResource {
    pub path: String,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
    /// Paths this resource is known to reference (best effort)
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
}

/// A loadable unit of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Identifier, unique within a session and stable across runs
    pub path: String,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
    pub priority_tier: PriorityTier,
    pub category: ResourceCategory,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
}

impl ResourceDescriptor {
    /// Create a descriptor, deriving tier and category from the path
    pub fn new(path: impl Into<String>, size_bytes: u64, last_modified: DateTime<Utc>) -> Self {
        let path = path.into();
        Self {
            priority_tier: rules::classify_path(&path),
            category: rules::categorize_path(&path),
            path,
            size_bytes,
            last_modified,
            dependencies: BTreeSet::new(),
        }
    }

    /// Attach known dependencies
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Recompute the derived fields from the current path
    pub fn refresh_derived(&mut self) {
        self.priority_tier = rules::classify_path(&self.path);
        self.category = rules::categorize_path(&self.path);
    }
}

impl From<EnumeratedResource> for ResourceDescriptor {
    fn from(raw: EnumeratedResource) -> Self {
        ResourceDescriptor::new(raw.path, raw.size_bytes, raw.last_modified)
            .with_dependencies(raw.dependencies)
    }
}
