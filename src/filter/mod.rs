//! Relevance filter
//!
//! Decides whether a candidate path belongs in the working set. Evaluation
//! order is fixed: exclude patterns first (an exclude always wins), then
//! include patterns, then dependency chains. A path matching none of them
//! is left out.

pub mod pattern;
pub mod phase;

pub use pattern::PatternSet;
pub use phase::{patterns_for_phase, PhasePatterns, BASE_EXCLUDES};

use chrono::{DateTime, Utc};

/// Outcome of evaluating one path against a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Matched an exclude pattern
    Excluded,
    /// Matched an include pattern
    Included,
    /// Pulled in by a dependency chain
    Dependency,
    /// Matched nothing
    NoMatch,
}

impl Decision {
    pub fn is_included(self) -> bool {
        matches!(self, Decision::Included | Decision::Dependency)
    }
}

/// Filter computed once per discovery pass from session state
#[derive(Debug, Clone)]
pub struct SmartFilter {
    pub phase: String,
    pub include: PatternSet,
    pub exclude: PatternSet,
    pub dependency_chains: PatternSet,
    pub modification_threshold_hours: u64,
}

impl SmartFilter {
    /// Build the filter for a phase. Never fails: unknown phases use the
    /// default pattern pair.
    pub fn for_phase(phase: &str) -> Self {
        Self::from_patterns(phase, patterns_for_phase(phase))
    }

    /// The broad default filter, independent of phase
    pub fn permissive() -> Self {
        Self::from_patterns(phase::DEFAULT_PHASE.phase, phase::DEFAULT_PHASE)
    }

    fn from_patterns(phase: &str, patterns: PhasePatterns) -> Self {
        if patterns.is_default() && phase != phase::DEFAULT_PHASE.phase {
            tracing::debug!(phase = %phase, "Unrecognized phase, using default patterns");
        }
        Self {
            phase: phase.to_string(),
            include: compile_or_empty(patterns.include.iter().copied()),
            exclude: compile_or_empty(patterns.all_excludes()),
            dependency_chains: PatternSet::empty(),
            modification_threshold_hours: patterns.modification_threshold_hours,
        }
    }

    /// Add dependency-chain patterns. Invalid patterns are skipped with a
    /// warning rather than failing the whole filter.
    pub fn with_dependency_chains<I, S>(mut self, chains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut valid = Vec::new();
        for chain in chains {
            let chain = chain.as_ref();
            match PatternSet::new([chain]) {
                Ok(_) => valid.push(chain.to_string()),
                Err(e) => tracing::warn!(pattern = %chain, error = %e, "Skipping dependency chain"),
            }
        }
        if valid.is_empty() {
            return self;
        }
        match self.dependency_chains.extended(valid) {
            Ok(chains) => self.dependency_chains = chains,
            Err(e) => tracing::warn!(error = %e, "Failed to extend dependency chains"),
        }
        self
    }

    /// Add exact paths as dependency chains
    pub fn with_dependency_paths<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let literals: Vec<String> = paths
            .into_iter()
            .map(|p| pattern::literal(p.as_ref()))
            .collect();
        self.with_dependency_chains(literals)
    }

    /// Evaluate a path, reporting which rule decided it
    pub fn evaluate(&self, path: &str) -> Decision {
        if self.exclude.is_match(path) {
            Decision::Excluded
        } else if self.include.is_match(path) {
            Decision::Included
        } else if self.dependency_chains.is_match(path) {
            Decision::Dependency
        } else {
            Decision::NoMatch
        }
    }

    /// Whether `path` belongs in the working set
    pub fn should_include(&self, path: &str) -> bool {
        self.evaluate(path).is_included()
    }

    /// Whether a modification time falls inside this filter's window
    pub fn is_recent(&self, last_modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match crate::cache::types::hours(self.modification_threshold_hours) {
            Some(window) => now.signed_duration_since(last_modified) <= window,
            None => true,
        }
    }
}

/// Free-function form of [`SmartFilter::should_include`]
pub fn should_include(path: &str, filter: &SmartFilter) -> bool {
    filter.should_include(path)
}

fn compile_or_empty<I, S>(patterns: I) -> PatternSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PatternSet::new(patterns).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Built-in pattern failed to compile");
        PatternSet::empty()
    })
}
