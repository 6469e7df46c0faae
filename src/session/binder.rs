//! Session binder
//!
//! Turns session state into the inputs of a discovery pass: the relevance
//! filter, the scoring signals and the working-set size. A provider that
//! fails or has no session degrades to defaults.

use crate::config::LoadingConfig;
use crate::filter::{pattern, SmartFilter};
use crate::priority::SessionSignals;
use crate::session::provider::{SessionProvider, SessionSnapshot};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Working-set size with no session activity
pub const BASE_WORKING_SET_SIZE: usize = 50;
/// Extra working-set slots per active feature
pub const PER_FEATURE_SLOTS: usize = 5;
/// Cap on slots contributed by recent actions
pub const MAX_ACTION_SLOTS: usize = 20;

/// Everything a discovery pass needs from one session read
#[derive(Debug, Clone)]
pub struct BoundSession {
    pub snapshot: Option<SessionSnapshot>,
    pub filter: SmartFilter,
    pub signals: SessionSignals,
    pub target_size: usize,
}

/// Reads the session provider and derives filter, signals and sizing
pub struct SessionBinder {
    provider: Arc<dyn SessionProvider>,
}

impl SessionBinder {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self { provider }
    }

    /// Read the session. Provider errors are logged and treated as no session.
    pub async fn read(&self) -> Option<SessionSnapshot> {
        match self.provider.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Session provider unavailable, using defaults");
                None
            }
        }
    }

    /// Filter for the current session
    pub async fn current_filter(&self, config: &LoadingConfig) -> SmartFilter {
        filter_for(self.read().await.as_ref(), config)
    }

    /// Target working-set size for the current session
    pub async fn target_working_set_size(&self, config: &LoadingConfig) -> usize {
        working_set_size(self.read().await.as_ref(), config)
    }

    /// Scoring signals for the current session
    pub async fn signals(&self, now: DateTime<Utc>) -> SessionSignals {
        signals_for(self.read().await.as_ref(), now)
    }

    /// Derive filter, signals and size from a single session read
    pub async fn bind(&self, config: &LoadingConfig, now: DateTime<Utc>) -> BoundSession {
        let snapshot = self.read().await;
        BoundSession {
            filter: filter_for(snapshot.as_ref(), config),
            signals: signals_for(snapshot.as_ref(), now),
            target_size: working_set_size(snapshot.as_ref(), config),
            snapshot,
        }
    }
}

/// Filter for a session snapshot.
///
/// With `smart_filtering` off, or no usable phase, the permissive default
/// filter is used. Active feature tags always become dependency chains.
pub fn filter_for(snapshot: Option<&SessionSnapshot>, config: &LoadingConfig) -> SmartFilter {
    let phase = snapshot
        .map(|s| s.current_phase.trim())
        .filter(|p| !p.is_empty());

    let filter = match phase {
        Some(phase) if config.smart_filtering && config.phase_aware_loading => {
            SmartFilter::for_phase(phase)
        }
        _ => SmartFilter::permissive(),
    };

    match snapshot {
        Some(s) => filter.with_dependency_chains(feature_chains(&s.active_feature_tags)),
        None => filter,
    }
}

/// `base + 5 × features + min(actions, 20)`, clamped to `max_memory_mb / 2`.
///
/// With no session the unclamped size is the base size. The clamp never
/// goes below one item.
pub fn working_set_size(snapshot: Option<&SessionSnapshot>, config: &LoadingConfig) -> usize {
    let size = match snapshot {
        Some(s) => {
            let features = s
                .active_feature_tags
                .iter()
                .filter(|t| !t.trim().is_empty())
                .count();
            BASE_WORKING_SET_SIZE
                + PER_FEATURE_SLOTS * features
                + s.recent_action_count.min(MAX_ACTION_SLOTS)
        }
        None => BASE_WORKING_SET_SIZE,
    };
    let ceiling = ((config.max_memory_mb / 2) as usize).max(1);
    size.min(ceiling)
}

/// Scoring signals for a session snapshot
pub fn signals_for(snapshot: Option<&SessionSnapshot>, now: DateTime<Utc>) -> SessionSignals {
    match snapshot {
        Some(s) => SessionSignals {
            open_paths: s.open_resource_paths.iter().cloned().collect(),
            active_features: s
                .active_feature_tags
                .iter()
                .filter(|t| !t.trim().is_empty())
                .cloned()
                .collect(),
            now,
        },
        None => SessionSignals::empty(now),
    }
}

/// Dependency-chain patterns for active feature tags
pub fn feature_chains(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .flat_map(|t| {
            let tag = pattern::literal(t);
            [format!("**/*{}*", tag), format!("**/{}/**", tag)]
        })
        .collect()
}
