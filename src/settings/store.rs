//! Config store with validated partial updates

use crate::config::{ConfigUpdate, LoadingConfig, UpdateOutcome};
use crate::error::{Error, Result};
use crate::storage::{KeyValueStore, CONFIG_KEY};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Runtime loading configuration, persisted under [`CONFIG_KEY`]
pub struct ConfigStore {
    kv: Arc<dyn KeyValueStore>,
    config: RwLock<LoadingConfig>,
}

impl ConfigStore {
    /// Create a store holding `config` without reading persisted state
    pub fn new(kv: Arc<dyn KeyValueStore>, config: LoadingConfig) -> Self {
        Self {
            kv,
            config: RwLock::new(config),
        }
    }

    /// Open the store, restoring the persisted config.
    ///
    /// Missing or unreadable config falls back to defaults; invalid fields
    /// are reset to their defaults individually.
    pub async fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let config = Self::load(kv.as_ref()).await;
        Self::new(kv, config)
    }

    async fn load(kv: &dyn KeyValueStore) -> LoadingConfig {
        let raw = match kv.get(CONFIG_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadingConfig::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read loading config, using defaults");
                return LoadingConfig::default();
            }
        };

        let parsed = serde_json::from_str::<LoadingConfig>(&raw)
            .map_err(|e| Error::Config(format!("unreadable loading config: {}", e)));
        let mut config = match parsed {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid persisted loading config, using defaults");
                return LoadingConfig::default();
            }
        };

        let reset = config.sanitize();
        if !reset.is_empty() {
            tracing::warn!(fields = ?reset, "Persisted config fields out of range, reset to defaults");
        }
        config
    }

    /// Current config
    pub async fn get(&self) -> LoadingConfig {
        self.config.read().await.clone()
    }

    /// Merge a partial update over the current config and persist it.
    ///
    /// Out-of-range fields are rejected and keep their prior value; the
    /// remaining fields are still applied.
    pub async fn update(&self, update: &ConfigUpdate) -> UpdateOutcome {
        let (config, applied, rejected) = {
            let mut current = self.config.write().await;
            let (applied, rejected) = current.merge(update);
            (current.clone(), applied, rejected)
        };

        for r in &rejected {
            tracing::warn!(field = %r.field, reason = %r.reason, "Config update rejected");
        }

        let persisted = if applied.is_empty() {
            false
        } else {
            self.persist_config(&config).await
        };

        UpdateOutcome {
            config,
            applied: applied.into_iter().map(String::from).collect(),
            rejected,
            persisted,
        }
    }

    /// Restore defaults and persist them. Returns whether the write succeeded.
    pub async fn reset(&self) -> bool {
        let config = LoadingConfig::default();
        *self.config.write().await = config.clone();
        self.persist_config(&config).await
    }

    async fn persist_config(&self, config: &LoadingConfig) -> bool {
        match self.write(config).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist loading config");
                false
            }
        }
    }

    async fn write(&self, config: &LoadingConfig) -> Result<()> {
        let json = serde_json::to_string(config)?;
        self.kv.set(CONFIG_KEY, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("read-only".to_string()))
        }
        async fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_open_without_persisted_config() {
        let store = ConfigStore::open(Arc::new(MemoryStore::new())).await;
        assert_eq!(store.get().await, LoadingConfig::default());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let kv = Arc::new(MemoryStore::new());
        let store = ConfigStore::open(kv.clone()).await;

        let outcome = store
            .update(&ConfigUpdate {
                max_concurrent_loads: Some(8),
                ..Default::default()
            })
            .await;
        assert!(outcome.is_fully_applied());
        assert!(outcome.persisted);
        assert_eq!(outcome.applied, vec!["maxConcurrentLoads"]);

        let reopened = ConfigStore::open(kv).await;
        assert_eq!(reopened.get().await.max_concurrent_loads, 8);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected() {
        let store = ConfigStore::open(Arc::new(MemoryStore::new())).await;

        let outcome = store
            .update(&ConfigUpdate {
                max_concurrent_loads: Some(0),
                ..Default::default()
            })
            .await;

        assert!(!outcome.is_fully_applied());
        assert_eq!(outcome.rejected[0].field, "maxConcurrentLoads");
        assert!(!outcome.persisted);
        assert_eq!(store.get().await.max_concurrent_loads, 5);
    }

    #[tokio::test]
    async fn test_partial_rejection_applies_valid_fields() {
        let store = ConfigStore::open(Arc::new(MemoryStore::new())).await;

        let outcome = store
            .update(&ConfigUpdate {
                cache_expiry_hours: Some(0),
                priority_timeout_ms: Some(750),
                ..Default::default()
            })
            .await;

        assert_eq!(outcome.applied, vec!["priorityTimeoutMs"]);
        assert_eq!(outcome.rejected.len(), 1);
        let config = store.get().await;
        assert_eq!(config.priority_timeout_ms, 750);
        assert_eq!(config.cache_expiry_hours, 24);
    }

    #[tokio::test]
    async fn test_open_sanitizes_invalid_persisted_fields() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(CONFIG_KEY, r#"{"maxConcurrentLoads":0,"maxMemoryMb":128}"#)
            .await
            .unwrap();

        let config = ConfigStore::open(kv).await.get().await;
        assert_eq!(config.max_concurrent_loads, 5);
        assert_eq!(config.max_memory_mb, 128);
    }

    #[tokio::test]
    async fn test_open_corrupt_config_uses_defaults() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(CONFIG_KEY, "garbage").await.unwrap();
        assert_eq!(ConfigStore::open(kv).await.get().await, LoadingConfig::default());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_update_in_memory() {
        let store = ConfigStore::open(Arc::new(ReadOnlyStore)).await;
        let outcome = store
            .update(&ConfigUpdate {
                progressive_loading: Some(false),
                ..Default::default()
            })
            .await;
        assert!(!outcome.persisted);
        assert!(!store.get().await.progressive_loading);
    }

    #[tokio::test]
    async fn test_reset() {
        let store = ConfigStore::open(Arc::new(MemoryStore::new())).await;
        store
            .update(&ConfigUpdate {
                max_memory_mb: Some(64),
                ..Default::default()
            })
            .await;
        assert!(store.reset().await);
        assert_eq!(store.get().await, LoadingConfig::default());
    }
}
