//! In-memory key-value store.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;

use overlayhub_protocols::error::StorageError;
use overlayhub_protocols::storage::KeyValueStore;

/// Store that lives for the process lifetime.
#[derive(Default)]
pub struct MemoryStore {
    namespaces: DashMap<String, HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self
            .namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key).cloned()))
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), StorageError> {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        if let Some(mut entries) = self.namespaces.get_mut(namespace) {
            entries.remove(key);
        }
        Ok(())
    }

    async fn clear(&self, namespace: &str) -> Result<(), StorageError> {
        self.namespaces.remove(namespace);
        Ok(())
    }

    async fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self
            .namespaces
            .get(namespace)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlayhub_protocols::storage::ExtensionStorage;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Metrics {
        commands: u64,
        pages: u64,
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let store = Arc::new(MemoryStore::new());
        let analytics = ExtensionStorage::new("analytics", store.clone());
        let automation = ExtensionStorage::new("automation", store.clone());

        assert!(analytics.set("metrics", &json!({"commands": 1})).await);
        assert!(automation.get::<Value>("metrics").await.is_none());
        assert_eq!(
            analytics.get::<Value>("metrics").await,
            Some(json!({"commands": 1}))
        );

        analytics.clear().await;
        assert!(analytics.try_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let storage = ExtensionStorage::new("analytics", Arc::new(MemoryStore::new()));
        let metrics = Metrics { commands: 3, pages: 1 };
        storage.try_set("metrics", &metrics).await.unwrap();
        let loaded: Option<Metrics> = storage.try_get("metrics").await.unwrap();
        assert_eq!(loaded, Some(metrics));
    }

    #[tokio::test]
    async fn test_type_mismatch_is_reported_or_swallowed() {
        let storage = ExtensionStorage::new("analytics", Arc::new(MemoryStore::new()));
        storage.set("metrics", "not a struct").await;

        assert!(storage.try_get::<Metrics>("metrics").await.is_err());
        assert!(storage.get::<Metrics>("metrics").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_and_keys() {
        let store = MemoryStore::new();
        store.set("ns", "b", json!(2)).await.unwrap();
        store.set("ns", "a", json!(1)).await.unwrap();
        assert_eq!(store.keys("ns").await.unwrap(), vec!["a", "b"]);
        store.remove("ns", "a").await.unwrap();
        assert_eq!(store.keys("ns").await.unwrap(), vec!["b"]);
        store.remove("missing", "a").await.unwrap();
        assert!(store.keys("missing").await.unwrap().is_empty());
    }
}
