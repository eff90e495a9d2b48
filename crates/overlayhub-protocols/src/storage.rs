//! Key-value storage protocol.
//!
//! Extensions persist small JSON documents through a [`KeyValueStore`]. Each
//! extension only ever sees its own namespace via [`ExtensionStorage`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::error::StorageError;

/// Backend for namespaced key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StorageError>;

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), StorageError>;

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Remove every key in `namespace`.
    async fn clear(&self, namespace: &str) -> Result<(), StorageError>;

    async fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError>;
}

/// Storage handle scoped to one extension.
///
/// The `try_*` methods report failures. The plain methods are best-effort:
/// they log and swallow errors so a broken store never takes an extension
/// down with it.
#[derive(Clone)]
pub struct ExtensionStorage {
    namespace: String,
    store: Arc<dyn KeyValueStore>,
}

impl ExtensionStorage {
    pub fn new(namespace: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            namespace: namespace.into(),
            store,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.store.get(&self.namespace, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn try_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.store.set(&self.namespace, key, value).await
    }

    pub async fn try_remove(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove(&self.namespace, key).await
    }

    pub async fn try_clear(&self) -> Result<(), StorageError> {
        self.store.clear(&self.namespace).await
    }

    pub async fn try_keys(&self) -> Result<Vec<String>, StorageError> {
        self.store.keys(&self.namespace).await
    }

    /// Best-effort read; `None` on a missing key or any failure.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Storage read failed for {}/{}: {}", self.namespace, key, e);
                None
            }
        }
    }

    /// Best-effort write; returns whether it succeeded.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_set(key, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Storage write failed for {}/{}: {}", self.namespace, key, e);
                false
            }
        }
    }

    pub async fn remove(&self, key: &str) -> bool {
        match self.try_remove(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Storage remove failed for {}/{}: {}", self.namespace, key, e);
                false
            }
        }
    }

    pub async fn clear(&self) -> bool {
        match self.try_clear().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Storage clear failed for {}: {}", self.namespace, e);
                false
            }
        }
    }
}

impl std::fmt::Debug for ExtensionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionStorage")
            .field("namespace", &self.namespace)
            .finish()
    }
}
