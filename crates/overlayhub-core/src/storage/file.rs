//! File-backed key-value store: one JSON document per namespace.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use overlayhub_protocols::error::StorageError;
use overlayhub_protocols::storage::KeyValueStore;

/// Stores `<dir>/<namespace>.json`.
///
/// Writes are read-modify-write under a single lock, which is plenty for
/// the handful of counters extensions keep.
pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> Result<PathBuf, StorageError> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Backend(format!(
                "invalid namespace: {:?}",
                namespace
            )));
        }
        Ok(self.dir.join(format!("{}.json", namespace)))
    }

    async fn load(&self, path: &Path) -> Result<Map<String, Value>, StorageError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => match serde_json::from_str(&text)? {
                Value::Object(map) => Ok(map),
                _ => Err(StorageError::Backend(format!(
                    "{} does not hold a JSON object",
                    path.display()
                ))),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, path: &Path, map: Map<String, Value>) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let text = serde_json::to_string_pretty(&Value::Object(map))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!("Saved storage file {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(namespace)?;
        let _guard = self.lock.lock().await;
        Ok(self.load(&path).await?.remove(key))
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), StorageError> {
        let path = self.path_for(namespace)?;
        let _guard = self.lock.lock().await;
        let mut map = self.load(&path).await?;
        map.insert(key.to_string(), value);
        self.save(&path, map).await
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(namespace)?;
        let _guard = self.lock.lock().await;
        let mut map = self.load(&path).await?;
        if map.remove(key).is_some() {
            self.save(&path, map).await?;
        }
        Ok(())
    }

    async fn clear(&self, namespace: &str) -> Result<(), StorageError> {
        let path = self.path_for(namespace)?;
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
        let path = self.path_for(namespace)?;
        let _guard = self.lock.lock().await;
        let mut keys: Vec<String> = self.load(&path).await?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
