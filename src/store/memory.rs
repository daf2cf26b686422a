use crate::core::store::KeyValueStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory key-value store backed by a HashMap
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.inner.lock().await;
        let value = entries.get(key).cloned();
        debug!(key, hit = value.is_some(), "Memory GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.inner.lock().await;
        debug!(key, "Memory SET");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.inner.lock().await;
        entries.remove(key);
        debug!(key, "Memory REMOVE");
        Ok(())
    }
}

/// Memory store that rejects writes to one chosen key.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct FaultyStore {
    pub(crate) inner: MemoryStore,
    failing_key: Arc<std::sync::Mutex<Option<&'static str>>>,
}

#[cfg(test)]
impl FaultyStore {
    pub(crate) fn fail_writes_to(&self, key: Option<&'static str>) {
        if let Ok(mut failing) = self.failing_key.lock() {
            *failing = key;
        }
    }

    fn check(&self, key: &str) -> Result<()> {
        match self.failing_key.lock() {
            Ok(failing) if *failing == Some(key) => anyhow::bail!("write to {key} rejected"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl KeyValueStore for FaultyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check(key)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check(key)?;
        self.inner.remove(key).await
    }
}
