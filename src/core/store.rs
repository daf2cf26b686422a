//! Key-value persistence abstraction

use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

/// Snapshot key holding the serialized session user.
pub const SESSION_KEY: &str = "session.current_user";
/// Snapshot key holding the full transaction list.
pub const LEDGER_KEY: &str = "ledger.transactions";
/// Snapshot key holding every registered user record.
pub const USERS_KEY: &str = "directory.users";

/// A string key-value store, the moral equivalent of browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and decodes the JSON snapshot stored under `key`.
pub async fn load_snapshot<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> crate::core::error::Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => {
            debug!("Snapshot HIT for key: {}", key);
            Ok(Some(serde_json::from_str(&raw)?))
        }
        None => {
            debug!("Snapshot MISS for key: {}", key);
            Ok(None)
        }
    }
}

/// Encodes `value` as JSON and writes it under `key`, replacing any previous snapshot.
pub async fn save_snapshot<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> crate::core::error::Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await?;
    debug!("Snapshot PUT for key: {}", key);
    Ok(())
}
