use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// A persistent key/value slot. The cache layer only ever uses one key per user.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<String>>;
    async fn put_value(&self, key: &str, payload: &str) -> Result<()>;
    async fn delete_value(&self, key: &str) -> Result<u64>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Box<S> {
    async fn get_value(&self, key: &str) -> Result<Option<String>> { (**self).get_value(key).await }
    async fn put_value(&self, key: &str, payload: &str) -> Result<()> { (**self).put_value(key, payload).await }
    async fn delete_value(&self, key: &str) -> Result<u64> { (**self).delete_value(key).await }
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| anyhow!("memory storage poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn put_value(&self, key: &str, payload: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("memory storage poisoned"))?;
        values.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn delete_value(&self, key: &str) -> Result<u64> {
        let mut values = self.values.lock().map_err(|_| anyhow!("memory storage poisoned"))?;
        Ok(values.remove(key).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_overwrites_and_deletes() {
        let s = MemoryStorage::new();
        assert_eq!(s.get_value("k").await.unwrap(), None);
        s.put_value("k", "one").await.unwrap();
        s.put_value("k", "two").await.unwrap();
        assert_eq!(s.get_value("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(s.delete_value("k").await.unwrap(), 1);
        assert_eq!(s.delete_value("k").await.unwrap(), 0);
    }
}
