use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::Storage;
use crate::types::CacheEntry;

/// Namespace prefix of the cache key; bump when the record layout changes.
pub const CACHE_NAMESPACE: &str = "portfolio_v2_";

pub fn cache_key(user: &str) -> String { format!("{CACHE_NAMESPACE}{user}") }

/// `true` while `now - entry.timestamp` is strictly below `duration`.
pub fn is_fresh(entry: &CacheEntry, now_ms: i64, duration: Duration) -> bool {
    let ttl_ms = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(entry.timestamp) < ttl_ms
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub key: String,
    pub has_entry: bool,
    pub is_fresh: bool,
    pub age_ms: Option<i64>,
    pub captured_at: Option<i64>,
    pub project_count: Option<usize>,
}

/// Reads and writes the snapshot under a storage key. Bad content reads as a miss.
pub struct CacheStore<S: Storage> {
    storage: S,
}

impl<S: Storage> CacheStore<S> {
    pub fn new(storage: S) -> Self { Self { storage } }

    pub fn storage(&self) -> &S { &self.storage }

    pub async fn read_cache(&self, key: &str) -> Option<CacheEntry> {
        let payload = match self.storage.get_value(key).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                debug!("cache miss for {}", key);
                return None;
            }
            Err(e) => {
                warn!("failed to read cache {}: {:#}", key, e);
                return None;
            }
        };
        match serde_json::from_str::<CacheEntry>(&payload) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("ignoring malformed cache {}: {}", key, e);
                None
            }
        }
    }

    pub async fn write_cache(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let payload = serde_json::to_string(entry)?;
        self.storage.put_value(key, &payload).await
    }

    pub async fn clear(&self, key: &str) -> Result<u64> { self.storage.delete_value(key).await }

    pub async fn status(&self, key: &str, now_ms: i64, duration: Duration) -> CacheStatus {
        let entry = self.read_cache(key).await;
        CacheStatus {
            key: key.to_string(),
            has_entry: entry.is_some(),
            is_fresh: entry.as_ref().is_some_and(|e| is_fresh(e, now_ms, duration)),
            age_ms: entry.as_ref().map(|e| now_ms.saturating_sub(e.timestamp)),
            captured_at: entry.as_ref().map(|e| e.timestamp),
            project_count: entry.as_ref().map(|e| e.data.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::{MediaItem, ProjectRecord};
    use pretty_assertions::assert_eq;

    const HOUR: Duration = Duration::from_secs(3600);

    fn entry_at(ts: i64) -> CacheEntry { CacheEntry { timestamp: ts, data: vec![] } }

    fn sample_record() -> ProjectRecord {
        ProjectRecord {
            repo_name: "gallery-app".into(),
            title: "Gallery App".into(),
            description: "Photo viewer".into(),
            thumbnail_url: "https://cdn/x.png".into(),
            media: vec![
                MediaItem::Video { url: "https://cdn/demo.mp4".into() },
                MediaItem::Image { url: "https://cdn/x.png".into() },
                MediaItem::YouTube { id: "abc123".into() },
            ],
            documentation_text: "# Gallery App\n- Photo viewer".into(),
            repo_url: "https://github.com/u/gallery-app".into(),
            homepage_url: Some("https://u.github.io/gallery-app".into()),
            updated_at: Some("2024-03-01T12:00:00Z".into()),
        }
    }

    #[test]
    fn freshness_boundaries() {
        let now = 10_000_000;
        let ttl = HOUR.as_millis() as i64;
        assert!(is_fresh(&entry_at(now - ttl + 1), now, HOUR));
        assert!(!is_fresh(&entry_at(now - ttl), now, HOUR));
        assert!(!is_fresh(&entry_at(now - ttl - 1), now, HOUR));
        assert!(is_fresh(&entry_at(now), now, HOUR));
    }

    #[tokio::test]
    async fn round_trip_preserves_entry() {
        let store = CacheStore::new(MemoryStorage::new());
        let entry = CacheEntry { timestamp: 1_700_000_000_123, data: vec![sample_record()] };
        store.write_cache("portfolio_v2_u", &entry).await.unwrap();
        assert_eq!(store.read_cache("portfolio_v2_u").await, Some(entry));
    }

    #[tokio::test]
    async fn malformed_content_is_a_miss() {
        let storage = MemoryStorage::new();
        storage.put_value("k", "not json {").await.unwrap();
        let store = CacheStore::new(storage);
        assert_eq!(store.read_cache("k").await, None);

        store.storage().put_value("k", r#"{"timestamp":"yesterday","data":[]}"#).await.unwrap();
        assert_eq!(store.read_cache("k").await, None);
    }

    #[tokio::test]
    async fn status_reports_age_and_count() {
        let store = CacheStore::new(MemoryStorage::new());
        let missing = store.status("k", 5_000, HOUR).await;
        assert!(!missing.has_entry && !missing.is_fresh);

        store.write_cache("k", &CacheEntry { timestamp: 1_000, data: vec![sample_record()] }).await.unwrap();
        let st = store.status("k", 5_000, HOUR).await;
        assert_eq!(st.age_ms, Some(4_000));
        assert_eq!(st.project_count, Some(1));
        assert!(st.is_fresh);

        assert_eq!(store.clear("k").await.unwrap(), 1);
        assert!(!store.status("k", 5_000, HOUR).await.has_entry);
    }

    #[tokio::test]
    async fn status_survives_extreme_timestamp() {
        let store = CacheStore::new(MemoryStorage::new());
        store.storage().put_value("k", r#"{"timestamp":-9223372036854775808,"data":[]}"#).await.unwrap();
        let st = store.status("k", 5_000, HOUR).await;
        assert!(st.has_entry);
        assert!(!st.is_fresh);
        assert_eq!(st.age_ms, Some(i64::MAX));
        assert_eq!(st.project_count, Some(0));
    }

    #[test]
    fn key_is_namespaced_by_user() {
        assert_eq!(cache_key("octocat"), "portfolio_v2_octocat");
    }
}
