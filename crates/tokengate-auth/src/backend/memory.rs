use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokengate_core::{BackendResult, KvBackend};
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::MAX_EXPIRY;

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process backend. Expired entries read as absent and are dropped when
/// next touched.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> BackendResult<bool> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl.min(MAX_EXPIRY),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(true)
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> BackendResult<bool> {
        let now = Instant::now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let backend = MemoryBackend::new();
        assert!(backend
            .set_with_expiry("k", "v".into(), Duration::from_secs(60))
            .await
            .unwrap());
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(backend.len().await, 1);

        assert!(backend.delete("k").await.unwrap());
        assert!(!backend.delete("k").await.unwrap());
        assert!(backend.get("k").await.unwrap().is_none());
        assert!(backend.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry() {
        let backend = MemoryBackend::new();
        backend
            .set_with_expiry("k", "v".into(), Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(backend.get("k").await.unwrap().is_none());
        assert!(!backend.delete("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_expiry() {
        let backend = MemoryBackend::new();
        backend
            .set_with_expiry("k", "old".into(), Duration::from_secs(5))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        backend
            .set_with_expiry("k", "new".into(), Duration::from_secs(5))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_huge_ttl_clamped() {
        let backend = MemoryBackend::new();
        assert!(backend
            .set_with_expiry("k", "v".into(), Duration::from_secs(u64::MAX))
            .await
            .unwrap());
        assert!(backend
            .set_with_expiry("m", "v".into(), Duration::MAX)
            .await
            .unwrap());
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(backend.len().await, 2);
    }
}
