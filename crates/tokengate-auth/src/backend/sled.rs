use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokengate_core::{BackendError, BackendResult, KvBackend};

use super::MAX_EXPIRY;

/// Stored form of a value: the payload plus its absolute deadline, written
/// in one insert so a key never exists without its expiry.
#[derive(Serialize, Deserialize)]
struct Envelope {
    expires_at_ms: i64,
    value: String,
}

impl Envelope {
    fn is_live(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// Embedded persistent backend.
#[derive(Clone)]
pub struct SledBackend {
    db: sled::Db,
    sessions: sled::Tree,
}

impl SledBackend {
    pub fn new(path: impl AsRef<Path>) -> BackendResult<Self> {
        let db = sled::open(path).map_err(storage_error)?;
        Self::from_db(db)
    }

    pub fn in_memory() -> BackendResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open().map_err(storage_error)?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> BackendResult<Self> {
        let sessions = db.open_tree("sessions").map_err(storage_error)?;
        Ok(Self { db, sessions })
    }

    fn decode(data: &[u8]) -> BackendResult<Envelope> {
        serde_json::from_slice(data).map_err(|e| BackendError::Internal(e.to_string()))
    }
}

fn storage_error(e: sled::Error) -> BackendError {
    match e {
        sled::Error::Io(io) => BackendError::Unavailable(io.to_string()),
        other => BackendError::Internal(other.to_string()),
    }
}

#[async_trait]
impl KvBackend for SledBackend {
    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> BackendResult<bool> {
        let ttl_ms = i64::try_from(ttl.min(MAX_EXPIRY).as_millis())
            .map_err(|_| BackendError::Internal("ttl out of range".into()))?;
        let envelope = Envelope {
            expires_at_ms: Utc::now().timestamp_millis().saturating_add(ttl_ms),
            value,
        };
        let data =
            serde_json::to_vec(&envelope).map_err(|e| BackendError::Internal(e.to_string()))?;
        self.sessions
            .insert(key.as_bytes(), data)
            .map_err(storage_error)?;
        self.db.flush_async().await.map_err(storage_error)?;
        Ok(true)
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let data = match self.sessions.get(key.as_bytes()).map_err(storage_error)? {
            Some(data) => data,
            None => return Ok(None),
        };
        let envelope = Self::decode(&data)?;
        if envelope.is_live(Utc::now().timestamp_millis()) {
            return Ok(Some(envelope.value));
        }

        // Only drop the entry if nobody rewrote it in the meantime; a
        // conflict means a fresh value now lives under the key.
        match self
            .sessions
            .compare_and_swap(key.as_bytes(), Some(data), None as Option<&[u8]>)
            .map_err(storage_error)?
        {
            Ok(()) | Err(_) => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> BackendResult<bool> {
        let removed = self.sessions.remove(key.as_bytes()).map_err(storage_error)?;
        self.db.flush_async().await.map_err(storage_error)?;
        match removed {
            Some(data) => Ok(Self::decode(&data)?.is_live(Utc::now().timestamp_millis())),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let backend = SledBackend::in_memory().unwrap();
        assert!(backend
            .set_with_expiry("k", "v".into(), Duration::from_secs(60))
            .await
            .unwrap());
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(backend.delete("k").await.unwrap());
        assert!(backend.get("k").await.unwrap().is_none());
        assert!(!backend.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_reads_absent() {
        let backend = SledBackend::in_memory().unwrap();
        backend
            .set_with_expiry("k", "v".into(), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(backend.get("k").await.unwrap().is_none());
        assert!(!backend.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SledBackend::new(dir.path()).unwrap();
        backend
            .set_with_expiry("k", "v".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(dir.path().read_dir().unwrap().next().is_some());
    }

    #[tokio::test]
    async fn test_huge_ttl_clamped() {
        let backend = SledBackend::in_memory().unwrap();
        assert!(backend
            .set_with_expiry("k", "v".into(), Duration::from_secs(u64::MAX))
            .await
            .unwrap());
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
