use std::sync::Arc;
use std::time::Duration;

use tokengate_core::{Claims, Error, KvBackend, Result, SessionRecord, Token};

/// Maps tokens to session records on top of a [`KvBackend`]. Every call is
/// one backend round trip; expiry is left to the backend.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KvBackend>,
    default_ttl: u64,
    key_prefix: String,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KvBackend>, default_ttl: u64) -> Self {
        Self {
            backend,
            default_ttl,
            key_prefix: String::new(),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    fn key(&self, token: &Token) -> String {
        format!("{}{}", self.key_prefix, token.as_str())
    }

    fn serialize_record(record: &SessionRecord) -> Result<String> {
        serde_json::to_string(record).map_err(|e| Error::StoreWrite(e.to_string()))
    }

    fn deserialize_record(data: &str) -> Result<SessionRecord> {
        serde_json::from_str(data)
            .map_err(|e| Error::StoreRead(format!("undecodable session record: {}", e)))
    }

    pub async fn put(&self, token: &Token, claims: Option<Claims>, ttl: Option<u64>) -> Result<()> {
        if token.as_str().is_empty() {
            return Err(Error::Validation("token is empty".into()));
        }
        let ttl = match ttl {
            Some(0) => return Err(Error::Validation("ttl must be positive".into())),
            Some(seconds) => seconds,
            None => self.default_ttl,
        };

        let record = SessionRecord::new(claims.unwrap_or_default());
        let data = Self::serialize_record(&record)?;

        let acknowledged = self
            .backend
            .set_with_expiry(&self.key(token), data, Duration::from_secs(ttl))
            .await
            .map_err(|e| Error::StoreWrite(e.to_string()))?;
        if !acknowledged {
            return Err(Error::StoreWrite("write not acknowledged".into()));
        }
        Ok(())
    }

    pub async fn get(&self, token: &Token) -> Result<SessionRecord> {
        let data = self
            .backend
            .get(&self.key(token))
            .await
            .map_err(|e| Error::StoreRead(e.to_string()))?
            .ok_or(Error::NotFound)?;
        Self::deserialize_record(&data)
    }

    pub async fn delete(&self, token: &Token) -> Result<()> {
        let removed = self
            .backend
            .delete(&self.key(token))
            .await
            .map_err(|e| Error::StoreWrite(e.to_string()))?;
        if !removed {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}
