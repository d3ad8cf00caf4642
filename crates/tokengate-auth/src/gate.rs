use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokengate_core::{Error, GateConfig, KvBackend, Result, SessionRecord, Token};
use tracing::{debug, warn};

use crate::codec::TokenCodec;
use crate::store::TokenStore;

/// Issues, verifies and revokes bearer tokens.
///
/// The gate owns no mutable state: configuration is fixed at construction
/// and the injected backend is the only point of synchronization, so one
/// instance can be shared behind an `Arc` across all requests.
#[derive(Clone)]
pub struct AuthGate {
    config: GateConfig,
    codec: TokenCodec,
    store: TokenStore,
}

impl AuthGate {
    pub fn new(config: GateConfig, backend: Arc<dyn KvBackend>) -> Result<Self> {
        config.validate()?;
        let codec = TokenCodec::new(config.token_length);
        let store =
            TokenStore::new(backend, config.ttl_seconds).with_key_prefix(config.key_prefix.clone());
        Ok(Self {
            config,
            codec,
            store,
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Mints a token for `data`, which must be a JSON object. An empty
    /// object is accepted; anything else is a validation error.
    pub async fn issue_token(&self, data: Value, ttl_override: Option<u64>) -> Result<Token> {
        let claims = match data {
            Value::Object(claims) => claims,
            Value::Null => return Err(Error::Validation("data is absent".into())),
            other => {
                return Err(Error::Validation(format!(
                    "data must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };
        if ttl_override == Some(0) {
            return Err(Error::Validation("ttl must be positive".into()));
        }

        let token = self.codec.generate()?;
        if let Err(e) = self.store.put(&token, Some(claims), ttl_override).await {
            self.log_failure("issue", &e);
            return Err(e);
        }

        debug!(
            token = token.fingerprint(),
            ttl = ttl_override.unwrap_or(self.config.ttl_seconds),
            "token issued"
        );
        Ok(token)
    }

    pub async fn issue_claims<T: Serialize>(
        &self,
        claims: &T,
        ttl_override: Option<u64>,
    ) -> Result<Token> {
        let data = serde_json::to_value(claims).map_err(|e| Error::Validation(e.to_string()))?;
        self.issue_token(data, ttl_override).await
    }

    /// Resolves the `Authorization` header value to its session record.
    pub async fn verify(&self, header: Option<&str>) -> Result<SessionRecord> {
        let result = match self.codec.extract(header) {
            Ok(token) => self.store.get(&token).await,
            Err(e) => Err(e),
        };
        if let Err(ref e) = result {
            self.log_failure("verify", e);
        }
        result
    }

    /// Deletes the token named by the header. `NotFound` means it was
    /// already revoked or has expired.
    pub async fn revoke_token(&self, header: Option<&str>) -> Result<()> {
        let token = match self.codec.extract(header) {
            Ok(token) => token,
            Err(e) => {
                self.log_failure("revoke", &e);
                return Err(e);
            }
        };
        if let Err(e) = self.store.delete(&token).await {
            self.log_failure("revoke", &e);
            return Err(e);
        }

        debug!(token = token.fingerprint(), "token revoked");
        Ok(())
    }

    fn log_failure(&self, operation: &'static str, error: &Error) {
        if error.is_backend() {
            warn!(operation, kind = error.kind(), error = %error, "token store failure");
        } else if self.config.debug_logging {
            debug!(operation, reason = error.kind(), error = %error, "token rejected");
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
