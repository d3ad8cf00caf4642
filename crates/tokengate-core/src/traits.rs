use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendResult;

/// Key-value store the token store is built on.
///
/// Implementations must make `set_with_expiry` a single atomic operation: a
/// key must never be observable without its expiry.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Writes `value` under `key`, expiring after `ttl`. Returns the
    /// backend's acknowledgement.
    async fn set_with_expiry(&self, key: &str, value: String, ttl: Duration)
        -> BackendResult<bool>;

    /// Returns the live value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Removes `key`. Returns `true` if a live value was removed.
    async fn delete(&self, key: &str) -> BackendResult<bool>;
}
