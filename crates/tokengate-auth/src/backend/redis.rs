use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::RedisError;
use tokengate_core::{BackendError, BackendResult, KvBackend};

use super::MAX_EXPIRY;

/// Redis backend. Expiry is native: writes go out as `SET key value EX ttl`.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    pub async fn connect(url: &str) -> BackendResult<Self> {
        let client = redis::Client::open(url).map_err(redis_error)?;
        let conn = ConnectionManager::new(client).await.map_err(redis_error)?;
        Ok(Self { conn })
    }
}

fn redis_error(e: RedisError) -> BackendError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        BackendError::Unavailable(e.to_string())
    } else {
        BackendError::Internal(e.to_string())
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> BackendResult<bool> {
        let seconds = ttl.min(MAX_EXPIRY).as_secs().max(1);
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(reply.as_deref() == Some("OK"))
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let mut conn = self.conn.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(redis_error)
    }

    async fn delete(&self, key: &str) -> BackendResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::ErrorKind;

    #[test]
    fn test_error_classification() {
        let refused = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(redis_error(refused), BackendError::Unavailable(_)));

        let reply = RedisError::from((ErrorKind::ResponseError, "invalid expire time"));
        assert!(matches!(redis_error(reply), BackendError::Internal(_)));

        let typed = RedisError::from((ErrorKind::TypeError, "unexpected reply"));
        assert!(matches!(redis_error(typed), BackendError::Internal(_)));
    }
}
