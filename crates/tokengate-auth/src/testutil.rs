//! Backend doubles for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokengate_core::{BackendError, BackendResult, KvBackend};

/// Wraps a backend and counts round trips made through it.
pub struct CountingBackend<B> {
    inner: B,
    calls: AtomicUsize,
}

impl<B: KvBackend> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<B: KvBackend> KvBackend for CountingBackend<B> {
    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> BackendResult<bool> {
        self.record();
        self.inner.set_with_expiry(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.record();
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> BackendResult<bool> {
        self.record();
        self.inner.delete(key).await
    }
}

/// A backend that cannot be reached, or that refuses to acknowledge writes.
#[derive(Default)]
pub struct FailingBackend {
    unacknowledged: bool,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reachable, but never acknowledges a write and holds no keys.
    pub fn unacknowledged() -> Self {
        Self {
            unacknowledged: true,
        }
    }

    fn fail<T>(&self) -> BackendResult<T> {
        Err(BackendError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl KvBackend for FailingBackend {
    async fn set_with_expiry(
        &self,
        _key: &str,
        _value: String,
        _ttl: Duration,
    ) -> BackendResult<bool> {
        if self.unacknowledged {
            return Ok(false);
        }
        self.fail()
    }

    async fn get(&self, _key: &str) -> BackendResult<Option<String>> {
        if self.unacknowledged {
            return Ok(None);
        }
        self.fail()
    }

    async fn delete(&self, _key: &str) -> BackendResult<bool> {
        if self.unacknowledged {
            return Ok(false);
        }
        self.fail()
    }
}
