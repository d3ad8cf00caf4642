use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fewer random bytes than this make tokens guessable.
pub const MIN_TOKEN_LENGTH: usize = 16;
pub const MAX_TOKEN_LENGTH: usize = 512;

pub const DEFAULT_TOKEN_LENGTH: usize = 32;
pub const DEFAULT_TTL_SECONDS: u64 = 60 * 60 * 24;

/// Settings shared by the codec, the store and the gate. Read-only once the
/// gate is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Random bytes per token, before hex encoding.
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    #[serde(default)]
    pub debug_logging: bool,

    /// Prepended to every backend key.
    #[serde(default)]
    pub key_prefix: String,
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}

fn default_token_length() -> usize {
    DEFAULT_TOKEN_LENGTH
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            token_length: default_token_length(),
            debug_logging: false,
            key_prefix: String::new(),
        }
    }
}

impl GateConfig {
    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_token_length(mut self, token_length: usize) -> Self {
        self.token_length = token_length;
        self
    }

    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Hex characters in a token of this configuration.
    pub fn token_chars(&self) -> usize {
        self.token_length * 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.ttl_seconds == 0 {
            return Err(Error::Config("ttl_seconds must be positive".into()));
        }
        if !(MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&self.token_length) {
            return Err(Error::Config(format!(
                "token_length must be between {} and {} bytes, got {}",
                MIN_TOKEN_LENGTH, MAX_TOKEN_LENGTH, self.token_length
            )));
        }
        Ok(())
    }
}
