mod memory;
#[cfg(feature = "redis")]
mod redis;
mod sled;

use std::time::Duration;

pub use self::memory::MemoryBackend;
#[cfg(feature = "redis")]
pub use self::redis::RedisBackend;
pub use self::sled::SledBackend;

/// Longest expiry a backend honours; larger TTLs are clamped to it.
pub const MAX_EXPIRY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);
