pub mod backend;
mod codec;
mod gate;
mod middleware;
mod store;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

#[cfg(feature = "redis")]
pub use backend::RedisBackend;
pub use backend::{MemoryBackend, SledBackend};
pub use codec::TokenCodec;
pub use gate::AuthGate;
pub use middleware::{AuthLayer, AuthService, Authenticated};
pub use store::TokenStore;
