pub mod error;
pub mod traits;
pub mod types;

pub use error::{BackendError, BackendResult, Error, HeaderFault, Result};
pub use traits::*;
pub use types::*;
