use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("malformed authorization header: {0}")]
    MalformedHeader(HeaderFault),

    #[error("token generation failed: {0}")]
    Generation(String),

    #[error("token not found")]
    NotFound,

    #[error("store read failed: {0}")]
    StoreRead(String),

    #[error("store write failed: {0}")]
    StoreWrite(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures caused by the backend rather than by the caller.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::StoreRead(_) | Error::StoreWrite(_))
    }

    /// Short stable label used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::MalformedHeader(_) => "malformed_header",
            Error::Generation(_) => "generation",
            Error::NotFound => "not_found",
            Error::StoreRead(_) => "store_read",
            Error::StoreWrite(_) => "store_write",
            Error::Config(_) => "config",
        }
    }
}

/// Which check an authorization header failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderFault {
    #[error("header is absent")]
    Missing,

    #[error("expected 2 fields, found {0}")]
    FieldCount(usize),

    #[error("token length {actual}, expected {expected}")]
    TokenLength { expected: usize, actual: usize },

    #[error("token is not lowercase hex")]
    NotLowercaseHex,
}

impl From<HeaderFault> for Error {
    fn from(fault: HeaderFault) -> Self {
        Error::MalformedHeader(fault)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a key-value backend. The token store decides whether
/// it surfaces as a read or a write error.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend error: {0}")]
    Internal(String),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;
