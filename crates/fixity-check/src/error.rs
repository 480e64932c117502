//! Error types for fixity-check.

use fixity_verify::VerifyError;
use thiserror::Error;

use crate::data::{FixityCheckStatus, RecordId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Could not find object: bucket={bucket}, path={path}")]
    ObjectNotFound { bucket: String, path: String },

    #[error("Store reported an object size of {reported} bytes, but we only received {read} bytes")]
    ReportedSizeMismatch { reported: u64, read: u64 },

    #[error("object store error: bucket={bucket}, path={path}: {message}")]
    ObjectStore {
        bucket:  String,
        path:    String,
        message: String,
    },

    #[error("fixity check record {0} not found")]
    RecordNotFound(RecordId),

    #[error("job identifier {0:?} is already in use")]
    DuplicateJobIdentifier(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: FixityCheckStatus,
        to:   FixityCheckStatus,
    },

    #[error("invalid record update: {0}")]
    InvalidUpdate(&'static str),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Verify(VerifyError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<VerifyError> for Error {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::UnsupportedAlgorithm(name) => Error::UnsupportedAlgorithm(name),
            other => Error::Verify(other),
        }
    }
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self { Error::Persistence(e.to_string()) }
}

impl From<postcard::Error> for Error {
    fn from(e: postcard::Error) -> Self { Error::Persistence(e.to_string()) }
}

impl From<sled::transaction::TransactionError<Error>> for Error {
    fn from(e: sled::transaction::TransactionError<Error>) -> Self {
        match e {
            sled::transaction::TransactionError::Abort(inner) => inner,
            sled::transaction::TransactionError::Storage(storage) => storage.into(),
        }
    }
}

/// Failure reported by an object store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no such object")]
    NotFound,

    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn transport(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoreError::Transport(e.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::Transport(Box::new(e)),
        }
    }
}
