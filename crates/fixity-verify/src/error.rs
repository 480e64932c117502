#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid hex string: {0:?}")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
