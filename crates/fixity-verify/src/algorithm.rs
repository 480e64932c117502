use std::fmt;
use std::str::FromStr;

use crate::streaming::StreamingDigest;
use crate::{Result, VerifyError};

/// Checksum algorithms a fixity check can be run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha512,
    Md5,
    Crc32c,
}

impl ChecksumAlgorithm {
    pub const ALL: [ChecksumAlgorithm; 4] = [Self::Sha256, Self::Sha512, Self::Md5, Self::Crc32c];

    /// Name used in requests, records and broadcast messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Md5 => "md5",
            Self::Crc32c => "crc32c",
        }
    }

    /// Digest length in bytes.
    pub fn digest_length(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
            Self::Md5 => 16,
            Self::Crc32c => 4,
        }
    }

    /// Fresh accumulator for this algorithm.
    pub fn digest(self) -> StreamingDigest { StreamingDigest::new(self) }
}

impl FromStr for ChecksumAlgorithm {
    type Err = VerifyError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "md5" => Ok(Self::Md5),
            "crc32c" => Ok(Self::Crc32c),
            other => Err(VerifyError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Resolve an algorithm name into a streaming accumulator.
///
/// Unknown names fail here, before any bytes are requested from a store.
pub fn for_algorithm(name: &str) -> Result<StreamingDigest> {
    name.parse::<ChecksumAlgorithm>().map(ChecksumAlgorithm::digest)
}
