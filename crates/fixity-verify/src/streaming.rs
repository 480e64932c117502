use std::fmt;

use crate::algorithm::ChecksumAlgorithm;
use crate::hasher::{Crc32cHasher, Hasher, Md5Hasher, Sha256Hasher, Sha512Hasher};

enum State {
    Sha256(Sha256Hasher),
    Sha512(Sha512Hasher),
    Md5(Md5Hasher),
    Crc32c(Crc32cHasher),
}

/// Running digest for one object stream.
///
/// Finalizing consumes the accumulator, so a digest can only be produced once
/// per stream.
pub struct StreamingDigest {
    algorithm: ChecksumAlgorithm,
    state: State,
}

impl StreamingDigest {
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        let state = match algorithm {
            ChecksumAlgorithm::Sha256 => State::Sha256(Sha256Hasher::new()),
            ChecksumAlgorithm::Sha512 => State::Sha512(Sha512Hasher::new()),
            ChecksumAlgorithm::Md5 => State::Md5(Md5Hasher::new()),
            ChecksumAlgorithm::Crc32c => State::Crc32c(Crc32cHasher::new()),
        };
        Self { algorithm, state }
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm { self.algorithm }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            State::Sha256(h) => h.update(data),
            State::Sha512(h) => h.update(data),
            State::Md5(h) => h.update(data),
            State::Crc32c(h) => h.update(data),
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self.state {
            State::Sha256(h) => h.finalize(),
            State::Sha512(h) => h.finalize(),
            State::Md5(h) => h.finalize(),
            State::Crc32c(h) => h.finalize(),
        }
    }

    /// Lowercase hex of the final digest.
    pub fn finalize_hex(self) -> String { hex::encode(self.finalize()) }
}

impl fmt::Debug for StreamingDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingDigest")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
