//! Streaming digest selection for object fixity checks.
//!
//! Maps a checksum algorithm name onto an incremental accumulator that can be
//! fed an object one chunk at a time. Unknown names are rejected at selection
//! time so a malformed request never reaches the object store.
//!
//! # Example
//!
//! ```
//! use fixity_verify::for_algorithm;
//!
//! let mut digest = for_algorithm("sha256").unwrap();
//! digest.update(b"hello ");
//! digest.update(b"world");
//!
//! assert_eq!(
//!     digest.finalize_hex(),
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//! );
//! ```

pub use self::algorithm::{ChecksumAlgorithm, for_algorithm};
pub use self::streaming::StreamingDigest;
pub use self::error::{Result, VerifyError};
pub use self::hasher::{Crc32cHasher, DigestHasher, Hasher, Md5Hasher, Sha256Hasher, Sha512Hasher};
pub use self::encoding::{bin_to_hex, hex_to_bin};

mod algorithm;
mod encoding;
mod error;
mod hasher;
mod streaming;
