//! Conversions between hex digests and raw digest bytes.

use crate::error::{Result, VerifyError};

/// Decode a hex string of an even number of hex digits (either case).
pub fn hex_to_bin(hex_string: &str) -> Result<Vec<u8>> {
    hex::decode(hex_string).map_err(|_| VerifyError::InvalidHex(hex_string.to_string()))
}

/// Lowercase hex encoding of `bytes`.
pub fn bin_to_hex(bytes: &[u8]) -> String { hex::encode(bytes) }
