//! Utility functions for bech32 encoding of identifiers

use bech32::{Bech32m, Hrp};

use crate::error::IdError;

/// Human readable prefix carried by every rendered coupon id.
pub fn coupon_hrp() -> Hrp {
    Hrp::parse_unchecked("coupon_")
}

// encode raw id bytes under the given prefix using bech32m
pub fn bytes_to_bech32(hrp: Hrp, bytes: &[u8]) -> Result<String, IdError> {
    let encoded = bech32::encode::<Bech32m>(hrp, bytes)?;
    Ok(encoded)
}

/// Decodes a bech32 string, rejecting anything not carrying the `expected` prefix.
pub fn bech32_to_bytes(expected: Hrp, encoded: &str) -> Result<Vec<u8>, IdError> {
    let (hrp, data) = bech32::decode(encoded)?;
    if hrp != expected {
        return Err(IdError::WrongPrefix(hrp.to_string()));
    }
    Ok(data)
}
