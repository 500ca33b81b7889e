use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::key_derivation::SigningKey;
use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

fn keyed(key: &SigningKey, merchant_parameters: &str) -> Result<HmacSha256, CryptoError> {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::InvalidMacKey)?;
    mac.update(merchant_parameters.as_bytes());
    Ok(mac)
}

/// HMAC-SHA256 over the base64 parameter string itself, returned as standard base64.
pub fn compute_signature(key: &SigningKey, merchant_parameters: &str) -> Result<String, CryptoError> {
    let digest = keyed(key, merchant_parameters)?.finalize().into_bytes();
    Ok(STANDARD.encode(digest))
}

// raw signature, already base64-decoded; constant time
pub fn verify_signature(
    key: &SigningKey,
    merchant_parameters: &str,
    provided: &[u8],
) -> Result<bool, CryptoError> {
    Ok(keyed(key, merchant_parameters)?.verify_slice(provided).is_ok())
}
