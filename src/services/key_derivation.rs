use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::crypto::triple_des::KEY_SIZE;
use crate::crypto::{cbc_encrypt, TripleDes, BLOCK_SIZE};
use crate::error::{ConfigError, CryptoError};
use crate::models::payment::OrderId;

const ZERO_IV: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDerivation {
    /// First 8 bytes of the order, one 3DES block, 8-byte key.
    #[default]
    SingleBlock,
    /// Whole order zero-padded to the block size, 3DES-CBC, 16-byte key for 12 digits.
    FullOrder,
}

impl FromStr for KeyDerivation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single_block" | "single-block" => Ok(Self::SingleBlock),
            "full_order" | "full-order" => Ok(Self::FullOrder),
            other => Err(ConfigError::InvalidValue {
                field: "key_derivation",
                reason: format!("unknown mode {other:?}"),
            }),
        }
    }
}

/// The merchant's 3DES key, expanded to 24 bytes.
///
/// A shorter key is copied once more right after itself and the rest is zero-filled:
/// 16 bytes become K1 K2 K1, 8 bytes become K K 0.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<[u8; KEY_SIZE]>);

impl SecretKey {
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        let raw = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|_| ConfigError::InvalidSecretKey("not valid base64"))?,
        );
        Self::from_bytes(&raw)
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::InvalidSecretKey("key is empty"));
        }
        if raw.len() > KEY_SIZE {
            return Err(ConfigError::InvalidSecretKey("key is longer than 24 bytes"));
        }

        let len = raw.len();
        let repeat = len.min(KEY_SIZE - len);
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        key[..len].copy_from_slice(raw);
        key[len..len + repeat].copy_from_slice(&raw[..repeat]);
        Ok(Self(key))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(**redacted**)")
    }
}

pub struct SigningKey(Zeroizing<Vec<u8>>);

impl SigningKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey({} bytes, **redacted**)", self.0.len())
    }
}

#[derive(Debug, Clone)]
pub struct DerivedKeyCipher {
    cipher: TripleDes,
    mode: KeyDerivation,
}

impl DerivedKeyCipher {
    pub fn new(secret: &SecretKey, mode: KeyDerivation) -> Self {
        Self {
            cipher: TripleDes::new(&secret.0),
            mode,
        }
    }

    pub fn derive(&self, order: &OrderId) -> Result<SigningKey, CryptoError> {
        let plaintext = self.plaintext(order.as_str().as_bytes());
        let key = cbc_encrypt(&self.cipher, ZERO_IV, &plaintext)?;
        Ok(SigningKey(Zeroizing::new(key)))
    }

    fn plaintext(&self, order: &[u8]) -> Vec<u8> {
        let (take, len) = match self.mode {
            KeyDerivation::SingleBlock => (order.len().min(BLOCK_SIZE), BLOCK_SIZE),
            KeyDerivation::FullOrder => {
                let blocks = order.len().div_ceil(BLOCK_SIZE).max(1);
                (order.len(), blocks * BLOCK_SIZE)
            }
        };
        let mut padded = vec![0u8; len];
        padded[..take].copy_from_slice(&order[..take]);
        padded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "sq7HjrUOBfKmC576ILgskD5srU870gJ7";

    fn derive(secret: &str, order: &str, mode: KeyDerivation) -> String {
        let secret = SecretKey::from_base64(secret).unwrap();
        let key = DerivedKeyCipher::new(&secret, mode)
            .derive(&OrderId::parse(order).unwrap())
            .unwrap();
        hex::encode(key.as_bytes())
    }

    #[test]
    fn single_block_key_matches_reference() {
        assert_eq!(
            derive(TEST_KEY, "000000000001", KeyDerivation::SingleBlock),
            "2f175c360a1a59f3"
        );
    }

    #[test]
    fn full_order_key_matches_reference() {
        assert_eq!(
            derive(TEST_KEY, "000000000001", KeyDerivation::FullOrder),
            "2f175c360a1a59f3d7a597b9b6e08d48"
        );
    }

    #[test]
    fn single_block_only_reads_first_eight_bytes() {
        assert_eq!(
            derive(TEST_KEY, "000000009999", KeyDerivation::SingleBlock),
            derive(TEST_KEY, "000000000001", KeyDerivation::SingleBlock)
        );
    }

    #[test]
    fn short_orders_are_zero_padded() {
        let secret = SecretKey::from_base64(TEST_KEY).unwrap();
        let cipher = DerivedKeyCipher::new(&secret, KeyDerivation::SingleBlock);
        assert_eq!(cipher.plaintext(b"1234"), b"1234\0\0\0\0".to_vec());
        let cipher = DerivedKeyCipher::new(&secret, KeyDerivation::FullOrder);
        assert_eq!(cipher.plaintext(b"1234"), b"1234\0\0\0\0".to_vec());
        assert_eq!(cipher.plaintext(b"123456789").len(), 16);
    }

    #[test]
    fn sixteen_byte_key_is_two_key_triple_des() {
        // K1 K2 K1, cross-checked against `openssl enc -des-ede`
        assert_eq!(
            derive("AQIDBAUGBwgJCgsMDQ4PEA==", "000000000001", KeyDerivation::SingleBlock),
            "c53d96bd7deca43e"
        );
    }

    #[test]
    fn eight_byte_key_gets_zero_third_part() {
        // K K 0, cross-checked against `openssl enc -des-ede3-cbc`
        assert_eq!(
            derive("AQIDBAUGBwg=", "000000000001", KeyDerivation::SingleBlock),
            "de8d55142b18deb7"
        );
    }

    #[test]
    fn short_key_is_repeated_once_then_zero_filled() {
        let key = SecretKey::from_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(key.0[..7], [1, 2, 3, 1, 2, 3, 0]);
        assert!(key.0[6..].iter().all(|&b| b == 0));

        let eight = SecretKey::from_bytes(&[9; 8]).unwrap();
        assert_eq!(eight.0[..16], [9; 16]);
        assert_eq!(eight.0[16..], [0; 8]);
    }

    #[test]
    fn keys_from_twelve_bytes_wrap_without_zeros() {
        let raw: Vec<u8> = (1..=12).collect();
        let key = SecretKey::from_bytes(&raw).unwrap();
        assert_eq!(key.0[..12], raw[..]);
        assert_eq!(key.0[12..], raw[..]);

        let raw: Vec<u8> = (1..=20).collect();
        let key = SecretKey::from_bytes(&raw).unwrap();
        assert_eq!(key.0[20..], [1, 2, 3, 4]);
    }

    #[test]
    fn rejects_unusable_keys() {
        assert!(matches!(
            SecretKey::from_base64(""),
            Err(ConfigError::InvalidSecretKey(_))
        ));
        assert!(matches!(
            SecretKey::from_base64("not base64!"),
            Err(ConfigError::InvalidSecretKey(_))
        ));
        assert!(matches!(
            SecretKey::from_base64("AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGQ=="),
            Err(ConfigError::InvalidSecretKey(_))
        ));
    }

    #[test]
    fn debug_output_never_shows_key_bytes() {
        let secret = SecretKey::from_base64(TEST_KEY).unwrap();
        assert_eq!(format!("{secret:?}"), "SecretKey(**redacted**)");
        let key = DerivedKeyCipher::new(&secret, KeyDerivation::FullOrder)
            .derive(&OrderId::from_sequence(1))
            .unwrap();
        assert_eq!(format!("{key:?}"), "SigningKey(16 bytes, **redacted**)");
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("single_block".parse::<KeyDerivation>().unwrap(), KeyDerivation::SingleBlock);
        assert_eq!("FULL-ORDER".parse::<KeyDerivation>().unwrap(), KeyDerivation::FullOrder);
        assert!("triple".parse::<KeyDerivation>().is_err());
    }
}
