use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed amount: {0}")]
    MalformedAmount(String),
    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

impl ValidationError {
    pub fn field(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidField { field, reason }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration value {0}")]
    Missing(&'static str),
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(&'static str),
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("input length {0} is not a multiple of the 8-byte block size")]
    InvalidBlockLength(usize),
    #[error("expected a {expected}-byte key, got {actual} bytes")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("HMAC rejected the signing key")]
    InvalidMacKey,
}

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("failed to serialize merchant parameters: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("malformed gateway payload: {0}")]
    MalformedPayload(String),
    #[error("notification signature does not match")]
    InvalidSignature,
    #[error("notification belongs to merchant {0}")]
    MerchantMismatch(String),
    #[error("signing worker panicked")]
    WorkerPanicked,
}

impl SignatureError {
    /// Status an HTTP layer should answer with: caller mistakes are 4xx, the rest 5xx.
    pub fn http_status(&self) -> u16 {
        match self {
            SignatureError::Validation(_)
            | SignatureError::MalformedPayload(_)
            | SignatureError::InvalidSignature
            | SignatureError::MerchantMismatch(_) => 400,
            _ => 500,
        }
    }
}

pub type Result<T, E = SignatureError> = std::result::Result<T, E>;
