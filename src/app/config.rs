use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use url::Url;

use crate::error::ConfigError;
use crate::services::key_derivation::{KeyDerivation, SecretKey};

const TEST_GATEWAY_URL: &str = "https://sis-t.redsys.es:25443/sis/realizarPago";
const PRODUCTION_GATEWAY_URL: &str = "https://sis.redsys.es/sis/realizarPago";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    #[default]
    Test,
    Production,
}

impl GatewayEnvironment {
    pub fn payment_url(&self) -> &'static str {
        match self {
            GatewayEnvironment::Test => TEST_GATEWAY_URL,
            GatewayEnvironment::Production => PRODUCTION_GATEWAY_URL,
        }
    }
}

impl FromStr for GatewayEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "sandbox" => Ok(Self::Test),
            "production" | "live" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue {
                field: "environment",
                reason: format!("unknown environment {other:?}"),
            }),
        }
    }
}

#[derive(Clone)]
pub struct MerchantConfig {
    pub merchant_code: String,
    pub terminal: String,
    pub currency: String,
    pub transaction_type: String,
    pub merchant_url: String,
    pub url_ok: String,
    pub url_ko: String,
    pub product_description_prefix: Option<String>,
    pub environment: GatewayEnvironment,
    pub key_derivation: KeyDerivation,
    secret_key: SecretKey,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    merchant_code: String,
    #[serde(default = "default_terminal")]
    terminal: String,
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default = "default_transaction_type")]
    transaction_type: String,
    merchant_url: String,
    url_ok: String,
    url_ko: String,
    #[serde(default)]
    product_description_prefix: Option<String>,
    #[serde(default)]
    environment: GatewayEnvironment,
    #[serde(default)]
    key_derivation: KeyDerivation,
    secret_key: String,
}

fn default_terminal() -> String {
    "1".to_string()
}

fn default_currency() -> String {
    "978".to_string()
}

fn default_transaction_type() -> String {
    "0".to_string()
}

impl MerchantConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`MerchantConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        FileConfig {
            merchant_code: required("REDSYS_MERCHANT_CODE")?,
            terminal: optional("REDSYS_TERMINAL").unwrap_or_else(default_terminal),
            currency: optional("REDSYS_CURRENCY").unwrap_or_else(default_currency),
            transaction_type: optional("REDSYS_TRANSACTION_TYPE")
                .unwrap_or_else(default_transaction_type),
            merchant_url: required("REDSYS_MERCHANT_URL")?,
            url_ok: required("REDSYS_URL_OK")?,
            url_ko: required("REDSYS_URL_KO")?,
            product_description_prefix: optional("REDSYS_DESCRIPTION_PREFIX"),
            environment: optional("REDSYS_ENVIRONMENT")
                .map(|v| v.parse::<GatewayEnvironment>())
                .transpose()?
                .unwrap_or_default(),
            key_derivation: optional("REDSYS_KEY_DERIVATION")
                .map(|v| v.parse::<KeyDerivation>())
                .transpose()?
                .unwrap_or_default(),
            secret_key: required("REDSYS_SECRET_KEY")?,
        }
        .try_into()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str::<FileConfig>(raw)?.try_into()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn gateway_url(&self) -> &'static str {
        self.environment.payment_url()
    }
}

impl TryFrom<FileConfig> for MerchantConfig {
    type Error = ConfigError;

    fn try_from(raw: FileConfig) -> Result<Self, Self::Error> {
        let merchant_code = digits("merchant_code", raw.merchant_code, 1..=9)?;
        let terminal = digits("terminal", raw.terminal, 1..=3)?;
        let currency = digits("currency", raw.currency, 3..=3)?;

        let transaction_type = raw.transaction_type.trim().to_string();
        if transaction_type.len() != 1 || !transaction_type.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidValue {
                field: "transaction_type",
                reason: "must be a single alphanumeric character".to_string(),
            });
        }

        Ok(Self {
            merchant_code,
            terminal,
            currency,
            transaction_type,
            merchant_url: http_url("merchant_url", raw.merchant_url)?,
            url_ok: http_url("url_ok", raw.url_ok)?,
            url_ko: http_url("url_ko", raw.url_ko)?,
            product_description_prefix: raw
                .product_description_prefix
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            environment: raw.environment,
            key_derivation: raw.key_derivation,
            secret_key: SecretKey::from_base64(&raw.secret_key)?,
        })
    }
}

impl fmt::Debug for MerchantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantConfig")
            .field("merchant_code", &self.merchant_code)
            .field("terminal", &self.terminal)
            .field("currency", &self.currency)
            .field("transaction_type", &self.transaction_type)
            .field("merchant_url", &self.merchant_url)
            .field("url_ok", &self.url_ok)
            .field("url_ko", &self.url_ko)
            .field("product_description_prefix", &self.product_description_prefix)
            .field("environment", &self.environment)
            .field("key_derivation", &self.key_derivation)
            .field("secret_key", &self.secret_key)
            .finish()
    }
}

fn digits(
    field: &'static str,
    value: String,
    len: std::ops::RangeInclusive<usize>,
) -> Result<String, ConfigError> {
    let value = value.trim().to_string();
    if !len.contains(&value.len()) || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected {}-{} digits, got {value:?}", len.start(), len.end()),
        });
    }
    Ok(value)
}

// Stored as given: it goes on the wire verbatim.
fn http_url(field: &'static str, value: String) -> Result<String, ConfigError> {
    let value = value.trim().to_string();
    let parsed = Url::parse(&value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    Ok(value)
}
