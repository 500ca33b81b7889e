//! Signs card-payment requests for the Redsys gateway (`HMAC_SHA256_V1`) and verifies
//! the notifications it sends back.

pub mod app;
pub mod crypto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use app::config::{GatewayEnvironment, MerchantConfig};
pub use error::{ConfigError, CryptoError, Result, SignatureError, ValidationError};
pub use models::payment::{
    GatewayForm, MerchantParameters, NotificationForm, NotificationParameters, OrderId,
    PaymentRequest, SignedPayload,
};
pub use services::{BatchSigner, KeyDerivation, PaymentSignatureService, SIGNATURE_VERSION};
pub use utils::money::{format_amount, parse_amount};
