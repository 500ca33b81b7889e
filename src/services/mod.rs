pub mod batch_signer;
pub mod key_derivation;
pub mod mac;
pub mod notification;
pub mod order_id;
pub mod parameter_encoder;
pub mod signature_service;
pub mod validation;

pub use batch_signer::BatchSigner;
pub use key_derivation::{DerivedKeyCipher, KeyDerivation, SecretKey, SigningKey};
pub use order_id::{FixedOrderId, OrderIdGenerator, TimestampOrderIds};
pub use signature_service::{PaymentSignatureService, SIGNATURE_VERSION};
