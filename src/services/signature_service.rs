use std::sync::Arc;

use tracing::{info, warn};

use crate::app::config::MerchantConfig;
use crate::error::Result;
use crate::models::payment::{
    GatewayForm, NotificationForm, NotificationParameters, OrderId, PaymentRequest, SignedPayload,
};
use crate::services::key_derivation::DerivedKeyCipher;
use crate::services::mac::compute_signature;
use crate::services::notification::verify_notification;
use crate::services::order_id::{OrderIdGenerator, TimestampOrderIds};
use crate::services::parameter_encoder::{EncodedParameters, ParameterEncoder};
use crate::services::validation::{validate, ValidatedRequest};
use crate::utils::money::format_amount;

pub const SIGNATURE_VERSION: &str = "HMAC_SHA256_V1";

/// Turns a payment request into the signed form fields the gateway expects.
pub struct PaymentSignatureService {
    config: Arc<MerchantConfig>,
    encoder: ParameterEncoder,
    keys: DerivedKeyCipher,
}

impl PaymentSignatureService {
    pub fn new(config: MerchantConfig, order_ids: Arc<dyn OrderIdGenerator>) -> Self {
        let keys = DerivedKeyCipher::new(config.secret_key(), config.key_derivation);
        Self {
            config: Arc::new(config),
            encoder: ParameterEncoder::new(order_ids),
            keys,
        }
    }

    pub fn with_clock(config: MerchantConfig) -> Self {
        Self::new(config, Arc::new(TimestampOrderIds::new()))
    }

    pub fn config(&self) -> &MerchantConfig {
        &self.config
    }

    pub fn sign(&self, request: &PaymentRequest) -> Result<SignedPayload> {
        let valid = self.validated(request)?;
        let encoded = self.encoder.encode(&valid, &self.config)?;
        self.finish(&valid, encoded)
    }

    /// Same as [`sign`](Self::sign) but with a caller-chosen order number.
    pub fn sign_with_order(&self, request: &PaymentRequest, order: OrderId) -> Result<SignedPayload> {
        let valid = self.validated(request)?;
        let encoded = self.encoder.encode_for_order(&valid, &self.config, order)?;
        self.finish(&valid, encoded)
    }

    pub fn gateway_form(&self, payload: SignedPayload) -> GatewayForm {
        GatewayForm {
            payload,
            url: self.config.gateway_url().to_string(),
        }
    }

    pub fn verify_notification(&self, form: &NotificationForm) -> Result<NotificationParameters> {
        verify_notification(&self.keys, &self.config, form)
    }

    fn validated(&self, request: &PaymentRequest) -> Result<ValidatedRequest> {
        validate(request).map_err(|e| {
            warn!(error = %e, "Payment request rejected");
            e.into()
        })
    }

    fn finish(&self, request: &ValidatedRequest, encoded: EncodedParameters) -> Result<SignedPayload> {
        let key = self.keys.derive(&encoded.order)?;
        let signature = compute_signature(&key, &encoded.merchant_parameters)?;

        info!(
            order = %encoded.order,
            amount = %format_amount(request.amount_cents),
            "Payment parameters signed"
        );

        Ok(SignedPayload {
            signature_version: SIGNATURE_VERSION.to_string(),
            merchant_parameters: encoded.merchant_parameters,
            signature,
            order: encoded.order,
        })
    }
}
