//! Verification of the signed callback the gateway posts to the merchant URL.

use tracing::{debug, warn};

use super::key_derivation::DerivedKeyCipher;
use super::mac::verify_signature;
use super::signature_service::SIGNATURE_VERSION;
use crate::app::config::MerchantConfig;
use crate::error::{Result, SignatureError};
use crate::models::payment::{
    decode_base64_lenient, NotificationForm, NotificationParameters, OrderId,
};

pub fn verify_notification(
    keys: &DerivedKeyCipher,
    config: &MerchantConfig,
    form: &NotificationForm,
) -> Result<NotificationParameters> {
    if form.signature_version.trim() != SIGNATURE_VERSION {
        return Err(SignatureError::MalformedPayload(format!(
            "unsupported signature version {:?}",
            form.signature_version
        )));
    }

    let raw = decode_base64_lenient(&form.merchant_parameters)
        .map_err(|e| SignatureError::MalformedPayload(format!("base64: {e}")))?;
    let params: NotificationParameters = serde_json::from_slice(&raw)
        .map_err(|e| SignatureError::MalformedPayload(format!("json: {e}")))?;

    let order = OrderId::parse(params.order.trim()).map_err(|_| {
        SignatureError::MalformedPayload(format!("invalid order {:?}", params.order))
    })?;

    let provided =
        decode_base64_lenient(&form.signature).map_err(|_| SignatureError::InvalidSignature)?;
    // A chave vem do Ds_Order da própria notificação
    let key = keys.derive(&order)?;
    if !verify_signature(&key, &form.merchant_parameters, &provided)? {
        warn!(order = %order, "Notification signature mismatch");
        return Err(SignatureError::InvalidSignature);
    }

    if let Some(code) = params.merchant_code.as_deref() {
        if code.trim() != config.merchant_code {
            warn!(order = %order, merchant_code = code, "Notification for another merchant");
            return Err(SignatureError::MerchantMismatch(code.to_string()));
        }
    }

    debug!(order = %order, response = %params.response, "Notification verified");
    Ok(params)
}
