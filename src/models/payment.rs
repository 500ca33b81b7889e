use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SignatureError, ValidationError};

// padding optional; URL-safe chars are mapped before decoding
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn decode_base64_lenient(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = input
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    LENIENT.decode(normalized)
}

/// Gateway order number: 4 to 12 characters, the first four numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub const MODULUS: u64 = 1_000_000_000_000;

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = ValidationError::field("order", "must be 4-12 alphanumerics, first 4 digits");
        let len = raw.len();
        if !(4..=12).contains(&len) || !raw.is_ascii() {
            return Err(invalid);
        }
        let (head, tail) = raw.split_at(4);
        if !head.bytes().all(|b| b.is_ascii_digit())
            || !tail.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(invalid);
        }
        Ok(Self(raw.to_string()))
    }

    /// Twelve zero-padded digits of `value mod 10^12`.
    pub fn from_sequence(value: u64) -> Self {
        Self(format!("{:012}", value % Self::MODULUS))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub service: String,
    pub price: String,
    #[serde(alias = "customerName")]
    pub name: String,
    #[serde(alias = "customerEmail")]
    pub email: String,
    #[serde(default, alias = "customerPhone")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantData {
    pub email: String,
    pub phone: String,
}

/// The signed payload. Field order and names are the gateway's wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantParameters {
    #[serde(rename = "DS_MERCHANT_AMOUNT")]
    pub amount: String,
    #[serde(rename = "DS_MERCHANT_ORDER")]
    pub order: String,
    #[serde(rename = "DS_MERCHANT_MERCHANTCODE")]
    pub merchant_code: String,
    #[serde(rename = "DS_MERCHANT_CURRENCY")]
    pub currency: String,
    #[serde(rename = "DS_MERCHANT_TRANSACTIONTYPE")]
    pub transaction_type: String,
    #[serde(rename = "DS_MERCHANT_TERMINAL")]
    pub terminal: String,
    #[serde(rename = "DS_MERCHANT_MERCHANTURL")]
    pub merchant_url: String,
    #[serde(rename = "DS_MERCHANT_URLOK")]
    pub url_ok: String,
    #[serde(rename = "DS_MERCHANT_URLKO")]
    pub url_ko: String,
    #[serde(rename = "DS_MERCHANT_PRODUCTDESCRIPTION")]
    pub product_description: String,
    #[serde(rename = "DS_MERCHANT_TITULAR")]
    pub titular: String,
    #[serde(rename = "DS_MERCHANT_MERCHANTDATA")]
    pub merchant_data: String,
}

impl MerchantParameters {
    pub fn to_base64(&self) -> Result<String, serde_json::Error> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SignatureError> {
        let raw = decode_base64_lenient(encoded)
            .map_err(|e| SignatureError::MalformedPayload(format!("base64: {e}")))?;
        serde_json::from_slice(&raw)
            .map_err(|e| SignatureError::MalformedPayload(format!("json: {e}")))
    }

    pub fn merchant_data(&self) -> Result<MerchantData, serde_json::Error> {
        serde_json::from_str(&self.merchant_data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedPayload {
    #[serde(rename = "Ds_SignatureVersion")]
    pub signature_version: String,
    #[serde(rename = "Ds_MerchantParameters")]
    pub merchant_parameters: String,
    #[serde(rename = "Ds_Signature")]
    pub signature: String,
    #[serde(skip)]
    pub order: OrderId,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayForm {
    #[serde(flatten)]
    pub payload: SignedPayload,
    #[serde(rename = "redsysUrl")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationForm {
    #[serde(rename = "Ds_SignatureVersion")]
    pub signature_version: String,
    #[serde(rename = "Ds_MerchantParameters")]
    pub merchant_parameters: String,
    #[serde(rename = "Ds_Signature")]
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationParameters {
    #[serde(rename = "Ds_Order", alias = "DS_ORDER")]
    pub order: String,
    #[serde(rename = "Ds_Response", alias = "DS_RESPONSE")]
    pub response: String,
    #[serde(rename = "Ds_Amount", alias = "DS_AMOUNT", default)]
    pub amount: Option<String>,
    #[serde(rename = "Ds_Currency", alias = "DS_CURRENCY", default)]
    pub currency: Option<String>,
    #[serde(rename = "Ds_MerchantCode", alias = "DS_MERCHANTCODE", default)]
    pub merchant_code: Option<String>,
    #[serde(rename = "Ds_Terminal", alias = "DS_TERMINAL", default)]
    pub terminal: Option<String>,
    #[serde(rename = "Ds_AuthorisationCode", alias = "DS_AUTHORISATIONCODE", default)]
    pub authorisation_code: Option<String>,
    #[serde(rename = "Ds_MerchantData", alias = "DS_MERCHANTDATA", default)]
    pub merchant_data: Option<String>,
}

impl NotificationParameters {
    /// Response codes 0000-0099 mean the payment was authorised.
    pub fn is_authorised(&self) -> bool {
        self.response
            .trim()
            .parse::<u16>()
            .map(|code| code <= 99)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_parameters() -> MerchantParameters {
        MerchantParameters {
            amount: "75000".into(),
            order: "000000000001".into(),
            merchant_code: "999008881".into(),
            currency: "978".into(),
            transaction_type: "0".into(),
            terminal: "1".into(),
            merchant_url: "https://shop.example.com/n".into(),
            url_ok: "https://shop.example.com/ok".into(),
            url_ko: "https://shop.example.com/ko".into(),
            product_description: "Web".into(),
            titular: "Ana".into(),
            merchant_data: r#"{"email":"a@b.co","phone":""}"#.into(),
        }
    }

    #[test]
    fn order_id_accepts_gateway_shapes() {
        assert!(OrderId::parse("0001").is_ok());
        assert!(OrderId::parse("1234abcXYZ").is_ok());
        assert!(OrderId::parse("000000000001").is_ok());
        assert!(OrderId::parse("123").is_err());
        assert!(OrderId::parse("1234567890123").is_err());
        assert!(OrderId::parse("12a4").is_err());
        assert!(OrderId::parse("1234-").is_err());
    }

    #[test]
    fn order_id_from_sequence_is_twelve_digits() {
        assert_eq!(OrderId::from_sequence(1).as_str(), "000000000001");
        assert_eq!(OrderId::from_sequence(1_760_000_000_123).as_str(), "760000000123");
    }

    #[test]
    fn parameters_serialize_in_declaration_order() {
        let json = serde_json::to_string(&sample_parameters()).unwrap();
        let keys = [
            "DS_MERCHANT_AMOUNT",
            "DS_MERCHANT_ORDER",
            "DS_MERCHANT_MERCHANTCODE",
            "DS_MERCHANT_CURRENCY",
            "DS_MERCHANT_TRANSACTIONTYPE",
            "DS_MERCHANT_TERMINAL",
            "DS_MERCHANT_MERCHANTURL",
            "DS_MERCHANT_URLOK",
            "DS_MERCHANT_URLKO",
            "DS_MERCHANT_PRODUCTDESCRIPTION",
            "DS_MERCHANT_TITULAR",
            "DS_MERCHANT_MERCHANTDATA",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(&format!("\"{k}\"")).expect("key present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }

    #[test]
    fn base64_accepts_url_safe_unpadded_input() {
        let encoded = sample_parameters().to_base64().unwrap();
        let url_safe = encoded.replace('+', "-").replace('/', "_");
        let unpadded = url_safe.trim_end_matches('=');
        assert_eq!(
            MerchantParameters::from_base64(unpadded).unwrap(),
            sample_parameters()
        );
    }

    #[test]
    fn merchant_data_is_nested_json() {
        let data = sample_parameters().merchant_data().unwrap();
        assert_eq!(data.email, "a@b.co");
        assert_eq!(data.phone, "");
    }

    #[test]
    fn gateway_form_flattens_payload() {
        let form = GatewayForm {
            payload: SignedPayload {
                signature_version: "HMAC_SHA256_V1".into(),
                merchant_parameters: "e30=".into(),
                signature: "c2ln".into(),
                order: OrderId::from_sequence(7),
            },
            url: "https://sis-t.redsys.es:25443/sis/realizarPago".into(),
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["Ds_SignatureVersion"], "HMAC_SHA256_V1");
        assert_eq!(value["Ds_MerchantParameters"], "e30=");
        assert_eq!(value["Ds_Signature"], "c2ln");
        assert_eq!(value["redsysUrl"], "https://sis-t.redsys.es:25443/sis/realizarPago");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn authorised_response_codes() {
        let mut params: NotificationParameters =
            serde_json::from_str(r#"{"Ds_Order":"000000000001","Ds_Response":"0000"}"#).unwrap();
        assert!(params.is_authorised());
        params.response = "0099".into();
        assert!(params.is_authorised());
        params.response = "0190".into();
        assert!(!params.is_authorised());
        params.response = "9915".into();
        assert!(!params.is_authorised());
    }

    #[test]
    fn payment_request_accepts_customer_aliases() {
        let request: PaymentRequest = serde_json::from_str(
            r#"{"service":"Web","price":"750€","customerName":"Ana","customerEmail":"a@b.co"}"#,
        )
        .unwrap();
        assert_eq!(request.name, "Ana");
        assert!(request.phone.is_none());
    }
}
