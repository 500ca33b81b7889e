use std::sync::Arc;

use crate::app::config::MerchantConfig;
use crate::error::Result;
use crate::models::payment::{MerchantData, MerchantParameters, OrderId};
use crate::services::order_id::OrderIdGenerator;
use crate::services::validation::ValidatedRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedParameters {
    pub merchant_parameters: String,
    pub order: OrderId,
}

#[derive(Clone)]
pub struct ParameterEncoder {
    order_ids: Arc<dyn OrderIdGenerator>,
}

impl ParameterEncoder {
    pub fn new(order_ids: Arc<dyn OrderIdGenerator>) -> Self {
        Self { order_ids }
    }

    pub fn encode(
        &self,
        request: &ValidatedRequest,
        config: &MerchantConfig,
    ) -> Result<EncodedParameters> {
        let order = self.order_ids.next_order_id();
        self.encode_for_order(request, config, order)
    }

    pub fn encode_for_order(
        &self,
        request: &ValidatedRequest,
        config: &MerchantConfig,
        order: OrderId,
    ) -> Result<EncodedParameters> {
        let merchant_parameters = build_parameters(request, config, &order)?.to_base64()?;
        Ok(EncodedParameters {
            merchant_parameters,
            order,
        })
    }
}

pub fn build_parameters(
    request: &ValidatedRequest,
    config: &MerchantConfig,
    order: &OrderId,
) -> Result<MerchantParameters> {
    let merchant_data = serde_json::to_string(&MerchantData {
        email: request.email.clone(),
        phone: request.phone.clone(),
    })?;

    let product_description = match &config.product_description_prefix {
        Some(prefix) => format!("{} - {}", prefix, request.service),
        None => request.service.clone(),
    };

    Ok(MerchantParameters {
        amount: request.amount_cents.to_string(),
        order: order.to_string(),
        merchant_code: config.merchant_code.clone(),
        currency: config.currency.clone(),
        transaction_type: config.transaction_type.clone(),
        terminal: config.terminal.clone(),
        merchant_url: config.merchant_url.clone(),
        url_ok: config.url_ok.clone(),
        url_ko: config.url_ko.clone(),
        product_description,
        titular: request.name.clone(),
        merchant_data,
    })
}
