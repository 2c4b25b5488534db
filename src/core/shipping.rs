use crate::core::response::send_or_message;
use crate::domain::model::{ShippingEstimate, ShippingEstimateRequest};
use crate::domain::ports::{ApiRequest, Transport};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::validate_non_empty_string;

pub const SHIPPING_ESTIMATE_FALLBACK: &str = "Lỗi khi tính phí giao hàng";

pub struct ShippingApi<T: Transport> {
    transport: T,
}

impl<T: Transport> ShippingApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Quotes the delivery fee for `address` with `carrier`.
    ///
    /// Every failure after validation, including an unreachable backend, comes back as
    /// [`ClientError::EstimationFailed`] whose message is never empty.
    pub async fn estimate_shipping(&self, address: &str, carrier: &str) -> Result<ShippingEstimate> {
        validate_non_empty_string("address", address)?;
        validate_non_empty_string("carrier", carrier)?;

        let body = ShippingEstimateRequest {
            address: address.to_string(),
            carrier: carrier.to_string(),
        };
        let request = ApiRequest::post(["shipping", "estimate"]).json(&body)?;

        let response = send_or_message(&self.transport, request, SHIPPING_ESTIMATE_FALLBACK)
            .await
            .map_err(|message| ClientError::EstimationFailed { message })?;

        let estimate: ShippingEstimate = response.json().map_err(|e| {
            tracing::warn!("Unreadable shipping estimate: {}", e);
            ClientError::EstimationFailed {
                message: SHIPPING_ESTIMATE_FALLBACK.to_string(),
            }
        })?;
        tracing::debug!("Shipping via {} costs {}", carrier, estimate.fee);
        Ok(estimate)
    }
}
