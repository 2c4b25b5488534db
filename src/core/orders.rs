use crate::core::response::{confirmation_text, send_or_message};
use crate::domain::model::{Order, OrderStatus};
use crate::domain::ports::{ApiRequest, ApiResponse, Transport};
use crate::utils::error::{ClientError, Result};
use serde::de::DeserializeOwned;

const LIST_ORDERS_FALLBACK: &str = "Lỗi khi tải danh sách đơn hàng";
const GET_ORDER_FALLBACK: &str = "Lỗi khi tải chi tiết đơn hàng";
const UPDATE_STATUS_FALLBACK: &str = "Lỗi khi cập nhật trạng thái đơn hàng";
const CANCEL_ORDER_FALLBACK: &str = "Lỗi khi hủy đơn hàng";
const DELETE_ORDER_FALLBACK: &str = "Lỗi khi xóa đơn hàng";

/// Order listing and status changes. Failures are reported as
/// [`ClientError::OrderFailed`] with the backend's message or a fixed fallback.
pub struct OrderApi<T: Transport> {
    transport: T,
}

impl<T: Transport> OrderApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let response = self
            .call(ApiRequest::get(["orders"]), LIST_ORDERS_FALLBACK)
            .await?;
        decode(&response, LIST_ORDERS_FALLBACK)
    }

    pub async fn get_order(&self, id: u64) -> Result<Order> {
        let response = self
            .call(ApiRequest::get(["orders".to_string(), id.to_string()]), GET_ORDER_FALLBACK)
            .await?;
        decode(&response, GET_ORDER_FALLBACK)
    }

    pub async fn update_order_status(&self, id: u64, status: OrderStatus) -> Result<Order> {
        let request = ApiRequest::put(["orders".to_string(), id.to_string(), "status".to_string()])
            .text(status.as_str());
        let response = self.call(request, UPDATE_STATUS_FALLBACK).await?;
        tracing::info!("Order {} moved to {}", id, status);
        decode(&response, UPDATE_STATUS_FALLBACK)
    }

    pub async fn cancel_order(&self, id: u64) -> Result<Order> {
        let request = ApiRequest::put(["orders".to_string(), id.to_string(), "cancel".to_string()]);
        let response = self.call(request, CANCEL_ORDER_FALLBACK).await?;
        tracing::info!("Order {} cancelled", id);
        decode(&response, CANCEL_ORDER_FALLBACK)
    }

    pub async fn delete_order(&self, id: u64) -> Result<String> {
        let request = ApiRequest::delete(["orders".to_string(), id.to_string()]);
        let response = self.call(request, DELETE_ORDER_FALLBACK).await?;
        tracing::info!("Order {} deleted", id);
        Ok(confirmation_text(&response, || format!("Order {} deleted", id)))
    }

    async fn call(&self, request: ApiRequest, fallback: &str) -> Result<ApiResponse> {
        send_or_message(&self.transport, request, fallback)
            .await
            .map_err(|message| ClientError::OrderFailed { message })
    }
}

fn decode<R: DeserializeOwned>(response: &ApiResponse, fallback: &str) -> Result<R> {
    response.json().map_err(|e| {
        tracing::warn!("Unreadable order response: {}", e);
        ClientError::OrderFailed {
            message: fallback.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockTransport;
    use crate::domain::ports::{HttpMethod, RequestBody};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn order_json(id: u64, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "status": status,
            "createdAt": "2026-10-01T09:30:00",
            "totalPrice": 25990000,
            "shippingFee": 30000,
            "paymentMethod": "COD",
            "paymentStatus": "PENDING",
            "orderDetails": [{"productId": 4, "quantity": 1}]
        })
    }

    #[tokio::test]
    async fn test_list_orders() {
        let transport = MockTransport::new()
            .respond_json(200, json!([order_json(1, "PENDING"), order_json(2, "SHIPPED")]));
        let api = OrderApi::new(transport);

        let orders = api.list_orders().await.unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].status, OrderStatus::Shipped);
        assert_eq!(orders[0].total_price, Some(dec!(25990000)));
        assert_eq!(orders[0].order_details.len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_sends_plain_text() {
        let transport = MockTransport::new().respond_json(200, order_json(7, "CONFIRMED"));
        let api = OrderApi::new(transport.clone());

        let order = api.update_order_status(7, OrderStatus::Confirmed).await.unwrap();

        assert_eq!(order.status, OrderStatus::Confirmed);
        let requests = transport.requests().await;
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert_eq!(requests[0].path(), "/orders/7/status");
        assert_eq!(
            requests[0].body,
            Some(RequestBody::Text("CONFIRMED".to_string()))
        );
    }

    #[tokio::test]
    async fn test_cancel_failure_uses_backend_message() {
        let transport = MockTransport::new()
            .respond_json(400, json!({"message": "Order already shipped"}));
        let api = OrderApi::new(transport);

        let err = api.cancel_order(3).await.unwrap_err();
        assert_eq!(err.user_friendly_message(), "Order already shipped");
    }

    #[tokio::test]
    async fn test_get_order_falls_back_when_unreachable() {
        let transport = MockTransport::new().fail_with_io("connection reset");
        let api = OrderApi::new(transport);

        let err = api.get_order(3).await.unwrap_err();
        assert!(matches!(err, ClientError::OrderFailed { ref message } if message == GET_ORDER_FALLBACK));
    }

    #[tokio::test]
    async fn test_delete_order_confirmation() {
        let transport = MockTransport::new().respond(200, "");
        let api = OrderApi::new(transport);

        assert_eq!(api.delete_order(9).await.unwrap(), "Order 9 deleted");
    }
}
