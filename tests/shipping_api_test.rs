use httpmock::prelude::*;
use rust_decimal_macros::dec;
use serde_json::json;
use storefront_client::{ClientConfig, ClientError, ReqwestTransport, ShippingApi};

fn api_for(base_url: &str) -> ShippingApi<ReqwestTransport> {
    let transport = ReqwestTransport::new(&ClientConfig::new(base_url)).unwrap();
    ShippingApi::new(transport)
}

fn failure_message(err: ClientError) -> String {
    match err {
        ClientError::EstimationFailed { message } => message,
        other => panic!("expected EstimationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_estimate_shipping() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/shipping/estimate")
            .header("Content-Type", "application/json")
            .json_body(json!({"address": "268 Ly Thuong Kiet, HCMC", "carrier": "GHTK"}));
        then.status(200).json_body(json!({
            "fee": 32000,
            "estimatedDelivery": "2026-10-22T17:00:00"
        }));
    });

    let estimate = api_for(&server.url("/api"))
        .estimate_shipping("268 Ly Thuong Kiet, HCMC", "GHTK")
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(estimate.fee, dec!(32000));
    assert_eq!(
        estimate.estimated_delivery.map(|d| d.to_string()),
        Some("2026-10-22 17:00:00".to_string())
    );
}

#[tokio::test]
async fn test_backend_message_is_used_verbatim() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/shipping/estimate");
        then.status(400)
            .json_body(json!({"message": "Địa chỉ không nằm trong khu vực giao hàng"}));
    });

    let err = api_for(&server.url("/api"))
        .estimate_shipping("Truong Sa", "GHN")
        .await
        .unwrap_err();

    assert_eq!(failure_message(err), "Địa chỉ không nằm trong khu vực giao hàng");
}

#[tokio::test]
async fn test_fallback_message_when_backend_says_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/shipping/estimate");
        then.status(500);
    });

    let err = api_for(&server.url("/api"))
        .estimate_shipping("1 Dai Co Viet, Hanoi", "GHN")
        .await
        .unwrap_err();

    assert_eq!(failure_message(err), "Lỗi khi tính phí giao hàng");
}

#[tokio::test]
async fn test_proxy_error_page_falls_back_to_fixed_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/shipping/estimate");
        then.status(502)
            .header("Content-Type", "text/html")
            .body("<html><body><h1>502 Bad Gateway</h1></body></html>");
    });

    let err = api_for(&server.url("/api"))
        .estimate_shipping("1 Dai Co Viet, Hanoi", "GHN")
        .await
        .unwrap_err();

    assert_eq!(failure_message(err), "Lỗi khi tính phí giao hàng");
}

#[tokio::test]
async fn test_unreachable_backend_still_yields_a_message() {
    let err = api_for("http://127.0.0.1:1/api")
        .estimate_shipping("1 Dai Co Viet, Hanoi", "GHN")
        .await
        .unwrap_err();

    assert!(!failure_message(err).is_empty());
}

#[tokio::test]
async fn test_blank_address_is_rejected_before_sending() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/api/shipping/estimate");
        then.status(200);
    });

    let err = api_for(&server.url("/api"))
        .estimate_shipping("   ", "GHN")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation { .. }));
    api_mock.assert_hits(0);
}
