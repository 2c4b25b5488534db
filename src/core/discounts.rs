use crate::core::response::{confirmation_text, decode_list, ensure_success};
use crate::domain::model::{
    validate_discount_code, ApplyDiscountRequest, ApplyDiscountResult, Discount, DiscountDraft,
    DiscountPatch,
};
use crate::domain::ports::{ApiRequest, Transport};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};

pub const DEFAULT_MIN_PERCENTAGE: f64 = 0.0;

/// Typed access to the `/discounts` endpoints.
pub struct DiscountApi<T: Transport> {
    transport: T,
}

impl<T: Transport> DiscountApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn list_discounts(&self) -> Result<Vec<Discount>> {
        let response = self.transport.send(ApiRequest::get(["discounts"])).await?;
        let response = ensure_success(response, "discount")?;
        let discounts = decode_list(&response)?;
        tracing::debug!("Fetched {} discounts", discounts.len());
        Ok(discounts)
    }

    pub async fn create_discount(&self, draft: &DiscountDraft) -> Result<Discount> {
        draft.validate()?;

        let request = ApiRequest::post(["discounts"]).json(draft)?;
        let response = ensure_success(self.transport.send(request).await?, "discount")?;
        let created: Discount = response.json()?;
        tracing::info!("Created discount {} (id {})", created.code, created.id);
        Ok(created)
    }

    /// `Ok(None)` when no discount carries `code`. Codes that name another
    /// `/discounts` route (`spin`, `active`) are refused before any request.
    pub async fn get_discount_by_code(&self, code: &str) -> Result<Option<Discount>> {
        validate_discount_code(code)?;

        let response = self
            .transport
            .send(ApiRequest::get(["discounts", code]))
            .await?;
        match ensure_success(response, "discount") {
            Ok(response) => Ok(Some(response.json()?)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn delete_discount(&self, id: u64) -> Result<String> {
        let response = self
            .transport
            .send(ApiRequest::delete(["discounts".to_string(), id.to_string()]))
            .await?;
        let response = ensure_success(response, "discount")?;
        tracing::info!("Deleted discount {}", id);
        Ok(confirmation_text(&response, || format!("Discount {} deleted", id)))
    }

    /// Sends `patch` merged over `current` to `PUT /discounts/{id}`. The body always
    /// carries every field.
    pub async fn update_discount(
        &self,
        current: &Discount,
        patch: &DiscountPatch,
    ) -> Result<Discount> {
        patch.validate()?;
        let draft = patch.apply_to(current);
        draft.validate()?;

        let request =
            ApiRequest::put(["discounts".to_string(), current.id.to_string()]).json(&draft)?;
        let response = ensure_success(self.transport.send(request).await?, "discount")?;
        tracing::info!("Updated discount {} (id {})", draft.code, current.id);
        Ok(response.json()?)
    }

    /// Asks the backend to draw a discount. `Ok(None)` when nothing is on offer.
    pub async fn spin_discount(&self) -> Result<Option<Discount>> {
        let response = self
            .transport
            .send(ApiRequest::get(["discounts", "spin"]))
            .await?;
        let response = ensure_success(response, "discount")?;
        if !response.has_content() {
            tracing::debug!("Spin returned no discount");
            return Ok(None);
        }
        Ok(Some(response.json()?))
    }

    /// Active discounts whose percentage is at least `min_percentage`
    /// (`None` means [`DEFAULT_MIN_PERCENTAGE`]).
    pub async fn list_active_discounts(&self, min_percentage: Option<f64>) -> Result<Vec<Discount>> {
        let min_percentage = min_percentage.unwrap_or(DEFAULT_MIN_PERCENTAGE);
        if !min_percentage.is_finite() || min_percentage < 0.0 {
            return Err(ClientError::Validation {
                message: format!(
                    "minPercentage must be a non-negative number (got {})",
                    min_percentage
                ),
            });
        }

        let request =
            ApiRequest::get(["discounts", "active"]).query("minPercentage", min_percentage);
        let response = ensure_success(self.transport.send(request).await?, "discount")?;
        let discounts: Vec<Discount> = decode_list(&response)?;

        let total = discounts.len();
        let discounts: Vec<Discount> = discounts
            .into_iter()
            .filter(|d| d.discount_percentage >= min_percentage)
            .collect();
        if discounts.len() < total {
            tracing::warn!(
                "Dropped {} discounts below {}% returned by the backend",
                total - discounts.len(),
                min_percentage
            );
        }
        Ok(discounts)
    }

    /// Asks the backend to price the order context with the given code.
    ///
    /// Any non-2xx answer becomes [`ClientError::RejectedDiscount`] with the
    /// backend's message untouched; see [`RejectionReason::classify`].
    pub async fn apply_discount(&self, request: &ApplyDiscountRequest) -> Result<ApplyDiscountResult> {
        validate_non_empty_string("discountCode", &request.discount_code)?;

        let api_request = ApiRequest::post(["discounts", "apply-discount"]).json(request)?;
        let response = self.transport.send(api_request).await?;

        if !response.is_success() {
            let status = response.status;
            let message = response
                .error_message()
                .unwrap_or_else(|| format!("HTTP {}", status));
            let conflicted_products = response
                .json::<serde_json::Value>()
                .ok()
                .and_then(|body| body.get("conflictedProducts").cloned())
                .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
                .unwrap_or_default();
            tracing::warn!(
                "Discount {} rejected ({}): {}",
                request.discount_code,
                status,
                message
            );
            return Err(ClientError::RejectedDiscount {
                status,
                message,
                conflicted_products,
            });
        }

        let result: ApplyDiscountResult = response.json()?;
        tracing::info!(
            "Discount {} applied: {} -> {}",
            request.discount_code,
            result.original_total,
            result.final_total
        );
        Ok(result)
    }
}

/// Why the backend refused a discount code, read off its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    AlreadyUsed,
    Expired,
    NotStarted,
    BelowMinimum,
    UnknownCode,
    ConflictsWithPromotion,
    Other,
}

// Checked in order; the backend phrases its messages in Vietnamese.
const REJECTION_KEYWORDS: &[(&str, RejectionReason)] = &[
    ("đã được sử dụng", RejectionReason::AlreadyUsed),
    ("already used", RejectionReason::AlreadyUsed),
    ("hết hạn", RejectionReason::Expired),
    ("expired", RejectionReason::Expired),
    ("chưa bắt đầu", RejectionReason::NotStarted),
    ("not started", RejectionReason::NotStarted),
    ("not yet active", RejectionReason::NotStarted),
    ("tối thiểu", RejectionReason::BelowMinimum),
    ("minimum", RejectionReason::BelowMinimum),
    ("không tồn tại", RejectionReason::UnknownCode),
    ("does not exist", RejectionReason::UnknownCode),
    ("đang khuyến mãi", RejectionReason::ConflictsWithPromotion),
    ("on promotion", RejectionReason::ConflictsWithPromotion),
];

impl RejectionReason {
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();
        REJECTION_KEYWORDS
            .iter()
            .find(|(keyword, _)| message.contains(keyword))
            .map(|(_, reason)| *reason)
            .unwrap_or(RejectionReason::Other)
    }
}

impl ClientError {
    /// Classification of a [`ClientError::RejectedDiscount`]; `None` for other errors.
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            ClientError::RejectedDiscount { message, .. } => Some(RejectionReason::classify(message)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockTransport;
    use crate::domain::ports::{HttpMethod, RequestBody};
    use serde_json::json;

    fn discount_json(id: u64, code: &str, percentage: f64) -> serde_json::Value {
        json!({
            "id": id,
            "code": code,
            "discountPercentage": percentage,
            "validFrom": "2026-01-01T00:00:00+07:00",
            "validTo": "2026-12-31T23:59:59+07:00",
            "minOrderValue": 0,
            "probabilityWeight": 1,
            "used": false
        })
    }

    #[tokio::test]
    async fn test_list_discounts_unwraps_page() {
        let transport = MockTransport::new().respond_json(
            200,
            json!({"content": [discount_json(1, "A", 5.0), discount_json(2, "B", 10.0)], "totalElements": 2}),
        );
        let api = DiscountApi::new(transport.clone());

        let discounts = api.list_discounts().await.unwrap();

        assert_eq!(discounts.len(), 2);
        assert_eq!(discounts[1].code, "B");
        let requests = transport.requests().await;
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].path(), "/discounts");
    }

    #[tokio::test]
    async fn test_get_by_code_not_found_is_none() {
        let transport = MockTransport::new().respond(404, "");
        let api = DiscountApi::new(transport);

        assert_eq!(api.get_discount_by_code("MISSING").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_by_code_server_error_propagates() {
        let transport = MockTransport::new().respond_json(500, json!({"message": "boom"}));
        let api = DiscountApi::new(transport);

        let err = api.get_discount_by_code("ANY").await.unwrap_err();
        assert!(matches!(err, ClientError::BusinessRejection { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_blank_code_never_reaches_transport() {
        let transport = MockTransport::new();
        let api = DiscountApi::new(transport.clone());

        assert!(api.get_discount_by_code("  ").await.is_err());
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_spin_no_content_is_none() {
        let transport = MockTransport::new().respond(204, "");
        let api = DiscountApi::new(transport);

        assert_eq!(api.spin_discount().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_active_discounts_filters_below_minimum() {
        let transport = MockTransport::new().respond_json(
            200,
            json!([discount_json(1, "LOW", 5.0), discount_json(2, "HIGH", 25.0)]),
        );
        let api = DiscountApi::new(transport.clone());

        let discounts = api.list_active_discounts(Some(10.0)).await.unwrap();

        assert_eq!(discounts.len(), 1);
        assert!(discounts.iter().all(|d| d.discount_percentage >= 10.0));
        let requests = transport.requests().await;
        assert_eq!(
            requests[0].query,
            vec![("minPercentage".to_string(), "10".to_string())]
        );
    }

    #[tokio::test]
    async fn test_active_discounts_defaults_to_zero() {
        let transport = MockTransport::new().respond_json(200, json!([]));
        let api = DiscountApi::new(transport.clone());

        api.list_active_discounts(None).await.unwrap();

        let requests = transport.requests().await;
        assert_eq!(
            requests[0].query,
            vec![("minPercentage".to_string(), "0".to_string())]
        );
    }

    #[tokio::test]
    async fn test_negative_min_percentage_is_rejected() {
        let transport = MockTransport::new();
        let api = DiscountApi::new(transport.clone());

        let err = api.list_active_discounts(Some(-1.0)).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_every_field() {
        let transport =
            MockTransport::new().respond_json(200, discount_json(3, "SUMMER", 20.0));
        let api = DiscountApi::new(transport.clone());
        let current: Discount = serde_json::from_value(discount_json(3, "SUMMER", 10.0)).unwrap();
        let patch = DiscountPatch {
            discount_percentage: Some(20.0),
            ..Default::default()
        };

        let updated = api.update_discount(&current, &patch).await.unwrap();

        assert_eq!(updated.discount_percentage, 20.0);
        let requests = transport.requests().await;
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert_eq!(requests[0].path(), "/discounts/3");
        let Some(RequestBody::Json(body)) = &requests[0].body else {
            panic!("expected a JSON body, got {:?}", requests[0].body);
        };
        for field in [
            "code",
            "discountPercentage",
            "validFrom",
            "validTo",
            "minOrderValue",
            "probabilityWeight",
        ] {
            assert!(
                body.get(field).is_some_and(|v| !v.is_null()),
                "{} missing from {}",
                field,
                body
            );
        }
        assert_eq!(body["code"], "SUMMER");
        assert_eq!(body["discountPercentage"], 20.0);
        assert_eq!(body["probabilityWeight"], 1);
    }

    #[tokio::test]
    async fn test_update_rejects_window_inverted_by_merge() {
        let transport = MockTransport::new();
        let api = DiscountApi::new(transport.clone());
        let current: Discount = serde_json::from_value(discount_json(3, "SUMMER", 10.0)).unwrap();
        let patch = DiscountPatch {
            valid_from: Some("2027-01-01T00:00:00+07:00".parse().unwrap()),
            ..Default::default()
        };

        let err = api.update_discount(&current, &patch).await.unwrap_err();

        assert!(matches!(err, ClientError::Validation { .. }));
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_route_names_are_not_looked_up_as_codes() {
        let transport = MockTransport::new();
        let api = DiscountApi::new(transport.clone());

        assert!(matches!(
            api.get_discount_by_code("spin").await,
            Err(ClientError::Validation { .. })
        ));
        assert!(matches!(
            api.get_discount_by_code("active").await,
            Err(ClientError::Validation { .. })
        ));
        assert!(transport.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_returns_backend_confirmation() {
        let transport = MockTransport::new().respond(200, "Xóa mã giảm giá thành công!");
        let api = DiscountApi::new(transport);

        let confirmation = api.delete_discount(8).await.unwrap();
        assert_eq!(confirmation, "Xóa mã giảm giá thành công!");
    }

    #[tokio::test]
    async fn test_apply_rejection_keeps_message_and_conflicts() {
        let transport = MockTransport::new().respond_json(
            400,
            json!({
                "message": "Sản phẩm \"iPhone 15\" đang khuyến mãi. Không thể áp thêm mã giảm giá.",
                "conflictedProducts": ["iPhone 15"]
            }),
        );
        let api = DiscountApi::new(transport);
        let request = ApplyDiscountRequest {
            discount_code: "SALE".to_string(),
            items: vec![],
        };

        let err = api.apply_discount(&request).await.unwrap_err();

        assert_eq!(
            err.rejection_reason(),
            Some(RejectionReason::ConflictsWithPromotion)
        );
        match err {
            ClientError::RejectedDiscount {
                status,
                conflicted_products,
                ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(conflicted_products, vec!["iPhone 15".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejection_reason_classification() {
        assert_eq!(
            RejectionReason::classify("Mã giảm giá đã hết hạn."),
            RejectionReason::Expired
        );
        assert_eq!(
            RejectionReason::classify("Mã giảm giá đã được sử dụng."),
            RejectionReason::AlreadyUsed
        );
        assert_eq!(
            RejectionReason::classify("Đơn hàng chưa đạt giá trị tối thiểu để sử dụng mã."),
            RejectionReason::BelowMinimum
        );
        assert_eq!(
            RejectionReason::classify("Mã giảm giá không tồn tại."),
            RejectionReason::UnknownCode
        );
        assert_eq!(
            RejectionReason::classify("Discount code EXPIRED"),
            RejectionReason::Expired
        );
        assert_eq!(RejectionReason::classify("HTTP 400"), RejectionReason::Other);
    }
}
