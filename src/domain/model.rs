use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};

/// One row of the shopping cart as the storefront UI holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: u64,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
    /// Price after a promo code or flash sale, takes precedence over `sale_price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Decimal>,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn new(id: u64, price: Decimal, quantity: u32) -> Self {
        Self {
            id,
            price,
            sale_price: None,
            discounted_price: None,
            quantity,
        }
    }

    pub fn with_sale_price(mut self, sale_price: Decimal) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    pub fn with_discounted_price(mut self, discounted_price: Decimal) -> Self {
        self.discounted_price = Some(discounted_price);
        self
    }
}

/// Which of the three price fields supplied a line item's effective price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceSource {
    Discounted,
    Sale,
    Base,
}

/// Cart item ids the user ticked for checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(HashSet<u64>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every item currently in the cart.
    pub fn all(items: &[CartLineItem]) -> Self {
        items.iter().map(|item| item.id).collect()
    }

    pub fn insert(&mut self, id: u64) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: u64) -> bool {
        self.0.remove(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<u64> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: u64,
    pub code: String,
    pub discount_percentage: f64,
    pub valid_from: DateTime<FixedOffset>,
    pub valid_to: DateTime<FixedOffset>,
    #[serde(default)]
    pub min_order_value: Decimal,
    #[serde(default)]
    pub probability_weight: u32,
    #[serde(default)]
    pub used: bool,
}

impl Discount {
    pub fn is_active_at(&self, at: DateTime<FixedOffset>) -> bool {
        self.valid_from <= at && at <= self.valid_to
    }

    pub fn qualifies(&self, order_total: Decimal) -> bool {
        order_total >= self.min_order_value
    }
}

/// Payload for creating a discount code.
/// Codes that collide with fixed routes under `/discounts`.
pub const RESERVED_DISCOUNT_CODES: &[&str] = &["spin", "active", "apply-discount"];

/// A discount code must be non-blank and must not shadow a `/discounts/...` route.
pub fn validate_discount_code(code: &str) -> Result<()> {
    validate_non_empty_string("code", code)?;
    if RESERVED_DISCOUNT_CODES.contains(&code.trim()) {
        return Err(ClientError::Validation {
            message: format!("'{}' is reserved and cannot be used as a discount code", code),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDraft {
    pub code: String,
    pub discount_percentage: f64,
    pub valid_from: DateTime<FixedOffset>,
    pub valid_to: DateTime<FixedOffset>,
    pub min_order_value: Decimal,
    pub probability_weight: u32,
}

impl Validate for DiscountDraft {
    fn validate(&self) -> Result<()> {
        validate_discount_code(&self.code)?;
        validate_range("discountPercentage", self.discount_percentage, 0.0, 100.0)?;
        if self.valid_from > self.valid_to {
            return Err(ClientError::Validation {
                message: "validFrom must not be after validTo".to_string(),
            });
        }
        if self.min_order_value.is_sign_negative() {
            return Err(ClientError::Validation {
                message: "minOrderValue must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Changes to an existing discount. Absent fields keep their current value.
///
/// The backend replaces every column on update, so a patch is never sent as is:
/// [`DiscountPatch::apply_to`] merges it into a full [`DiscountDraft`] first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPatch {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub valid_from: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub valid_to: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub min_order_value: Option<Decimal>,
    #[serde(default)]
    pub probability_weight: Option<u32>,
}

impl DiscountPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, current: &Discount) -> DiscountDraft {
        DiscountDraft {
            code: self.code.clone().unwrap_or_else(|| current.code.clone()),
            discount_percentage: self
                .discount_percentage
                .unwrap_or(current.discount_percentage),
            valid_from: self.valid_from.unwrap_or(current.valid_from),
            valid_to: self.valid_to.unwrap_or(current.valid_to),
            min_order_value: self.min_order_value.unwrap_or(current.min_order_value),
            probability_weight: self
                .probability_weight
                .unwrap_or(current.probability_weight),
        }
    }
}

impl Validate for DiscountPatch {
    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ClientError::Validation {
                message: "Discount update contains no fields".to_string(),
            });
        }
        if let Some(code) = &self.code {
            validate_discount_code(code)?;
        }
        if let Some(percentage) = self.discount_percentage {
            validate_range("discountPercentage", percentage, 0.0, 100.0)?;
        }
        if let (Some(from), Some(to)) = (self.valid_from, self.valid_to) {
            if from > to {
                return Err(ClientError::Validation {
                    message: "validFrom must not be after validTo".to_string(),
                });
            }
        }
        if self.min_order_value.is_some_and(|v| v.is_sign_negative()) {
            return Err(ClientError::Validation {
                message: "minOrderValue must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDiscountItem {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDiscountRequest {
    pub discount_code: String,
    pub items: Vec<ApplyDiscountItem>,
}

impl ApplyDiscountRequest {
    /// Builds the order context from the selected cart rows, in cart order.
    pub fn from_selection(
        discount_code: impl Into<String>,
        items: &[CartLineItem],
        selected: &SelectionSet,
    ) -> Self {
        Self {
            discount_code: discount_code.into(),
            items: items
                .iter()
                .filter(|item| selected.contains(item.id))
                .map(|item| ApplyDiscountItem {
                    product_id: item.id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDiscountResult {
    pub original_total: Decimal,
    pub discount_amount: Decimal,
    pub final_total: Decimal,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingEstimateRequest {
    pub address: String,
    pub carrier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingEstimate {
    pub fee: Decimal,
    #[serde(default)]
    pub estimated_delivery: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(ClientError::Validation {
                message: format!("Unknown order status: {}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub shipping_fee: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub order_details: Vec<serde_json::Value>,
}

/// Spring-style paged list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

/// List endpoints answer either with a page envelope or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Paged(Page<T>),
}

impl<T> ListBody<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Paged(page) => page.content,
        }
    }
}
