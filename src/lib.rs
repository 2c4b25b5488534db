pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::ReqwestTransport;
pub use config::{ClientConfig, TomlConfig};
pub use crate::core::discounts::{DiscountApi, RejectionReason};
pub use crate::core::orders::OrderApi;
pub use crate::core::pricing::{checkout_total, compute_subtotal, effective_price, resolve_price};
pub use crate::core::shipping::ShippingApi;
pub use domain::model::{
    ApplyDiscountRequest, ApplyDiscountResult, CartLineItem, Discount, DiscountDraft,
    DiscountPatch, Order, OrderStatus, PriceSource, SelectionSet, ShippingEstimate,
};
pub use utils::error::{ClientError, Result};
