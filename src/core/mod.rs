pub mod discounts;
pub mod orders;
pub mod pricing;
mod response;
pub mod shipping;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{CartLineItem, PriceSource, SelectionSet};
pub use crate::domain::ports::{ConfigProvider, Transport};
pub use crate::utils::error::Result;
