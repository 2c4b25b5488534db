//! Cart totals: price precedence per line item and the selected-items subtotal.
//!
//! Everything here is pure and synchronous. Currency formatting is left to the caller.

use crate::domain::model::{CartLineItem, PriceSource, SelectionSet};
use rust_decimal::Decimal;

/// Picks the unit price a line item is charged at.
///
/// `discounted_price` wins over `sale_price`, which wins over `price`. A present
/// field always wins, even when it is zero.
pub fn resolve_price(item: &CartLineItem) -> (Decimal, PriceSource) {
    if let Some(discounted) = item.discounted_price {
        (discounted, PriceSource::Discounted)
    } else if let Some(sale) = item.sale_price {
        (sale, PriceSource::Sale)
    } else {
        (item.price, PriceSource::Base)
    }
}

pub fn effective_price(item: &CartLineItem) -> Decimal {
    resolve_price(item).0
}

pub fn line_total(item: &CartLineItem) -> Decimal {
    effective_price(item) * Decimal::from(item.quantity)
}

/// Sum of `line_total` over the items whose id is in `selected`.
///
/// Selected ids with no matching item are ignored. Inputs are trusted: prices
/// are assumed non-negative and quantities positive.
pub fn compute_subtotal(items: &[CartLineItem], selected: &SelectionSet) -> Decimal {
    if selected.is_empty() {
        return Decimal::ZERO;
    }

    items
        .iter()
        .filter(|item| selected.contains(item.id))
        .map(line_total)
        .sum()
}

/// Amount due at checkout: subtotal, minus the discount the backend granted, plus shipping.
pub fn checkout_total(subtotal: Decimal, discount_amount: Decimal, shipping_fee: Decimal) -> Decimal {
    subtotal - discount_amount + shipping_fee
}
