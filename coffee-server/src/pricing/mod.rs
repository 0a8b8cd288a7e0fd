//! Order pricing
//!
//! Pure computation over already resolved products. All arithmetic is done in
//! `Decimal`; values are rounded to 2 decimal places (half away from zero)
//! per line before they are summed, so the stored totals always add up:
//!
//! - `total_discount = Σ discount`
//! - `total_amount = Σ amount - total_discount`

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use surrealdb::RecordId;

use crate::db::models::OrderItem;

const DECIMAL_PLACES: u32 = 2;
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Convert f64 to Decimal; non-finite input becomes zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round to 2 decimal places
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// One line to price: a resolved product and the requested quantity
#[derive(Debug, Clone)]
pub struct PricingLine {
    pub product: RecordId,
    pub unit_price: f64,
    /// Percentage in [0, 100]
    pub discount_percent: f64,
    pub quantity: u32,
}

/// Priced lines and totals
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub total_discount: f64,
}

/// Price an order
///
/// Per line: `amount = price × quantity`, `discount = amount × discount% / 100`.
pub fn price_order(lines: &[PricingLine]) -> Result<PricedOrder, AppError> {
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let mut gross = Decimal::ZERO;
    let mut total_discount = Decimal::ZERO;
    let mut items = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        if line.quantity == 0 {
            return Err(AppError::new(ErrorCode::OrderInvalidQuantity)
                .with_detail("index", index)
                .with_detail("product", line.product.to_string()));
        }

        let amount = round_money(to_decimal(line.unit_price) * Decimal::from(line.quantity));
        let discount = round_money(amount * to_decimal(line.discount_percent) / HUNDRED);

        gross += amount;
        total_discount += discount;

        items.push(OrderItem {
            product: line.product.clone(),
            quantity: line.quantity,
            amount: to_f64(amount),
            discount: to_f64(discount),
        });
    }

    Ok(PricedOrder {
        items,
        total_amount: to_f64(gross - total_discount),
        total_discount: to_f64(total_discount),
    })
}
