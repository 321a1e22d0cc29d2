// QuotationItem model with line total calculation
//
// A line item is one priced entry within a quotation. Quantity and unit
// price are kept at two decimals in the base currency; the line total is
// quantity × unit_price rounded half away from zero to two decimals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::BASE_CURRENCY;

/// A stored line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationItem {
    pub id: i64,
    pub quotation_id: i64,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// quantity × unit_price, derived on load
    pub line_total: Decimal,
}

impl QuotationItem {
    pub fn new(
        id: i64,
        quotation_id: i64,
        description: String,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        let line_total = line_total(quantity, unit_price);
        Self {
            id,
            quotation_id,
            description,
            quantity,
            unit_price,
            line_total,
        }
    }
}

/// An item about to be written; amounts already normalised
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuotationItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl NewQuotationItem {
    /// Build an item, rounding quantity and price to two decimals first
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        let quantity = BASE_CURRENCY.round(quantity);
        let unit_price = BASE_CURRENCY.round(unit_price);

        Self {
            description: description.into().trim().to_string(),
            quantity,
            unit_price,
            line_total: line_total(quantity, unit_price),
        }
    }
}

/// Smallest quantity or unit price an item may carry (0.01)
pub fn min_item_amount() -> Decimal {
    Decimal::new(1, 2)
}

/// 999999.99, the `quotation_items.quantity DECIMAL(10,2)` limit
pub fn max_quantity() -> Decimal {
    Decimal::new(99_999_999, 2)
}

/// 99999999.99, the `quotation_items.unit_price DECIMAL(12,2)` limit
pub fn max_unit_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// 999999999999.99, the `quotations.total_amount DECIMAL(14,2)` limit
pub fn max_total_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Formula: line_total = quantity × unit_price
/// Rounding: base currency scale
///
/// Inputs must be within the item bounds; use `checked_line_total` otherwise.
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    BASE_CURRENCY.round(quantity * unit_price)
}

/// `line_total`, or `None` when the product overflows
pub fn checked_line_total(quantity: Decimal, unit_price: Decimal) -> Option<Decimal> {
    quantity
        .checked_mul(unit_price)
        .map(|total| BASE_CURRENCY.round(total))
}
