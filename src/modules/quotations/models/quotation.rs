// Quotation model
//
// A quotation is a priced offer to one customer. Amounts are stored in the
// base currency (MYR); `currency` and `conversion_rate` only affect how the
// document is presented. `total_amount` is never accepted from clients: it
// is derived from the items every time they are written.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::quotation_item::{NewQuotationItem, QuotationItem};
use super::status::QuotationStatus;
use crate::core::{AppError, Currency, Result, BASE_CURRENCY};

/// Payment terms used when a quotation does not name any
pub const DEFAULT_PAYMENT_TERMS: &str = "Net 30 Days";

/// Days a quotation stays valid when `valid_until` is omitted
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// 1.0000, stored with the column's four decimals
pub fn default_conversion_rate() -> Decimal {
    Decimal::new(10_000, 4)
}

/// 99999999.9999, the `quotations.conversion_rate DECIMAL(12,4)` limit
pub fn max_conversion_rate() -> Decimal {
    Decimal::new(999_999_999_999, 4)
}

/// Decimals the `conversion_rate` column keeps
pub const CONVERSION_RATE_SCALE: u32 = 4;

/// `quotation_date + 30 days`
pub fn default_valid_until(quotation_date: NaiveDate) -> NaiveDate {
    quotation_date + Duration::days(DEFAULT_VALIDITY_DAYS)
}

/// Sum of line totals in the base currency
pub fn calculate_total<I>(line_totals: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    BASE_CURRENCY.round(line_totals.into_iter().sum())
}

/// A stored quotation together with its items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: i64,
    pub customer_id: i64,
    pub quotation_date: NaiveDate,
    pub status: QuotationStatus,
    pub currency: Currency,
    pub conversion_rate: Decimal,
    pub payment_terms: String,
    pub valid_until: NaiveDate,
    pub notes: Vec<String>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub items: Vec<QuotationItem>,
}

impl Quotation {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Recompute the total from the loaded items
    pub fn items_total(&self) -> Decimal {
        calculate_total(self.items.iter().map(|item| item.line_total))
    }
}

/// Raw `quotations` row
#[derive(Debug, Clone, FromRow)]
pub struct QuotationRow {
    pub id: i64,
    pub customer_id: i64,
    pub quotation_date: NaiveDate,
    pub status: String,
    pub currency: String,
    pub conversion_rate: Decimal,
    pub payment_terms: String,
    pub valid_until: NaiveDate,
    pub notes: Option<String>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl QuotationRow {
    /// Attach items and parse the string columns
    pub fn into_quotation(self, items: Vec<QuotationItem>) -> Result<Quotation> {
        let status = self.status.parse::<QuotationStatus>().map_err(AppError::Internal)?;
        let currency = self.currency.parse::<Currency>().map_err(AppError::Internal)?;
        let notes = match self.notes.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => serde_json::from_str(raw)?,
        };

        Ok(Quotation {
            id: self.id,
            customer_id: self.customer_id,
            quotation_date: self.quotation_date,
            status,
            currency,
            conversion_rate: self.conversion_rate,
            payment_terms: self.payment_terms,
            valid_until: self.valid_until,
            notes,
            total_amount: self.total_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            items,
        })
    }
}

/// Raw `quotation_items` row
#[derive(Debug, Clone, FromRow)]
pub struct QuotationItemRow {
    pub id: i64,
    pub quotation_id: i64,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl From<QuotationItemRow> for QuotationItem {
    fn from(row: QuotationItemRow) -> Self {
        QuotationItem::new(
            row.id,
            row.quotation_id,
            row.description,
            row.quantity,
            row.unit_price,
        )
    }
}

/// A validated quotation ready to be written.
///
/// The total is derived from `items` on demand so it cannot drift from them.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotationDraft {
    pub customer_id: i64,
    pub quotation_date: NaiveDate,
    pub status: QuotationStatus,
    pub currency: Currency,
    pub conversion_rate: Decimal,
    pub payment_terms: String,
    pub valid_until: NaiveDate,
    pub notes: Vec<String>,
    pub items: Vec<NewQuotationItem>,
}

impl QuotationDraft {
    /// Draft with every optional header field at its default
    pub fn new(customer_id: i64, quotation_date: NaiveDate, items: Vec<NewQuotationItem>) -> Self {
        Self {
            customer_id,
            quotation_date,
            status: QuotationStatus::default(),
            currency: Currency::default(),
            conversion_rate: default_conversion_rate(),
            payment_terms: DEFAULT_PAYMENT_TERMS.to_string(),
            valid_until: default_valid_until(quotation_date),
            notes: Vec::new(),
            items,
        }
    }

    pub fn total_amount(&self) -> Decimal {
        calculate_total(self.items.iter().map(|item| item.line_total))
    }

    /// JSON text for the `notes` column; `None` when there are no notes
    pub fn notes_json(&self) -> Result<Option<String>> {
        if self.notes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(&self.notes)?))
    }
}

/// Listing filters for `GET /api/quotations`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotationFilter {
    pub status: Option<QuotationStatus>,
    pub customer_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub with_deleted: bool,
}

impl QuotationFilter {
    /// Whether a quotation passes every filter
    pub fn matches(&self, quotation: &Quotation) -> bool {
        (self.with_deleted || !quotation.is_deleted())
            && self.status.map_or(true, |s| quotation.status == s)
            && self.customer_id.map_or(true, |c| quotation.customer_id == c)
            && self.date_from.map_or(true, |d| quotation.quotation_date >= d)
            && self.date_to.map_or(true, |d| quotation.quotation_date <= d)
    }
}
