// Request bodies for the quotation endpoints
//
// Every field is optional at the serde level so a missing value surfaces as
// a per-field 422 rather than a JSON parse failure. `check` collects all
// field problems; `into_draft` then builds the write model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::quotation::{max_conversion_rate, Quotation, QuotationDraft, CONVERSION_RATE_SCALE};
use super::quotation_item::{
    checked_line_total, max_quantity, max_total_amount, max_unit_price, min_item_amount,
    NewQuotationItem,
};
use super::status::QuotationStatus;
use crate::core::{AppError, Currency, FieldErrors, Result, BASE_CURRENCY};

const MAX_NOTE_LENGTH: usize = 1000;

/// Body of `POST /api/quotations` and `PUT /api/quotations/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuotationRequest {
    pub customer_id: Option<i64>,
    pub quotation_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub currency: Option<String>,

    #[validate(custom = "validate_conversion_rate")]
    pub conversion_rate: Option<Decimal>,

    #[validate(length(max = 255, message = "The payment terms may not be greater than 255 characters."))]
    pub payment_terms: Option<String>,

    pub valid_until: Option<NaiveDate>,
    pub notes: Option<Vec<String>>,

    #[serde(default)]
    pub items: Vec<QuotationItemRequest>,
}

/// One entry of `items`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuotationItemRequest {
    #[validate(length(max = 255, message = "The description may not be greater than 255 characters."))]
    pub description: Option<String>,

    #[validate(custom = "validate_quantity")]
    pub quantity: Option<Decimal>,

    #[validate(custom = "validate_unit_price")]
    pub unit_price: Option<Decimal>,
}

/// Body of `POST /api/quotations/{id}/status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

impl StatusUpdateRequest {
    pub fn parse(&self) -> Result<QuotationStatus> {
        match self.status.as_deref() {
            None => Err(AppError::field("status", "The status field is required.")),
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::field("status", QuotationStatus::invalid_message())),
        }
    }
}

impl QuotationRequest {
    /// Collect every field problem.
    ///
    /// `existing` is the stored quotation on update; the not-in-the-past
    /// rule for `quotation_date` then only applies when the date changes.
    pub fn check(&self, today: NaiveDate, existing: Option<&Quotation>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Err(validation) = self.validate() {
            errors.merge_validator(&validation, None);
        }

        if self.customer_id.is_none() {
            errors.add("customer_id", "The customer id field is required.");
        }

        match self.quotation_date {
            None => errors.add("quotation_date", "The quotation date field is required."),
            Some(date) => {
                let changed = existing.map_or(true, |q| q.quotation_date != date);
                if changed && date < today {
                    errors.add(
                        "quotation_date",
                        "The quotation date must be a date after or equal to today.",
                    );
                }
            }
        }

        if let (Some(valid_until), Some(date)) = (self.valid_until, self.quotation_date) {
            if valid_until < date {
                errors.add(
                    "valid_until",
                    "The valid until must be a date after or equal to quotation date.",
                );
            }
        }

        if let Some(status) = self.status.as_deref() {
            if status.parse::<QuotationStatus>().is_err() {
                errors.add("status", QuotationStatus::invalid_message());
            }
        }

        if let Some(currency) = self.currency.as_deref() {
            if currency.parse::<Currency>().is_err() {
                errors.add("currency", "The selected currency is invalid. Allowed values: MYR, JPY.");
            }
        }

        if let Some(notes) = &self.notes {
            for (idx, note) in notes.iter().enumerate() {
                if note.chars().count() > MAX_NOTE_LENGTH {
                    errors.add(
                        format!("notes.{}", idx),
                        "The note may not be greater than 1000 characters.",
                    );
                }
            }
        }

        if self.items.is_empty() {
            errors.add("items", "At least one item is required.");
        }

        for (idx, item) in self.items.iter().enumerate() {
            item.check(idx, &mut errors);
        }

        if self.items_total().map_or(false, |total| total > max_total_amount()) {
            errors.add(
                "items",
                "The quotation total may not be greater than 999999999999.99.",
            );
        }

        errors
    }

    /// Total the items would produce once stored; `None` while an item
    /// lacks an amount or the sum overflows
    fn items_total(&self) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |total, item| {
            let quantity = BASE_CURRENCY.round(item.quantity?);
            let unit_price = BASE_CURRENCY.round(item.unit_price?);
            total.checked_add(checked_line_total(quantity, unit_price)?)
        })
    }

    /// Build the write model from a request that passed `check`.
    ///
    /// On update, absent optional header fields keep their stored values.
    pub fn into_draft(self, existing: Option<&Quotation>) -> Result<QuotationDraft> {
        let customer_id = self
            .customer_id
            .ok_or_else(|| AppError::field("customer_id", "The customer id field is required."))?;
        let quotation_date = self.quotation_date.ok_or_else(|| {
            AppError::field("quotation_date", "The quotation date field is required.")
        })?;

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| item.into_new_item(idx))
            .collect::<Result<Vec<_>>>()?;

        let mut draft = QuotationDraft::new(customer_id, quotation_date, items);

        if let Some(stored) = existing {
            draft.status = stored.status;
            draft.currency = stored.currency;
            draft.conversion_rate = stored.conversion_rate;
            draft.payment_terms = stored.payment_terms.clone();
            draft.notes = stored.notes.clone();
            if stored.valid_until >= quotation_date {
                draft.valid_until = stored.valid_until;
            }
        }

        if let Some(status) = self.status.as_deref() {
            draft.status = status
                .parse()
                .map_err(|_| AppError::field("status", QuotationStatus::invalid_message()))?;
        }
        if let Some(currency) = self.currency.as_deref() {
            draft.currency = currency
                .parse()
                .map_err(|_| AppError::field("currency", "The selected currency is invalid."))?;
        }
        if let Some(rate) = self.conversion_rate {
            draft.conversion_rate = rate;
        }
        if let Some(terms) = self.payment_terms.map(|t| t.trim().to_string()) {
            if !terms.is_empty() {
                draft.payment_terms = terms;
            }
        }
        if let Some(valid_until) = self.valid_until {
            draft.valid_until = valid_until;
        }
        if let Some(notes) = self.notes {
            draft.notes = notes
                .into_iter()
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty())
                .collect();
        }

        Ok(draft)
    }
}

impl QuotationItemRequest {
    fn check(&self, idx: usize, errors: &mut FieldErrors) {
        let prefix = format!("items.{}", idx);

        if self
            .description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
        {
            errors.add(format!("{}.description", prefix), "The description field is required.");
        }
        if self.quantity.is_none() {
            errors.add(format!("{}.quantity", prefix), "The quantity field is required.");
        }
        if self.unit_price.is_none() {
            errors.add(format!("{}.unit_price", prefix), "The unit price field is required.");
        }

        if let Err(validation) = self.validate() {
            errors.merge_validator(&validation, Some(&prefix));
        }
    }

    fn into_new_item(self, idx: usize) -> Result<NewQuotationItem> {
        let missing = |field: &str| {
            AppError::field(
                format!("items.{}.{}", idx, field),
                format!("The {} field is required.", field.replace('_', " ")),
            )
        };

        let description = self.description.ok_or_else(|| missing("description"))?;
        let quantity = self.quantity.ok_or_else(|| missing("quantity"))?;
        let unit_price = self.unit_price.ok_or_else(|| missing("unit_price"))?;

        Ok(NewQuotationItem::new(description, quantity, unit_price))
    }
}

fn decimal_range(
    value: &Decimal,
    min: Decimal,
    max: Decimal,
    message: &'static str,
) -> std::result::Result<(), ValidationError> {
    if *value < min || *value > max {
        let mut err = ValidationError::new("range");
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

fn validate_quantity(quantity: &Decimal) -> std::result::Result<(), ValidationError> {
    decimal_range(
        quantity,
        min_item_amount(),
        max_quantity(),
        "The quantity must be between 0.01 and 999999.99.",
    )
}

fn validate_unit_price(unit_price: &Decimal) -> std::result::Result<(), ValidationError> {
    decimal_range(
        unit_price,
        min_item_amount(),
        max_unit_price(),
        "The unit price must be between 0.01 and 99999999.99.",
    )
}

fn validate_conversion_rate(rate: &Decimal) -> std::result::Result<(), ValidationError> {
    if *rate <= Decimal::ZERO || *rate > max_conversion_rate() {
        let mut err = ValidationError::new("range");
        err.message =
            Some("The conversion rate must be greater than 0 and at most 99999999.9999.".into());
        return Err(err);
    }

    if rate.normalize().scale() > CONVERSION_RATE_SCALE {
        let mut err = ValidationError::new("scale");
        err.message = Some("The conversion rate may not have more than 4 decimal places.".into());
        return Err(err);
    }

    Ok(())
}
