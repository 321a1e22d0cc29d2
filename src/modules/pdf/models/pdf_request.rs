// PDF request payload
//
// `POST /api/generate-quotation-pdf` accepts the quotation the frontend
// already holds. Fields are loosely typed at the serde level (amounts as
// strings or numbers, dates with or without a time part) and checked by
// `validate`, which reports problems per field.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CompanyProfile;
use crate::core::{Currency, FieldErrors, Result};
use crate::modules::customers::Customer;
use crate::modules::quotations::models::{
    max_conversion_rate, max_quantity, max_total_amount, max_unit_price,
};
use crate::modules::quotations::Quotation;

/// Default download name
pub const DEFAULT_FILENAME: &str = "quotation.pdf";

/// 0.75in
pub const DEFAULT_MARGIN_MM: f32 = 19.05;

const MAX_MARGIN_MM: f32 = 50.0;

/// Same limit as stored item descriptions; longer rows could outgrow a page
const MAX_DESCRIPTION_LENGTH: usize = 255;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PdfRequest {
    pub quotation: Option<PdfQuotation>,
    pub customer: Option<PdfCustomer>,
    #[serde(default)]
    pub items: Vec<PdfItem>,
    pub company: Option<CompanyInfo>,
    pub filename: Option<String>,
    #[serde(default)]
    pub options: PdfOptions,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PdfQuotation {
    /// Number or non-empty string
    pub id: Option<serde_json::Value>,
    pub quotation_number: Option<String>,
    pub quotation_date: Option<String>,
    pub valid_until: Option<String>,
    pub payment_terms: Option<String>,
    pub currency: Option<String>,
    pub conversion_rate: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    /// List of strings, or one string with line breaks
    pub notes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PdfCustomer {
    #[serde(alias = "name")]
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PdfItem {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
}

/// Sender overrides; blank or missing fields fall back to the configured profile
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompanyInfo {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
}

impl CompanyInfo {
    pub fn resolve(&self, defaults: &CompanyProfile) -> CompanyProfile {
        let pick = |value: &Option<String>, fallback: &str| {
            non_blank(value).unwrap_or(fallback).to_string()
        };

        CompanyProfile {
            name: pick(&self.name, &defaults.name),
            address: pick(&self.address, &defaults.address),
            city: pick(&self.city, &defaults.city),
            state: pick(&self.state, &defaults.state),
            postal_code: pick(&self.postal_code, &defaults.postal_code),
            country: pick(&self.country, &defaults.country),
            email: pick(&self.email, &defaults.email),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// Width and height in points
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (595.28, 841.89),
            PageFormat::Letter => (612.0, 792.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct PdfOptions {
    #[serde(default)]
    pub format: PageFormat,
    pub margin_mm: Option<f32>,
}

impl PdfOptions {
    pub fn margin_mm(&self) -> f32 {
        self.margin_mm.unwrap_or(DEFAULT_MARGIN_MM)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn within_total(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= max_total_amount()
}

/// Parse `2025-07-21`, also when followed by a time part
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

impl PdfQuotation {
    /// Identifier text, when the id is a number or a non-empty string
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Notes as individual lines; blank entries dropped
    pub fn note_lines(&self) -> Vec<String> {
        let raw: Vec<String> = match &self.notes {
            Some(serde_json::Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(serde_json::Value::String(text)) => text.lines().map(str::to_string).collect(),
            _ => Vec::new(),
        };

        raw.into_iter()
            .map(|note| note.trim().to_string())
            .filter(|note| !note.is_empty())
            .collect()
    }

    pub fn currency(&self) -> Option<Currency> {
        match non_blank(&self.currency) {
            None => Some(Currency::default()),
            Some(code) => code.parse().ok(),
        }
    }
}

impl PdfRequest {
    /// Check required fields, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();

        match &self.quotation {
            None => errors.add("quotation", "The quotation field is required."),
            Some(quotation) => {
                if quotation.id_text().is_none() {
                    errors.add("quotation.id", "The quotation id field is required.");
                }
                if quotation.currency().is_none() {
                    errors.add(
                        "quotation.currency",
                        "The selected currency is invalid. Allowed values: MYR, JPY.",
                    );
                }
                if quotation
                    .conversion_rate
                    .map_or(false, |r| r <= Decimal::ZERO || r > max_conversion_rate())
                {
                    errors.add(
                        "quotation.conversion_rate",
                        "The conversion rate must be greater than 0 and at most 99999999.9999.",
                    );
                }
                for (field, value) in [
                    ("quotation.tax", quotation.tax),
                    ("quotation.total_amount", quotation.total_amount),
                ] {
                    if value.map_or(false, |v| !within_total(v)) {
                        errors.add(field, "The amount must be between 0 and 999999999999.99.");
                    }
                }
                for (field, value) in [
                    ("quotation.quotation_date", &quotation.quotation_date),
                    ("quotation.valid_until", &quotation.valid_until),
                ] {
                    if let Some(raw) = non_blank(value) {
                        if parse_date(raw).is_none() {
                            errors.add(field, "The date is not a valid date (YYYY-MM-DD).");
                        }
                    }
                }
            }
        }

        let has_customer_name = self
            .customer
            .as_ref()
            .and_then(|c| non_blank(&c.company_name))
            .is_some();
        if !has_customer_name {
            errors.add("customer.company_name", "The customer company name field is required.");
        }

        if self.items.is_empty() {
            errors.add("items", "At least one item is required.");
        }

        for (idx, item) in self.items.iter().enumerate() {
            match non_blank(&item.description) {
                None => errors.add(
                    format!("items.{}.description", idx),
                    "The description field is required.",
                ),
                Some(description) if description.chars().count() > MAX_DESCRIPTION_LENGTH => {
                    errors.add(
                        format!("items.{}.description", idx),
                        "The description may not be greater than 255 characters.",
                    )
                }
                Some(_) => {}
            }
            if item
                .quantity
                .map_or(true, |q| q <= Decimal::ZERO || q > max_quantity())
            {
                errors.add(
                    format!("items.{}.quantity", idx),
                    "The quantity must be greater than 0 and at most 999999.99.",
                );
            }
            if item
                .unit_price
                .map_or(true, |p| p < Decimal::ZERO || p > max_unit_price())
            {
                errors.add(
                    format!("items.{}.unit_price", idx),
                    "The unit price must be between 0 and 99999999.99.",
                );
            }
            if item.line_total.map_or(false, |t| !within_total(t)) {
                errors.add(
                    format!("items.{}.line_total", idx),
                    "The amount must be between 0 and 999999999999.99.",
                );
            }
        }

        let margin = self.options.margin_mm();
        if !margin.is_finite() || !(0.0..=MAX_MARGIN_MM).contains(&margin) {
            errors.add("options.margin_mm", "The margin must be between 0 and 50 mm.");
        }

        errors.into_result()
    }

    /// Download name, forced to end in `.pdf` and stripped of quoting and
    /// control characters
    pub fn filename(&self) -> String {
        let cleaned: String = non_blank(&self.filename)
            .unwrap_or(DEFAULT_FILENAME)
            .chars()
            .filter(|ch| !ch.is_control() && !matches!(ch, '"' | '\\' | '/'))
            .collect();
        let cleaned = cleaned.trim().to_string();

        if cleaned.is_empty() {
            DEFAULT_FILENAME.to_string()
        } else if cleaned.to_lowercase().ends_with(".pdf") {
            cleaned
        } else {
            format!("{}.pdf", cleaned)
        }
    }

    /// Payload for a stored quotation
    pub fn from_stored(quotation: &Quotation, customer: &Customer) -> Self {
        let items = quotation
            .items
            .iter()
            .map(|item| PdfItem {
                description: Some(item.description.clone()),
                quantity: Some(item.quantity),
                unit_price: Some(item.unit_price),
                line_total: Some(item.line_total),
            })
            .collect();

        Self {
            quotation: Some(PdfQuotation {
                id: Some(serde_json::Value::from(quotation.id)),
                quotation_number: None,
                quotation_date: Some(quotation.quotation_date.to_string()),
                valid_until: Some(quotation.valid_until.to_string()),
                payment_terms: Some(quotation.payment_terms.clone()),
                currency: Some(quotation.currency.to_string()),
                conversion_rate: Some(quotation.conversion_rate),
                tax: None,
                // Stored totals exclude tax; let the document add it
                total_amount: None,
                notes: Some(serde_json::Value::from(quotation.notes.clone())),
            }),
            customer: Some(PdfCustomer {
                company_name: Some(customer.name.clone()),
                contact_person: Some(customer.contact_person.clone()),
                email: Some(customer.email.clone()),
                phone: Some(customer.phone.clone()),
                address: Some(customer.address.clone()),
                address2: customer.address2.clone(),
                city: customer.city.clone(),
                state: customer.state.clone(),
                postal_code: customer.postal_code.clone(),
            }),
            items,
            company: None,
            filename: Some(format!("quotation-{}.pdf", quotation.id)),
            options: PdfOptions::default(),
        }
    }
}
