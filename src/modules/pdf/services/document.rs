// QuotationDocument: the computed content of one quotation PDF
//
// All arithmetic happens here, in the base currency, before any layout:
//   subtotal = Σ line totals
//   tax      = explicit tax, else subtotal × default rate (2 dp)
//   total    = explicit total, else subtotal + tax
// Display amounts are converted with the quotation's rate only for JPY.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::config::CompanyProfile;
use crate::core::{AppError, Currency, Result, BASE_CURRENCY};
use crate::modules::pdf::models::{parse_date, PageFormat, PdfRequest};
use crate::modules::quotations::models::{
    checked_line_total, default_conversion_rate, max_total_amount, DEFAULT_PAYMENT_TERMS,
};

fn amount_error(field: impl Into<String>) -> AppError {
    AppError::field(field, "The amount is too large to be rendered.")
}

/// Format a date as `July 21, 2025`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Integral quantities print without decimals, others with two
pub fn format_quantity(quantity: Decimal) -> String {
    let rounded = BASE_CURRENCY.round(quantity);
    if rounded.fract().is_zero() {
        crate::core::currency::group_thousands(rounded, 0)
    } else {
        crate::core::currency::group_thousands(rounded, 2)
    }
}

/// Exchange rates print with up to four decimals, trailing zeros dropped
pub fn format_rate(rate: Decimal) -> String {
    rate.round_dp(4).normalize().to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCustomer {
    pub name: String,
    pub contact_person: Option<String>,
    /// Address, locality, second address line, phone and email, blanks skipped
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLine {
    pub description: String,
    pub quantity: Decimal,
    /// Base currency
    pub unit_price: Decimal,
    /// Base currency
    pub amount: Decimal,
}

/// Page geometry in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageSetup {
    pub fn new(format: PageFormat, margin_mm: f32) -> Self {
        let (width, height) = format.dimensions();
        Self {
            width,
            height,
            margin: margin_mm * 72.0 / 25.4,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotationDocument {
    pub quote_number: String,
    pub issue_date: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub payment_terms: String,
    pub currency: Currency,
    pub conversion_rate: Decimal,
    pub company: CompanyProfile,
    pub customer: DocumentCustomer,
    pub lines: Vec<DocumentLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub notes: Vec<String>,
    pub page: PageSetup,
}

impl QuotationDocument {
    /// Build from a validated request
    pub fn from_request(
        request: &PdfRequest,
        company_defaults: &CompanyProfile,
        default_tax_rate: Decimal,
    ) -> Result<Self> {
        let quotation = request
            .quotation
            .as_ref()
            .ok_or_else(|| AppError::field("quotation", "The quotation field is required."))?;
        let customer = request.customer.as_ref().ok_or_else(|| {
            AppError::field("customer.company_name", "The customer company name field is required.")
        })?;

        let quote_number = match quotation
            .quotation_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            Some(number) => number.to_string(),
            None => format!("QUO-{}", quotation.id_text().unwrap_or_default()),
        };

        let currency = quotation.currency().ok_or_else(|| {
            AppError::field("quotation.currency", "The selected currency is invalid.")
        })?;

        let conversion_rate = quotation
            .conversion_rate
            .unwrap_or_else(default_conversion_rate);

        let lines = request
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| -> Result<DocumentLine> {
                let quantity = item.quantity.unwrap_or_default();
                let unit_price = item.unit_price.unwrap_or_default();
                let amount = match item.line_total {
                    Some(total) => Some(BASE_CURRENCY.round(total)),
                    None => checked_line_total(quantity, unit_price),
                }
                .ok_or_else(|| amount_error(format!("items.{}.quantity", idx)))?;

                Ok(DocumentLine {
                    description: item.description.clone().unwrap_or_default().trim().to_string(),
                    quantity,
                    unit_price,
                    amount,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let subtotal = lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.amount))
            .map(|sum| BASE_CURRENCY.round(sum))
            .filter(|sum| *sum <= max_total_amount())
            .ok_or_else(|| amount_error("items"))?;
        let tax = match quotation.tax {
            Some(tax) => Some(tax),
            None => subtotal.checked_mul(default_tax_rate),
        }
        .map(|tax| BASE_CURRENCY.round(tax))
        .ok_or_else(|| amount_error("quotation.tax"))?;
        let total = match quotation.total_amount {
            Some(total) => Some(total),
            None => subtotal.checked_add(tax),
        }
        .map(|total| BASE_CURRENCY.round(total))
        .ok_or_else(|| amount_error("quotation.total_amount"))?;

        // Every printed amount must survive conversion to the display currency
        let printed = lines
            .iter()
            .flat_map(|line| [line.unit_price, line.amount])
            .chain([subtotal, tax, total]);
        for amount in printed {
            if currency.checked_from_base(amount, conversion_rate).is_none() {
                return Err(amount_error("quotation.conversion_rate"));
            }
        }

        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let locality = text(&customer.city).map(|city| {
            let tail = [text(&customer.state), text(&customer.postal_code)]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            if tail.is_empty() {
                city
            } else {
                format!("{}, {}", city, tail)
            }
        });

        let details = [
            text(&customer.address),
            locality,
            text(&customer.address2),
            text(&customer.phone).map(|p| format!("Tel: {}", p)),
            text(&customer.email).map(|e| format!("Email: {}", e)),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Self {
            quote_number,
            issue_date: quotation
                .quotation_date
                .as_deref()
                .and_then(parse_date)
                .unwrap_or_else(|| Utc::now().date_naive()),
            valid_until: quotation.valid_until.as_deref().and_then(parse_date),
            payment_terms: text(&quotation.payment_terms)
                .unwrap_or_else(|| DEFAULT_PAYMENT_TERMS.to_string()),
            currency,
            conversion_rate,
            company: request
                .company
                .as_ref()
                .map(|c| c.resolve(company_defaults))
                .unwrap_or_else(|| company_defaults.clone()),
            customer: DocumentCustomer {
                name: text(&customer.company_name).unwrap_or_default(),
                contact_person: text(&customer.contact_person),
                details,
            },
            lines,
            subtotal,
            tax,
            total,
            notes: quotation.note_lines(),
            page: PageSetup::new(request.options.format, request.options.margin_mm()),
        })
    }

    /// Base amount converted and formatted in the display currency
    pub fn money(&self, base_amount: Decimal) -> String {
        self.currency
            .format_amount(self.currency.from_base(base_amount, self.conversion_rate))
    }

    /// `1 MYR = 32.15 JPY`, only for JPY quotations
    pub fn exchange_rate_line(&self) -> Option<String> {
        match self.currency {
            Currency::JPY => Some(format!(
                "1 {} = {} {}",
                BASE_CURRENCY,
                format_rate(self.conversion_rate),
                self.currency
            )),
            Currency::MYR => None,
        }
    }

    pub fn issue_date_text(&self) -> String {
        format_long_date(self.issue_date)
    }

    pub fn valid_until_text(&self) -> String {
        self.valid_until.map(format_long_date).unwrap_or_default()
    }

    /// Sender lines under the company name
    pub fn company_lines(&self) -> Vec<String> {
        let company = &self.company;
        vec![
            company.address.clone(),
            company.city.clone(),
            format!("{}, {}", company.state, company.postal_code),
            company.country.clone(),
            format!("Email: {}", company.email),
        ]
    }
}
