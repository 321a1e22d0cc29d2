use serde::{Deserialize, Serialize};
use std::fmt;

/// Quotation status values.
///
/// Any status may be set from any other; `suggested_next` only mirrors the
/// ordering the frontend offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuotationStatus {
    /// Being prepared, not yet shown to the customer
    #[default]
    Draft,
    /// Sent to the customer
    Sent,
    /// Customer accepted the offer
    Accepted,
    /// Customer declined the offer
    Declined,
    /// Validity period passed without an answer
    Expired,
}

impl QuotationStatus {
    pub const ALL: [QuotationStatus; 5] = [
        QuotationStatus::Draft,
        QuotationStatus::Sent,
        QuotationStatus::Accepted,
        QuotationStatus::Declined,
        QuotationStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "Draft",
            QuotationStatus::Sent => "Sent",
            QuotationStatus::Accepted => "Accepted",
            QuotationStatus::Declined => "Declined",
            QuotationStatus::Expired => "Expired",
        }
    }

    /// Statuses the frontend offers next. Advisory only.
    pub fn suggested_next(&self) -> &'static [QuotationStatus] {
        match self {
            QuotationStatus::Draft => &[QuotationStatus::Sent, QuotationStatus::Expired],
            QuotationStatus::Sent => &[
                QuotationStatus::Accepted,
                QuotationStatus::Declined,
                QuotationStatus::Expired,
            ],
            QuotationStatus::Accepted | QuotationStatus::Declined | QuotationStatus::Expired => &[],
        }
    }

    /// Message used when a client sends a value outside the enum
    pub fn invalid_message() -> String {
        let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
        format!("The selected status is invalid. Allowed values: {}.", allowed.join(", "))
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuotationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        QuotationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid quotation status: {}", s))
    }
}
