use serde::Serialize;

use super::quotation::Quotation;
use super::status::QuotationStatus;
use crate::modules::customers::Customer;

/// Quotation as returned by the API: header, items and owning customer
#[derive(Debug, Clone, Serialize)]
pub struct QuotationResponse {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub is_deleted: bool,
    /// Advisory next statuses for the frontend
    pub next_statuses: Vec<QuotationStatus>,
    pub customer: Option<Customer>,
}

impl QuotationResponse {
    pub fn new(quotation: Quotation, customer: Option<Customer>) -> Self {
        Self {
            is_deleted: quotation.is_deleted(),
            next_statuses: quotation.status.suggested_next().to_vec(),
            quotation,
            customer,
        }
    }
}
