// Quotations module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Quotation, QuotationDraft, QuotationRequest, QuotationResponse, QuotationStatus};
pub use repositories::{MySqlQuotationRepository, QuotationRepository};
pub use services::QuotationService;
