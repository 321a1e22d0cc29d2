// PDF module: quotation documents rendered natively with lopdf

pub mod controllers;
pub mod models;
pub mod services;

pub use models::PdfRequest;
pub use services::{PdfRenderer, QuotationDocument};
