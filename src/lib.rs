//! Quotation management service
//!
//! Customers, quotations with line items, and PDF rendering behind a JSON
//! REST API.

pub mod app;
pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use app::AppState;
pub use modules::customers;
pub use modules::pdf;
pub use modules::quotations;
