pub mod currency;
pub mod error;
pub mod pagination;

pub use currency::{Currency, BASE_CURRENCY};
pub use error::{AppError, FieldErrors, Result};
pub use pagination::{Page, PageRequest};
