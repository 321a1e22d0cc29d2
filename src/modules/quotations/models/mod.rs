mod quotation;
mod quotation_item;
mod quotation_request;
mod quotation_response;
mod status;

pub use quotation::{
    calculate_total, default_conversion_rate, default_valid_until, max_conversion_rate, Quotation,
    QuotationDraft, QuotationFilter, QuotationItemRow, QuotationRow, CONVERSION_RATE_SCALE,
    DEFAULT_PAYMENT_TERMS, DEFAULT_VALIDITY_DAYS,
};
pub use quotation_item::{
    checked_line_total, line_total, max_quantity, max_total_amount, max_unit_price,
    min_item_amount, NewQuotationItem, QuotationItem,
};
pub use quotation_request::{QuotationItemRequest, QuotationRequest, StatusUpdateRequest};
pub use quotation_response::QuotationResponse;
pub use status::QuotationStatus;
