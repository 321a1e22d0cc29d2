mod pdf_request;

pub use pdf_request::{
    parse_date, CompanyInfo, PageFormat, PdfCustomer, PdfItem, PdfOptions, PdfQuotation,
    PdfRequest, DEFAULT_FILENAME, DEFAULT_MARGIN_MM,
};
