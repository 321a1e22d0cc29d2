pub mod document;
pub mod fonts;
pub mod layout;
pub mod renderer;

pub use document::{PageSetup, QuotationDocument};
pub use layout::{layout, DrawOp, PageContent};
pub use renderer::PdfRenderer;
