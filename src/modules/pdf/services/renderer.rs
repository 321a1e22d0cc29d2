// PdfRenderer: turns quotation payloads into PDF bytes
//
// The renderer holds only immutable settings, so one instance is shared by
// every worker behind an `Arc`. Rendering is CPU-bound and synchronous;
// callers run it on the blocking pool.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use rust_decimal::Decimal;

use super::document::QuotationDocument;
use super::fonts::{encode_win_ansi, Font};
use super::layout::{layout, DrawOp, PageContent};
use crate::config::{CompanyProfile, PdfConfig};
use crate::core::{AppError, Result};
use crate::modules::pdf::models::PdfRequest;

const PRODUCER: &str = concat!("quotely ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    company: CompanyProfile,
    default_tax_rate: Decimal,
}

impl PdfRenderer {
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            company: config.company.clone(),
            default_tax_rate: config.default_tax_rate,
        }
    }

    /// Validate a payload and render it
    pub fn render_request(&self, request: &PdfRequest) -> Result<Vec<u8>> {
        request.validate()?;
        let document = self.document(request)?;
        self.render(&document)
    }

    /// Compute document content without laying it out
    pub fn document(&self, request: &PdfRequest) -> Result<QuotationDocument> {
        QuotationDocument::from_request(request, &self.company, self.default_tax_rate)
    }

    pub fn render(&self, document: &QuotationDocument) -> Result<Vec<u8>> {
        let started = std::time::Instant::now();
        let pages = layout(document);

        let mut pdf = Document::with_version("1.5");
        let pages_id = pdf.new_object_id();

        let regular_id = pdf.add_object(font_dictionary(Font::Regular));
        let bold_id = pdf.add_object(font_dictionary(Font::Bold));
        let resources_id = pdf.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource_name() => regular_id,
                Font::Bold.resource_name() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in &pages {
            let page_id = add_page(&mut pdf, pages_id, page)?;
            kids.push(page_id.into());
        }

        let (width, height) = (document.page.width, document.page.height);
        let page_count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), width.into(), height.into()],
        };
        pdf.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = pdf.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = pdf.add_object(dictionary! {
            "Title" => Object::String(
                encode_win_ansi(&format!("Quotation {}", document.quote_number)),
                StringFormat::Literal,
            ),
            "Producer" => Object::string_literal(PRODUCER),
        });
        pdf.trailer.set("Root", catalog_id);
        pdf.trailer.set("Info", info_id);
        pdf.compress();

        let mut bytes = Vec::new();
        pdf.save_to(&mut bytes)
            .map_err(|e| AppError::Pdf(format!("Failed to write PDF: {}", e)))?;

        tracing::debug!(
            quote_number = %document.quote_number,
            pages = pages.len(),
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Quotation PDF rendered"
        );

        Ok(bytes)
    }
}

fn font_dictionary(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn add_page(pdf: &mut Document, parent: ObjectId, page: &PageContent) -> Result<ObjectId> {
    let content: Content<Vec<Operation>> = Content {
        operations: page.ops.iter().flat_map(operations).collect(),
    };
    let encoded = content
        .encode()
        .map_err(|e| AppError::Pdf(format!("Failed to encode page content: {}", e)))?;

    let content_id = pdf.add_object(Stream::new(lopdf::Dictionary::new(), encoded));
    Ok(pdf.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

fn operations(op: &DrawOp) -> Vec<Operation> {
    match op {
        DrawOp::Text {
            x,
            y,
            size,
            font,
            gray,
            text,
        } => vec![
            Operation::new("BT", vec![]),
            Operation::new("g", vec![(*gray).into()]),
            Operation::new("Tf", vec![font.resource_name().into(), (*size).into()]),
            Operation::new("Td", vec![(*x).into(), (*y).into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
        DrawOp::Line {
            from,
            to,
            width,
            gray,
        } => vec![
            Operation::new("q", vec![]),
            Operation::new("w", vec![(*width).into()]),
            Operation::new("G", vec![(*gray).into()]),
            Operation::new("m", vec![from.0.into(), from.1.into()]),
            Operation::new("l", vec![to.0.into(), to.1.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ],
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            gray,
        } => vec![
            Operation::new("q", vec![]),
            Operation::new("g", vec![(*gray).into()]),
            Operation::new("re", vec![(*x).into(), (*y).into(), (*width).into(), (*height).into()]),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ],
    }
}
