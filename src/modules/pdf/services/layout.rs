// Page layout for quotation documents
//
// Produces positioned drawing operations in PDF user space (points, origin
// bottom-left). The layout walks down the page with a cursor; the item
// table repeats its header on every page it spills onto, and the totals and
// notes move to a fresh page when they do not fit.

use super::document::{format_quantity, PageSetup, QuotationDocument};
use super::fonts::{wrap_text, Font};

/// A single drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline starting at (x, y); `gray` 0 is black, 1 white
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        gray: f32,
        text: String,
    },
    /// Stroked line
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        gray: f32,
    },
    /// Filled rectangle with its lower-left corner at (x, y)
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        gray: f32,
    },
}

/// Operations of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub ops: Vec<DrawOp>,
}

impl PageContent {
    /// Every text run on the page, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

const FOOTER_HEIGHT: f32 = 18.0;
const BODY_SIZE: f32 = 9.5;
const CELL_PADDING: f32 = 6.0;
const HEADER_ROW_HEIGHT: f32 = 22.0;

enum Block {
    Text(Font, f32, String),
    Gap(f32),
}

fn leading(size: f32) -> f32 {
    size * 1.3
}

struct Composer<'a> {
    doc: &'a QuotationDocument,
    setup: PageSetup,
    pages: Vec<PageContent>,
    ops: Vec<DrawOp>,
    y: f32,
}

impl<'a> Composer<'a> {
    fn new(doc: &'a QuotationDocument) -> Self {
        let setup = doc.page;
        Self {
            doc,
            setup,
            pages: Vec::new(),
            ops: Vec::new(),
            y: setup.height - setup.margin,
        }
    }

    fn left(&self) -> f32 {
        self.setup.margin
    }

    fn right(&self) -> f32 {
        self.setup.width - self.setup.margin
    }

    fn bottom(&self) -> f32 {
        self.setup.margin + FOOTER_HEIGHT
    }

    fn content_width(&self) -> f32 {
        self.setup.content_width()
    }

    fn new_page(&mut self) {
        self.pages.push(PageContent {
            ops: std::mem::take(&mut self.ops),
        });
        self.y = self.setup.height - self.setup.margin;
    }

    fn fits(&self, height: f32) -> bool {
        self.y - height >= self.bottom()
    }

    /// Start a new page unless `height` still fits; true when a page was added
    fn ensure(&mut self, height: f32) -> bool {
        if self.fits(height) {
            return false;
        }
        self.new_page();
        true
    }

    fn text(&mut self, x: f32, y: f32, size: f32, font: Font, text: impl Into<String>) {
        self.colored_text(x, y, size, font, 0.0, text);
    }

    fn colored_text(&mut self, x: f32, y: f32, size: f32, font: Font, gray: f32, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            gray,
            text,
        });
    }

    fn text_right(&mut self, right: f32, y: f32, size: f32, font: Font, text: impl Into<String>) {
        let text = text.into();
        let x = right - font.text_width(&text, size);
        self.text(x, y, size, font, text);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, gray: f32) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            width,
            gray,
        });
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, gray: f32) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            gray,
        });
    }

    /// Draw stacked blocks from `top`; returns the y below the last line
    fn column(&mut self, x: f32, top: f32, width: f32, blocks: Vec<Block>) -> f32 {
        let mut y = top;
        for block in blocks {
            match block {
                Block::Gap(height) => y -= height,
                Block::Text(font, size, text) => {
                    for line in wrap_text(&text, font, size, width) {
                        y -= leading(size);
                        self.text(x, y, size, font, line);
                    }
                }
            }
        }
        y
    }

    fn title(&mut self) {
        let (left, right) = (self.left(), self.right());
        let baseline = self.y - 20.0;
        self.text(left, baseline, 20.0, Font::Bold, "QUOTATION");
        self.line((left, baseline - 8.0), (right, baseline - 8.0), 1.5, 0.0);
        self.y = baseline - 24.0;
    }

    fn header(&mut self) {
        let doc = self.doc;
        let half = self.content_width() / 2.0;
        let left_x = self.left();
        let right_x = self.left() + half + 10.0;
        let column_width = half - 10.0;

        let mut left_blocks = vec![Block::Text(Font::Bold, 12.0, doc.company.name.clone())];
        left_blocks.extend(
            doc.company_lines()
                .into_iter()
                .map(|line| Block::Text(Font::Regular, BODY_SIZE, line)),
        );
        left_blocks.push(Block::Gap(12.0));
        left_blocks.push(Block::Text(Font::Bold, 10.5, doc.customer.name.clone()));
        if let Some(contact) = &doc.customer.contact_person {
            left_blocks.push(Block::Text(Font::Regular, BODY_SIZE, contact.clone()));
        }
        left_blocks.push(Block::Gap(8.0));
        left_blocks.push(Block::Text(
            Font::Regular,
            BODY_SIZE,
            "We are pleased to submit the following quotation.".to_string(),
        ));

        let mut right_blocks = vec![
            Block::Text(Font::Regular, 10.0, format!("Issue Date: {}", doc.issue_date_text())),
            Block::Text(Font::Regular, 10.0, format!("Quote No.: {}", doc.quote_number)),
            Block::Gap(12.0),
            Block::Text(Font::Bold, 12.0, doc.customer.name.clone()),
        ];
        right_blocks.extend(
            doc.customer
                .details
                .iter()
                .map(|line| Block::Text(Font::Regular, BODY_SIZE, line.clone())),
        );

        let top = self.y;
        let left_end = self.column(left_x, top, column_width, left_blocks);
        let right_end = self.column(right_x, top, column_width, right_blocks);
        self.y = left_end.min(right_end) - 18.0;
    }

    fn amount_section(&mut self) {
        let doc = self.doc;
        let mut rows = vec![
            ("Payment Terms", doc.payment_terms.clone()),
            ("Valid Until", doc.valid_until_text()),
        ];
        if let Some(rate) = doc.exchange_rate_line() {
            rows.push(("Exchange Rate", rate));
        }

        let height = (rows.len() as f32 * 18.0 + 12.0).max(56.0);
        self.ensure(height);

        let half = self.content_width() / 2.0;
        let box_width = half - 10.0;
        let top = self.y;
        let left = self.left();

        self.rect(left, top - height, box_width, height, 0.93);
        self.text(left + 12.0, top - 20.0, 10.0, Font::Regular, "Quote Amount");
        self.text(left + 12.0, top - 44.0, 18.0, Font::Bold, doc.money(doc.subtotal));

        let table_x = left + half + 10.0;
        let value_x = table_x + box_width / 2.0;
        for (idx, (label, value)) in rows.into_iter().enumerate() {
            let baseline = top - 16.0 - idx as f32 * 18.0;
            self.text(table_x, baseline, 10.0, Font::Regular, label);
            self.text(value_x, baseline, 10.0, Font::Bold, value);
            let rule = baseline - 6.0;
            self.line((table_x, rule), (self.right(), rule), 0.5, 0.8);
        }

        self.y = top - height - 20.0;
    }

    /// Right edges of the Qty, Unit Price and Amount columns, plus the
    /// description column width
    fn table_columns(&self) -> (f32, f32, f32, f32) {
        let width = self.content_width();
        let description_end = self.left() + width * 0.5;
        let qty_end = description_end + width * 0.15;
        let price_end = qty_end + width * 0.175;
        (description_end - self.left(), qty_end, price_end, self.right())
    }

    fn table_header(&mut self) {
        let (left, right) = (self.left(), self.right());
        let (_, qty_end, price_end, amount_end) = self.table_columns();
        let top = self.y;
        let baseline = top - 15.0;

        self.rect(left, top - HEADER_ROW_HEIGHT, right - left, HEADER_ROW_HEIGHT, 0.25);
        self.colored_text(left + CELL_PADDING, baseline, 10.0, Font::Bold, 1.0, "Description");
        for (edge, label) in [(qty_end, "Qty"), (price_end, "Unit Price"), (amount_end, "Amount")] {
            let x = edge - CELL_PADDING - Font::Bold.text_width(label, 10.0);
            self.colored_text(x, baseline, 10.0, Font::Bold, 1.0, label);
        }

        self.y = top - HEADER_ROW_HEIGHT;
    }

    fn items_table(&mut self) {
        let doc = self.doc;
        if !self.fits(HEADER_ROW_HEIGHT + 30.0) {
            self.new_page();
        }
        self.table_header();

        let (description_width, qty_end, price_end, amount_end) = self.table_columns();
        let row_leading = leading(BODY_SIZE);

        for line in &doc.lines {
            let wrapped = wrap_text(
                &line.description,
                Font::Regular,
                BODY_SIZE,
                description_width - 2.0 * CELL_PADDING,
            );
            let row_height = wrapped.len() as f32 * row_leading + 10.0;

            if self.ensure(row_height) {
                let caption = format!("Quote No.: {} (continued)", doc.quote_number);
                let baseline = self.y - 12.0;
                self.text(self.left(), baseline, 10.0, Font::Bold, caption);
                self.y = baseline - 10.0;
                self.table_header();
            }

            let top = self.y;
            let first_baseline = top - 5.0 - BODY_SIZE;
            for (idx, text) in wrapped.into_iter().enumerate() {
                let baseline = first_baseline - idx as f32 * row_leading;
                self.text(self.left() + CELL_PADDING, baseline, BODY_SIZE, Font::Regular, text);
            }

            let quantity = format_quantity(line.quantity);
            let unit_price = doc.money(line.unit_price);
            let amount = doc.money(line.amount);
            self.text_right(qty_end - CELL_PADDING, first_baseline, BODY_SIZE, Font::Regular, quantity);
            self.text_right(price_end - CELL_PADDING, first_baseline, BODY_SIZE, Font::Regular, unit_price);
            self.text_right(amount_end - CELL_PADDING, first_baseline, BODY_SIZE, Font::Regular, amount);

            let rule = top - row_height;
            self.line((self.left(), rule), (self.right(), rule), 0.5, 0.85);
            self.y = rule;
        }

        self.y -= 14.0;
    }

    fn totals(&mut self) {
        let doc = self.doc;
        let height = 3.0 * 18.0 + 10.0;
        self.ensure(height);

        let label_x = self.right() - self.content_width() * 0.4;
        let value_right = self.right() - CELL_PADDING;
        let top = self.y;

        let rows = [
            ("Subtotal", doc.money(doc.subtotal)),
            ("Sales Tax", doc.money(doc.tax)),
        ];
        for (idx, (label, value)) in rows.into_iter().enumerate() {
            let baseline = top - 14.0 - idx as f32 * 18.0;
            self.text(label_x, baseline, 10.0, Font::Regular, label);
            self.text_right(value_right, baseline, 10.0, Font::Regular, value);
        }

        let rule = top - 14.0 - 2.0 * 18.0 + 12.0;
        self.line((label_x, rule), (self.right(), rule), 1.0, 0.0);
        let baseline = rule - 16.0;
        self.text(label_x, baseline, 11.0, Font::Bold, "Total Amount");
        self.text_right(value_right, baseline, 11.0, Font::Bold, doc.money(doc.total));

        self.y = top - height - 16.0;
    }

    fn notes(&mut self) {
        let doc = self.doc;
        if doc.notes.is_empty() {
            return;
        }

        self.ensure(40.0);
        let (left, right) = (self.left(), self.right());
        let baseline = self.y - 12.0;
        self.text(left, baseline, 11.0, Font::Bold, "Notes");
        self.line((left, baseline - 5.0), (right, baseline - 5.0), 0.5, 0.6);
        self.y = baseline - 8.0;

        let width = self.content_width() - 10.0;
        for note in &doc.notes {
            let wrapped = wrap_text(note, Font::Regular, BODY_SIZE, width);
            for (idx, text) in wrapped.into_iter().enumerate() {
                self.ensure(leading(BODY_SIZE));
                self.y -= leading(BODY_SIZE);
                let text = if idx == 0 {
                    format!("• {}", text)
                } else {
                    format!("  {}", text)
                };
                self.text(left, self.y, BODY_SIZE, Font::Regular, text);
            }
        }
    }

    fn finish(mut self) -> Vec<PageContent> {
        self.pages.push(PageContent {
            ops: std::mem::take(&mut self.ops),
        });

        let count = self.pages.len();
        let right = self.right();
        let baseline = self.setup.margin + 4.0;
        for (idx, page) in self.pages.iter_mut().enumerate() {
            let label = format!("Page {} of {}", idx + 1, count);
            let x = right - Font::Regular.text_width(&label, 8.0);
            page.ops.push(DrawOp::Text {
                x,
                y: baseline,
                size: 8.0,
                font: Font::Regular,
                gray: 0.4,
                text: label,
            });
        }

        self.pages
    }
}

/// Lay out a document into pages
pub fn layout(doc: &QuotationDocument) -> Vec<PageContent> {
    let mut composer = Composer::new(doc);
    composer.title();
    composer.header();
    composer.amount_section();
    composer.items_table();
    composer.totals();
    composer.notes();
    composer.finish()
}
