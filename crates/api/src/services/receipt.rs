//! PDF invoices for an employee's day of sales or a single sale.
//!
//! Rendered with `pdf-writer` on A4 pages using the built-in Helvetica
//! fonts, so no font files are embedded. Long tables break onto new pages
//! with the column headers repeated. Text is encoded as WinAnsi (Latin-1);
//! characters outside it print as `?`.

use chrono::NaiveDate;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use rust_decimal::Decimal;

use stockroom_core::{TAX_RATE_PERCENT, line_total, tax_on};

use crate::config::CompanyConfig;
use crate::models::SaleSnapshot;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 42.0;
/// Lowest baseline for body text; the footer sits below it.
const BOTTOM_MARGIN: f32 = 60.0;
const FOOTER_Y: f32 = 30.0;
const ROW_HEIGHT: f32 = 24.0;
/// Gap plus the three total rows.
const TOTALS_HEIGHT: f32 = 80.0;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

/// Table columns: header, width in points.
const COLUMNS: [(&str, f32); 5] = [
    ("Description", 170.0),
    ("Quantity", 85.0),
    ("Unit Price", 113.0),
    ("Taxes", 71.0),
    ("Amount", 72.0),
];

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl ReceiptLine {
    #[must_use]
    pub fn amount(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// Everything printed on an invoice.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Employee or sale ID the document is about.
    pub document_id: String,
    pub issued_on: NaiveDate,
    pub client_name: String,
    pub client_address: Vec<String>,
    pub lines: Vec<ReceiptLine>,
}

impl Receipt {
    /// Build an invoice from sale snapshots. The client is the seller named
    /// on the first snapshot.
    ///
    /// Returns `None` when there are no snapshots.
    #[must_use]
    pub fn from_snapshots(
        document_id: impl Into<String>,
        issued_on: NaiveDate,
        snapshots: &[SaleSnapshot],
    ) -> Option<Self> {
        let first = snapshots.first()?;
        Some(Self {
            document_id: document_id.into(),
            issued_on,
            client_name: first.employee_name.clone(),
            client_address: vec![first.employee_address.clone()],
            lines: snapshots
                .iter()
                .map(|s| ReceiptLine {
                    description: s.product_name.clone(),
                    quantity: s.sale_quantity,
                    unit_price: s.product_price,
                })
                .collect(),
        })
    }

    /// `EMP-{id}-{YYYYMMDD}`.
    #[must_use]
    pub fn invoice_number(&self) -> String {
        format!("EMP-{}-{}", self.document_id, self.issued_on.format("%Y%m%d"))
    }

    #[must_use]
    pub fn untaxed(&self) -> Decimal {
        self.lines.iter().map(ReceiptLine::amount).sum()
    }

    #[must_use]
    pub fn tax(&self) -> Decimal {
        tax_on(self.untaxed())
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.untaxed() + self.tax()
    }

    /// `inline; filename="Report-{id}.pdf"`.
    #[must_use]
    pub fn content_disposition(&self) -> String {
        format!("inline; filename=\"Report-{}.pdf\"", self.document_id)
    }

    /// Render the invoice as a PDF document.
    #[must_use]
    pub fn render(&self, company: &CompanyConfig) -> Vec<u8> {
        let contents = self.layout(company);

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let regular_id = Ref::new(3);
        let bold_id = Ref::new(4);
        let mut next_id = Ref::new(5);
        let page_ids: Vec<(Ref, Ref)> = contents
            .iter()
            .map(|_| (next_id.bump(), next_id.bump()))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().map(|(page_id, _)| *page_id))
            .count(i32::try_from(page_ids.len()).unwrap_or(i32::MAX));

        for ((page_id, content_id), content) in page_ids.iter().zip(&contents) {
            {
                let mut page = pdf.page(*page_id);
                page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
                page.parent(page_tree_id);
                page.contents(*content_id);
                let mut resources = page.resources();
                let mut fonts = resources.fonts();
                fonts.pair(REGULAR, regular_id);
                fonts.pair(BOLD, bold_id);
            }
            pdf.stream(*content_id, content);
        }

        pdf.type1_font(regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        pdf.finish()
    }

    /// Content streams, one per page.
    fn layout(&self, company: &CompanyConfig) -> Vec<Vec<u8>> {
        let mut page = PageWriter::new(&company.name);
        write_header(&mut page, company);
        self.write_details(&mut page);
        self.write_table(&mut page);
        self.write_totals(&mut page);
        page.finish()
    }

    fn write_details(&self, page: &mut PageWriter<'_>) {
        page.text_left(BOLD, 12.0, &format!("Invoice {}", self.invoice_number()));
        let date = format_date(self.issued_on);
        page.advance(18.0);
        page.text_left(REGULAR, 10.0, &format!("Invoice Date: {date}"));
        page.advance(14.0);
        page.text_left(REGULAR, 10.0, &format!("Due Date: {date}"));
        page.advance(30.0);

        page.text_left(BOLD, 12.0, &self.client_name);
        for line in &self.client_address {
            page.advance(14.0);
            page.text_left(REGULAR, 10.0, line);
        }
        page.advance(30.0);
    }

    fn write_table(&self, page: &mut PageWriter<'_>) {
        let headers = COLUMNS.map(|(header, _)| header.to_string());
        if !page.has_room(2.0 * ROW_HEIGHT) {
            page.break_page();
        }
        page.table_row(BOLD, &headers);

        let tax_label = format!("{TAX_RATE_PERCENT}%");
        for line in &self.lines {
            if !page.has_room(ROW_HEIGHT) {
                page.break_page();
                page.table_row(BOLD, &headers);
            }
            page.table_row(
                REGULAR,
                &[
                    line.description.clone(),
                    line.quantity.to_string(),
                    format_money(line.unit_price),
                    tax_label.clone(),
                    format_money(line.amount()),
                ],
            );
        }
    }

    fn write_totals(&self, page: &mut PageWriter<'_>) {
        let label_right = MARGIN + COLUMNS.iter().take(4).map(|(_, w)| w).sum::<f32>() - 8.0;
        let value_center = PAGE_WIDTH - MARGIN - COLUMNS[4].1 / 2.0;

        if !page.has_room(TOTALS_HEIGHT) {
            page.break_page();
        }
        page.advance(20.0);
        let rows = [
            ("Untaxed Amount".to_string(), self.untaxed()),
            (format!("Tax {TAX_RATE_PERCENT}%"), self.tax()),
            ("Total".to_string(), self.total()),
        ];
        for (label, value) in rows {
            page.advance(20.0);
            page.text_right(BOLD, 10.0, label_right, &label);
            page.text_centered(BOLD, 10.0, value_center, page.y, &format_money(value));
        }
    }
}

fn write_header(page: &mut PageWriter<'_>, company: &CompanyConfig) {
    let right = PAGE_WIDTH - MARGIN;
    page.advance(12.0);
    page.text_right(BOLD, 12.0, right, &company.name);
    page.advance(8.0);
    for line in &company.address_lines {
        page.advance(12.0);
        page.text_right(REGULAR, 10.0, right, line);
    }
    page.advance(40.0);
}

/// Cursor over the current page's content stream, moving top to bottom.
/// Finished pages are kept in order.
struct PageWriter<'a> {
    footer: &'a str,
    pages: Vec<Vec<u8>>,
    content: Content,
    y: f32,
}

impl<'a> PageWriter<'a> {
    fn new(footer: &'a str) -> Self {
        Self {
            footer,
            pages: Vec::new(),
            content: Content::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn has_room(&self, height: f32) -> bool {
        self.y - height >= BOTTOM_MARGIN
    }

    /// Close the current page with its footer and start a fresh one.
    fn break_page(&mut self) {
        let footer = format!("Page {} | {}", self.pages.len() + 1, self.footer);
        self.text_centered(REGULAR, 8.0, PAGE_WIDTH / 2.0, FOOTER_Y, &footer);
        let content = std::mem::replace(&mut self.content, Content::new());
        self.pages.push(content.finish());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        self.break_page();
        self.pages
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
    }

    fn text_at(&mut self, font: Name<'_>, size: f32, x: f32, y: f32, text: &str) {
        let bytes = latin1(text);
        self.content.begin_text();
        self.content.set_font(font, size);
        self.content.next_line(x, y);
        self.content.show(Str(&bytes));
        self.content.end_text();
    }

    fn text_left(&mut self, font: Name<'_>, size: f32, text: &str) {
        self.text_at(font, size, MARGIN, self.y, text);
    }

    fn text_right(&mut self, font: Name<'_>, size: f32, right: f32, text: &str) {
        let x = right - text_width(text, size);
        self.text_at(font, size, x, self.y, text);
    }

    fn text_centered(&mut self, font: Name<'_>, size: f32, center: f32, y: f32, text: &str) {
        let x = center - text_width(text, size) / 2.0;
        self.text_at(font, size, x, y, text);
    }

    /// One bordered row; the first column is left-aligned, the rest centered.
    fn table_row(&mut self, font: Name<'_>, cells: &[String]) {
        let top = self.y;
        let bottom = top - ROW_HEIGHT;
        let baseline = bottom + 8.0;

        let mut x = MARGIN;
        for (index, ((_, width), cell)) in COLUMNS.iter().zip(cells).enumerate() {
            self.content.rect(x, bottom, *width, ROW_HEIGHT);
            self.content.stroke();
            if index == 0 {
                self.text_at(font, 10.0, x + 4.0, baseline, cell);
            } else {
                self.text_centered(font, 10.0, x + width / 2.0, baseline, cell);
            }
            x += width;
        }
        self.y = bottom;
    }
}

/// `DD/MM/YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `$1234.50`.
#[must_use]
pub fn format_money(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

/// Encode text as Latin-1, replacing anything outside it with `?`.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Rough Helvetica width: half an em per character.
#[allow(clippy::cast_precision_loss)]
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    fn receipt() -> Receipt {
        Receipt {
            document_id: "42".to_string(),
            issued_on: day(),
            client_name: "Joana Matos".to_string(),
            client_address: vec!["Rua das Flores 12".to_string()],
            lines: vec![
                ReceiptLine {
                    description: "Café moído 250g".to_string(),
                    quantity: 2,
                    unit_price: Decimal::new(350, 2),
                },
                ReceiptLine {
                    description: "Açúcar 1kg".to_string(),
                    quantity: 1,
                    unit_price: Decimal::new(129, 2),
                },
            ],
        }
    }

    #[test]
    fn test_totals() {
        let receipt = receipt();
        assert_eq!(receipt.untaxed(), Decimal::new(829, 2));
        assert_eq!(receipt.tax(), Decimal::new(124, 2));
        assert_eq!(receipt.total(), Decimal::new(953, 2));
    }

    #[test]
    fn test_invoice_number_and_dates() {
        let receipt = receipt();
        assert_eq!(receipt.invoice_number(), "EMP-42-20260307");
        assert_eq!(format_date(receipt.issued_on), "07/03/2026");
        assert_eq!(receipt.content_disposition(), "inline; filename=\"Report-42.pdf\"");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::new(5, 0)), "$5.00");
        assert_eq!(format_money(Decimal::new(12346, 3)), "$12.35");
    }

    #[test]
    fn test_latin1_encoding() {
        assert_eq!(latin1("Açúcar"), vec![b'A', 0xE7, 0xFA, b'c', b'a', b'r']);
        assert_eq!(latin1("€5"), vec![b'?', b'5']);
    }

    #[test]
    fn test_render_produces_pdf() {
        let company = CompanyConfig {
            name: "Mercearia Central".to_string(),
            address_lines: vec!["Praça Nova 3".to_string(), "4000-001 Porto".to_string()],
        };
        let bytes = receipt().render(&company);

        assert!(bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Helvetica-Bold"));
        assert!(text.contains("/WinAnsiEncoding"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    fn company() -> CompanyConfig {
        CompanyConfig {
            name: "Mercearia Central".to_string(),
            address_lines: vec!["Praça Nova 3".to_string()],
        }
    }

    /// Vertical operands of every `Td` in a content stream.
    fn text_baselines(content: &[u8]) -> Vec<f32> {
        let text = String::from_utf8_lossy(content);
        let tokens: Vec<&str> = text.split_whitespace().collect();
        tokens
            .windows(2)
            .filter(|pair| pair[1] == "Td")
            .map(|pair| pair[0].parse::<f32>().unwrap())
            .collect()
    }

    #[test]
    fn test_long_receipt_breaks_pages() {
        let mut receipt = receipt();
        receipt.lines = (0..60)
            .map(|i| ReceiptLine {
                description: format!("Item {i}"),
                quantity: 1,
                unit_price: Decimal::new(100, 2),
            })
            .collect();

        let pages = receipt.layout(&company());
        assert!(pages.len() > 1, "expected several pages, got {}", pages.len());

        for (index, content) in pages.iter().enumerate() {
            let baselines = text_baselines(content);
            assert!(!baselines.is_empty());
            for y in baselines {
                let is_footer = (y - FOOTER_Y).abs() < f32::EPSILON;
                assert!(
                    is_footer || y >= BOTTOM_MARGIN,
                    "page {} has text at y={y}",
                    index + 1
                );
            }
            let text = String::from_utf8_lossy(content);
            assert!(text.contains("(Description)"));
            assert!(text.contains(&format!("(Page {} | Mercearia Central)", index + 1)));
        }

        let all: String = pages.iter().map(|c| String::from_utf8_lossy(c)).collect();
        for i in 0..60 {
            assert!(all.contains(&format!("(Item {i})")));
        }

        let last = String::from_utf8_lossy(pages.last().unwrap());
        assert!(last.contains("(Total)"));
        assert!(!String::from_utf8_lossy(&pages[0]).contains("(Total)"));
    }

    #[test]
    fn test_short_receipt_fits_one_page() {
        assert_eq!(receipt().layout(&company()).len(), 1);
    }

    #[test]
    fn test_render_counts_every_page() {
        let mut receipt = receipt();
        receipt.lines = vec![receipt.lines.clone(); 30].concat();
        let pages = receipt.layout(&company()).len();

        let bytes = receipt.render(&company());
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains(&format!("/Count {pages}")));
    }

    #[test]
    fn test_from_snapshots_empty() {
        assert!(Receipt::from_snapshots("1", day(), &[]).is_none());
    }
}
