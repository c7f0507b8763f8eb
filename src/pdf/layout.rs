//! Page composition in millimetres, top-left origin.

use lopdf::Object;
use lopdf::content::Operation;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::PdfOptions;
use super::font::{Font, Metrics, PT_PER_MM, encode_win_ansi};
use super::wrap::wrap_text;
use crate::core::PartyInfo;
use crate::core::numeric::{round_money, saturating_sum};
use crate::nir::{NirDocument, NirRow};

pub const PAGE_W: f32 = 297.0;
pub const PAGE_H: f32 = 210.0;

const MARGIN_L: f32 = 12.0;
const MARGIN_R: f32 = 12.0;
const MARGIN_T: f32 = 12.0;
const MARGIN_B: f32 = 18.0;
/// Space kept free above the bottom margin when placing table rows.
const FOOTER_BUFFER: f32 = 12.0;
/// Horizontal inset of text inside a cell.
const CELL_MARGIN: f32 = 1.0;

const COL_WIDTHS: [f32; 6] = [150.0, 16.0, 20.0, 26.0, 14.0, 30.0];
const HEADERS: [&str; 6] = ["Denumire", "UM", "Cant.", "Preț unitar", "TVA%", "Valoare (cu TVA)"];

const TITLE_SIZE: f32 = 14.0;
const INFO_SIZE: f32 = 10.0;
const HEADER_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 9.0;
const LINE_H: f32 = 5.6;
const PAD_X: f32 = 1.6;
const PARTY_BOX_W: f32 = 140.0;

/// Signature line segments and their widths.
const SIGNATURES: [(&str, f32); 8] = [
    ("Comisia de recepție", 40.0),
    ("Nume + prenume", 50.0),
    ("Semnătura", 35.0),
    ("Data", 20.0),
    ("", 28.0), // invoice date
    ("", 16.0),
    ("Primit în gestiune", 46.0),
    ("Semnătura", 35.0),
];

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

fn content_width() -> f32 {
    PAGE_W - MARGIN_L - MARGIN_R
}

fn pt(mm: f32) -> Object {
    Object::Real(mm * PT_PER_MM)
}

fn fixed(value: Decimal, dp: u32) -> String {
    format!("{:.*}", dp as usize, round_money(value, dp))
}

/// Accumulates drawing operations page by page.
pub struct NirPdf<'a> {
    options: &'a PdfOptions,
    timestamp: String,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    page_no: usize,
    y: f32,
    in_table: bool,
}

impl<'a> NirPdf<'a> {
    pub fn new(options: &'a PdfOptions, timestamp: String) -> Self {
        Self {
            options,
            timestamp,
            pages: Vec::new(),
            ops: Vec::new(),
            page_no: 0,
            y: MARGIN_T,
            in_table: false,
        }
    }

    /// Lay out the whole report and return the operations of each page.
    pub fn compose(mut self, doc: &NirDocument) -> Vec<Vec<Operation>> {
        self.add_page();
        self.invoice_block(doc);
        self.table(&doc.rows);
        self.totals_line(doc);
        self.signature_line(&doc.invoice_date);
        self.close_page();
        self.pages
    }

    fn add_page(&mut self) {
        if self.page_no > 0 {
            self.close_page();
        }
        self.page_no += 1;
        self.ops
            .push(Operation::new("w", vec![Object::Real(0.2 * PT_PER_MM)]));
        self.y = MARGIN_T;

        let title = self.options.title.clone();
        self.text(
            MARGIN_L,
            self.y,
            content_width(),
            9.0,
            &title,
            Metrics::new(Font::Bold, TITLE_SIZE),
            Align::Center,
        );
        self.y += 9.0 + 1.0;

        if self.in_table {
            self.table_header();
        }
    }

    fn close_page(&mut self) {
        let footer = format!("Pagina {} • Generat la {}", self.page_no, self.timestamp);
        self.text(
            MARGIN_L,
            PAGE_H - 10.0,
            content_width(),
            8.0,
            &footer,
            Metrics::new(Font::Regular, 8.0),
            Align::Right,
        );
        self.pages.push(std::mem::take(&mut self.ops));
    }

    /// Break the page when `height` would run into the footer area.
    fn ensure_space(&mut self, height: f32) {
        if self.y + height > PAGE_H - MARGIN_B - FOOTER_BUFFER {
            self.add_page();
        }
    }

    fn invoice_block(&mut self, doc: &NirDocument) {
        let info = Metrics::new(Font::Regular, INFO_SIZE);
        let heading = Metrics::new(Font::Bold, INFO_SIZE + 1.0);

        let line = format!("Factura: {}   |   Data: {}", doc.invoice_id, doc.invoice_date);
        self.text(MARGIN_L, self.y, content_width(), 7.0, &line, info, Align::Left);
        self.y += 7.0 + 1.0;

        let buyer_x = MARGIN_L + PARTY_BOX_W;
        let buyer_w = content_width() - PARTY_BOX_W;
        self.text(MARGIN_L, self.y, PARTY_BOX_W, 7.0, "Furnizor", heading, Align::Left);
        self.text(buyer_x, self.y, buyer_w, 7.0, "Cumpărător", heading, Align::Left);
        self.y += 7.0;

        let top = self.y;
        let supplier_bottom = self.party_box(MARGIN_L, top, PARTY_BOX_W, &doc.supplier);
        let buyer_bottom = self.party_box(buyer_x, top, buyer_w, &doc.buyer);
        self.y = supplier_bottom.max(buyer_bottom) + 2.0;

        let count = format!("Nr. poziții: {}", doc.rows.len());
        self.text(MARGIN_L, self.y, content_width(), 6.0, &count, info, Align::Left);
        self.y += 6.0 + 1.0;
    }

    /// Bordered block with name, tax id and address; returns its bottom edge.
    fn party_box(&mut self, x: f32, y: f32, width: f32, party: &PartyInfo) -> f32 {
        let metrics = Metrics::new(Font::Regular, INFO_SIZE);
        let inner = width - 2.0 * CELL_MARGIN;
        let lines: Vec<String> = [
            party.name.clone(),
            format!("CUI: {}", party.tax_id),
            party.address.clone(),
        ]
        .iter()
        .flat_map(|text| wrap_text(text, inner, &metrics))
        .collect();

        let height = lines.len() as f32 * 6.0;
        self.rect(x, y, width, height, false);
        for (i, line) in lines.iter().enumerate() {
            self.text(x, y + i as f32 * 6.0, width, 6.0, line, metrics, Align::Left);
        }
        y + height
    }

    fn table(&mut self, rows: &[NirRow]) {
        self.in_table = true;
        self.table_header();
        for row in rows {
            self.table_row(row);
        }
        self.in_table = false;
    }

    fn table_header(&mut self) {
        let metrics = Metrics::new(Font::Bold, HEADER_SIZE);
        let wrapped: Vec<Vec<String>> = COL_WIDTHS
            .iter()
            .zip(HEADERS)
            .map(|(w, header)| wrap_text(header, (w - 2.0 * PAD_X).max(0.0), &metrics))
            .collect();
        let max_lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let height = max_lines as f32 * LINE_H;

        let top = self.y;
        let mut x = MARGIN_L;
        for w in COL_WIDTHS {
            self.rect(x, top, w, height, true);
            x += w;
        }

        let mut x = MARGIN_L;
        for (col, (w, lines)) in COL_WIDTHS.iter().zip(&wrapped).enumerate() {
            let align = if col == 0 { Align::Left } else { Align::Center };
            let text_top = top + (height - lines.len() as f32 * LINE_H) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                self.text(
                    x + PAD_X,
                    text_top + i as f32 * LINE_H,
                    w - 2.0 * PAD_X,
                    LINE_H,
                    line,
                    metrics,
                    align,
                );
            }
            x += w;
        }
        self.y = top + height;
    }

    fn table_row(&mut self, row: &NirRow) {
        let metrics = Metrics::new(Font::Regular, TABLE_SIZE);
        let name_w = (COL_WIDTHS[0] - 2.0 * PAD_X).max(0.0);
        let name_lines = wrap_text(&row.name, name_w, &metrics);
        let height = name_lines.len().max(1) as f32 * LINE_H;

        self.ensure_space(height);
        let top = self.y;

        let mut x = MARGIN_L;
        for w in COL_WIDTHS {
            self.rect(x, top, w, height, false);
            x += w;
        }

        for (i, line) in name_lines.iter().enumerate() {
            self.text(
                MARGIN_L + PAD_X,
                top + i as f32 * LINE_H,
                name_w,
                LINE_H,
                line,
                metrics,
                Align::Left,
            );
        }

        let cells = [
            (row.unit.clone(), Align::Center),
            (fixed(row.quantity, 2), Align::Right),
            (fixed(row.unit_price, 2), Align::Right),
            (fixed(row.vat_percent, 0), Align::Center),
            (fixed(row.effective_total(), 2), Align::Right),
        ];
        let text_top = top + (height - LINE_H) / 2.0;
        let mut x = MARGIN_L + COL_WIDTHS[0];
        for ((text, align), w) in cells.iter().zip(&COL_WIDTHS[1..]) {
            self.text(x, text_top, *w, LINE_H, text, metrics, *align);
            x += w;
        }

        self.y = top + height;
    }

    fn totals_line(&mut self, doc: &NirDocument) {
        let (subtotal, vat, total) = report_totals(doc);
        self.ensure_space(2.0 + 8.0);
        self.y += 2.0;
        let line = format!(
            "Subtotal: {}    |    TVA: {}    |    Total: {}",
            fixed(subtotal, 2),
            fixed(vat, 2),
            fixed(total, 2)
        );
        self.text(
            MARGIN_L,
            self.y,
            content_width(),
            8.0,
            &line,
            Metrics::new(Font::Bold, INFO_SIZE + 1.0),
            Align::Right,
        );
        self.y += 8.0;
    }

    /// Reception committee signature line, anchored above the bottom margin
    /// of the last page.
    fn signature_line(&mut self, invoice_date: &str) {
        let y = PAGE_H - MARGIN_B - 8.0;
        if self.y > y {
            self.add_page();
        }
        let metrics = Metrics::new(Font::Regular, 10.0);
        let mut x = MARGIN_L + 12.0;
        for (i, (label, w)) in SIGNATURES.iter().enumerate() {
            let text = if i == 4 { invoice_date } else { *label };
            self.text(x, y, *w, 6.0, text, metrics, Align::Left);
            x += w;
        }
        self.y = y + 6.0;
    }

    /// Single-line cell text; the baseline sits at the vertical centre.
    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        text: &str,
        metrics: Metrics,
        align: Align,
    ) {
        if text.is_empty() {
            return;
        }
        let bytes = encode_win_ansi(text);
        let text_w = metrics.encoded_width(&bytes);
        let left = match align {
            Align::Left => x + CELL_MARGIN,
            Align::Center => x + (width - text_w) / 2.0,
            Align::Right => x + width - CELL_MARGIN - text_w,
        };
        let size_mm = metrics.size_pt / PT_PER_MM;
        let baseline = y + 0.5 * height + 0.3 * size_mm;

        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![metrics.font.resource().into(), Object::Real(metrics.size_pt)],
            ),
            Operation::new("Td", vec![pt(left), pt(PAGE_H - baseline)]),
            Operation::new("Tj", vec![Object::string_literal(bytes)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, filled: bool) {
        let re = Operation::new(
            "re",
            vec![pt(x), pt(PAGE_H - y - height), pt(width), pt(height)],
        );
        if filled {
            self.ops.extend([
                Operation::new("q", vec![]),
                Operation::new("g", vec![Object::Real(238.0 / 255.0)]),
                re,
                Operation::new("B", vec![]),
                Operation::new("Q", vec![]),
            ]);
        } else {
            self.ops.extend([re, Operation::new("S", vec![])]);
        }
    }
}

/// Declared totals, each replaced by the sum over rows when it is zero.
pub fn report_totals(doc: &NirDocument) -> (Decimal, Decimal, Decimal) {
    let mut subtotal = doc.totals.subtotal;
    let mut vat = doc.totals.vat;
    let mut total = doc.totals.grand_total;

    if subtotal.is_zero() || vat.is_zero() || total.is_zero() {
        let sum_net = saturating_sum(doc.rows.iter().map(NirRow::effective_net));
        let sum_vat = saturating_sum(
            doc.rows
                .iter()
                .map(|r| r.effective_net().saturating_mul(r.vat_percent) / dec!(100)),
        );
        let sum_gross = saturating_sum(doc.rows.iter().map(NirRow::effective_total));
        if subtotal.is_zero() {
            subtotal = round_money(sum_net, 2);
        }
        if vat.is_zero() {
            vat = round_money(sum_vat, 2);
        }
        if total.is_zero() {
            total = round_money(sum_gross, 2);
        }
    }
    (subtotal, vat, total)
}
