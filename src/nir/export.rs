//! Tabular exports of a [`NirDocument`].
//!
//! - [`to_csv`]: the plain table, UTF-8 with BOM so spreadsheet programs
//!   pick up the diacritics.
//! - [`Sheet`]: spreadsheet layout with a title and a metadata block above
//!   the table, serializable to delimited text or, with the `xlsx`
//!   feature, to a formatted workbook.

use rust_decimal::Decimal;

use super::{NirDocument, NirRow};

/// Column headers of the NIR table.
pub const COLUMNS: [&str; 8] = [
    "Denumire",
    "U.M.",
    "Cant.",
    "Preț unitar",
    "Valoare netă",
    "TVA %",
    "TVA",
    "Total",
];

/// Title written in the first sheet row.
pub const SHEET_TITLE: &str = "NIR generat din e-Factura";

/// Zero-based row of the table header in a [`Sheet`].
pub const SHEET_HEADER_ROW: usize = 5;

const BOM: char = '\u{feff}';

/// Render the NIR table as comma-separated values.
pub fn to_csv(doc: &NirDocument) -> String {
    let mut out = String::new();
    out.push(BOM);
    write_record(&mut out, COLUMNS.iter().map(|c| c.to_string()), ',');
    for row in &doc.rows {
        write_record(&mut out, row_fields(row), ',');
    }
    out
}

fn row_fields(row: &NirRow) -> impl Iterator<Item = String> {
    [
        row.name.clone(),
        row.unit.clone(),
        format_number(row.quantity),
        format_number(row.unit_price),
        format_number(row.line_net),
        format_number(row.vat_percent),
        format_number(row.vat_amount),
        format_number(row.total),
    ]
    .into_iter()
}

fn write_record(out: &mut String, fields: impl Iterator<Item = String>, sep: char) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(sep);
        }
        write_field(out, &field, sep);
    }
    out.push('\n');
}

/// Quote a field when it contains the separator, a quote or a line break.
fn write_field(out: &mut String, value: &str, sep: char) {
    let needs_quotes = value.contains(|c: char| c == sep || c == '"' || c == '\n' || c == '\r');
    if !needs_quotes {
        out.push_str(value);
        return;
    }
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

/// Format a number with at least two decimals and no trailing zeros beyond that.
pub fn format_number(d: Decimal) -> String {
    let s = d.normalize().to_string();
    match s.find('.') {
        Some(dot) => {
            let decimals = s.len() - dot - 1;
            if decimals < 2 {
                format!("{s}{}", "0".repeat(2 - decimals))
            } else {
                s
            }
        }
        None => format!("{s}.00"),
    }
}

/// A spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(t) => t.clone(),
            Self::Number(n) => format_number(*n),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Decimal> for Cell {
    fn from(d: Decimal) -> Self {
        Self::Number(d)
    }
}

/// Spreadsheet layout of a NIR: title, metadata block, table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn from_document(doc: &NirDocument) -> Self {
        let mut rows: Vec<Vec<Cell>> = vec![
            vec![SHEET_TITLE.into()],
            Vec::new(),
            vec!["Număr factură:".into(), doc.invoice_id.as_str().into()],
            vec!["Dată factură:".into(), doc.invoice_date.as_str().into()],
            vec!["Monedă:".into(), doc.currency.as_str().into()],
            COLUMNS.iter().map(|c| Cell::from(*c)).collect(),
        ];
        debug_assert_eq!(rows.len(), SHEET_HEADER_ROW + 1);

        for row in &doc.rows {
            rows.push(vec![
                row.name.as_str().into(),
                row.unit.as_str().into(),
                row.quantity.into(),
                row.unit_price.into(),
                row.line_net.into(),
                row.vat_percent.into(),
                row.vat_amount.into(),
                row.total.into(),
            ]);
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Serialize as delimited text, one line per row.
    pub fn to_delimited(&self, sep: char) -> String {
        let mut out = String::new();
        for row in &self.rows {
            write_record(&mut out, row.iter().map(Cell::render), sep);
        }
        out
    }
}

#[cfg(feature = "xlsx")]
mod workbook {
    use rust_decimal::prelude::ToPrimitive;
    use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};

    use super::{Cell, SHEET_HEADER_ROW, Sheet};
    use crate::core::NirError;

    /// Name of the single worksheet.
    pub const WORKSHEET_NAME: &str = "NIR";

    const NUMBER_FORMAT: &str = "#,##0.00";
    const AMOUNT_COLUMNS: [u16; 5] = [2, 3, 4, 6, 7];
    const HEADER_FILL: u32 = 0xEEEEEE;

    fn render_err(e: XlsxError) -> NirError {
        NirError::Render(e.to_string())
    }

    impl Sheet {
        /// Write the sheet as an `.xlsx` workbook.
        ///
        /// Bold title, bold labels in the metadata block, a grey bordered
        /// header row, bordered data cells with `#,##0.00` on the amount
        /// columns, and panes frozen below the header.
        pub fn to_xlsx(&self) -> Result<Vec<u8>, NirError> {
            let title = Format::new().set_bold().set_font_size(14);
            let label = Format::new().set_bold();
            let header = Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_border(FormatBorder::Thin);
            let cell = Format::new().set_border(FormatBorder::Thin);
            let amount = cell.clone().set_num_format(NUMBER_FORMAT);

            let mut workbook = Workbook::new();
            let ws = workbook.add_worksheet();
            ws.set_name(WORKSHEET_NAME).map_err(render_err)?;

            for (r, row) in self.rows.iter().enumerate() {
                let r_num = u32::try_from(r)
                    .map_err(|_| NirError::Render(format!("row {r} out of range")))?;
                for (c, value) in row.iter().enumerate() {
                    let c_num = u16::try_from(c)
                        .map_err(|_| NirError::Render(format!("column {c} out of range")))?;
                    let format = match r {
                        0 => Some(&title),
                        _ if r < SHEET_HEADER_ROW => (c == 0).then_some(&label),
                        _ if r == SHEET_HEADER_ROW => Some(&header),
                        _ if AMOUNT_COLUMNS.contains(&c_num) => Some(&amount),
                        _ => Some(&cell),
                    };
                    match (value, format) {
                        (Cell::Empty, Some(f)) => {
                            ws.write_blank(r_num, c_num, f).map_err(render_err)?;
                        }
                        (Cell::Empty, None) => {}
                        (Cell::Text(t), Some(f)) => {
                            ws.write_string_with_format(r_num, c_num, t, f)
                                .map_err(render_err)?;
                        }
                        (Cell::Text(t), None) => {
                            ws.write_string(r_num, c_num, t).map_err(render_err)?;
                        }
                        (Cell::Number(n), Some(f)) => {
                            let n = n.to_f64().unwrap_or_default();
                            ws.write_number_with_format(r_num, c_num, n, f)
                                .map_err(render_err)?;
                        }
                        (Cell::Number(n), None) => {
                            let n = n.to_f64().unwrap_or_default();
                            ws.write_number(r_num, c_num, n).map_err(render_err)?;
                        }
                    }
                }
            }

            ws.set_column_width(0, 40).map_err(render_err)?;
            ws.set_column_width(1, 10).map_err(render_err)?;
            for col in AMOUNT_COLUMNS {
                ws.set_column_width(col, 14).map_err(render_err)?;
            }
            let frozen = u32::try_from(SHEET_HEADER_ROW + 1).unwrap_or(u32::MAX);
            ws.set_freeze_panes(frozen, 0).map_err(render_err)?;

            let bytes = workbook.save_to_buffer().map_err(render_err)?;
            tracing::debug!(rows = self.rows.len(), bytes = bytes.len(), "wrote NIR workbook");
            Ok(bytes)
        }
    }
}

#[cfg(feature = "xlsx")]
pub use workbook::WORKSHEET_NAME;
