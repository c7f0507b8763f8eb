//! NIR (Notă de Intrare-Recepție) report model.
//!
//! A [`NirDocument`] is the single source every export renders from: the
//! preview table, the CSV file, the spreadsheet sheet and the PDF. Values the
//! invoice does not carry are completed here with the same fallbacks the
//! extractor uses.
//!
//! # Example
//!
//! ```
//! use efactura_nir::{Node, extract};
//! use efactura_nir::nir::{NirDocument, export};
//!
//! let tree = Node::mapping([("Invoice", Node::mapping([("cbc:ID", Node::from("INV-1"))]))]);
//! let record = extract(&tree).unwrap();
//! let nir = NirDocument::from_record(&record);
//! assert_eq!(nir.invoice_id, "INV-1");
//! let csv = export::to_csv(&nir);
//! assert!(csv.contains("Denumire"));
//! ```

pub mod export;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::numeric::{div_round, mul_round, round_money, saturating_sum};
use crate::core::{Finding, InvoiceRecord, LineItem, PartyInfo};

/// Id used when the invoice has none.
pub const MISSING_ID: &str = "FARA-ID";

/// One row of the NIR table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NirRow {
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_net: Decimal,
    pub vat_percent: Decimal,
    pub vat_amount: Decimal,
    /// Line value including VAT.
    pub total: Decimal,
}

impl NirRow {
    /// Build a row, completing whatever the line leaves at zero.
    ///
    /// `fallback_vat_percent` applies when the line has no rate of its own.
    pub fn from_line(line: &LineItem, fallback_vat_percent: Decimal) -> Self {
        let quantity = line.quantity;
        let mut unit_price = line.unit_price;
        let mut line_net = line.line_net;
        let mut vat_percent = line.vat_percent;

        if line_net.is_zero() && quantity > Decimal::ZERO && unit_price > Decimal::ZERO {
            line_net = mul_round(quantity, unit_price, 2);
        }
        if unit_price.is_zero() && quantity > Decimal::ZERO && line_net > Decimal::ZERO {
            unit_price = div_round(line_net, quantity, 6).unwrap_or(Decimal::ZERO);
        }
        if vat_percent.is_zero() && fallback_vat_percent > Decimal::ZERO {
            vat_percent = fallback_vat_percent;
        }

        let vat_amount = round_money(line_net.saturating_mul(vat_percent) / dec!(100), 2);
        let total = round_money(line_net.saturating_add(vat_amount), 2);

        Self {
            name: line.name.clone(),
            unit: line.unit.clone(),
            quantity,
            unit_price,
            line_net,
            vat_percent,
            vat_amount,
            total,
        }
    }

    /// Net value, derived from quantity and price when not set.
    pub fn effective_net(&self) -> Decimal {
        if self.line_net.is_zero() && self.quantity > Decimal::ZERO && self.unit_price > Decimal::ZERO
        {
            mul_round(self.quantity, self.unit_price, 2)
        } else {
            self.line_net
        }
    }

    /// Gross value, derived from the net value and rate when not set.
    pub fn effective_total(&self) -> Decimal {
        let net = self.effective_net();
        if self.total.is_zero() && net > Decimal::ZERO {
            let factor = Decimal::ONE.saturating_add(self.vat_percent / dec!(100));
            mul_round(net, factor, 2)
        } else {
            self.total
        }
    }
}

/// Column sums of the NIR table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NirTotals {
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub grand_total: Decimal,
}

impl NirTotals {
    pub fn from_rows(rows: &[NirRow]) -> Self {
        Self {
            subtotal: round_money(saturating_sum(rows.iter().map(|r| r.line_net)), 2),
            vat: round_money(saturating_sum(rows.iter().map(|r| r.vat_amount)), 2),
            grand_total: round_money(saturating_sum(rows.iter().map(|r| r.total)), 2),
        }
    }
}

/// Everything a NIR report shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NirDocument {
    /// Invoice id made safe for file names (see [`safe_document_id`]).
    pub invoice_id: String,
    pub invoice_date: String,
    pub currency: String,
    pub supplier: PartyInfo,
    pub buyer: PartyInfo,
    pub rows: Vec<NirRow>,
    pub totals: NirTotals,
    /// Reconciliation findings carried over from extraction.
    pub findings: Vec<Finding>,
}

impl NirDocument {
    pub fn from_record(record: &InvoiceRecord) -> Self {
        let fallback_vat = header_vat_rate(record);
        let rows: Vec<NirRow> = record
            .lines
            .iter()
            .map(|line| NirRow::from_line(line, fallback_vat))
            .collect();
        let totals = NirTotals::from_rows(&rows);

        tracing::debug!(
            id = %record.id,
            rows = rows.len(),
            "built NIR document"
        );

        Self {
            invoice_id: safe_document_id(&record.id),
            invoice_date: record.issue_date.clone(),
            currency: record.currency.clone(),
            supplier: record.supplier.clone(),
            buyer: record.buyer.clone(),
            rows,
            totals,
            findings: record.validations.clone(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }
}

/// Average VAT rate implied by the header (`vat / net * 100`), zero when the
/// header does not declare a positive net.
pub fn header_vat_rate(record: &InvoiceRecord) -> Decimal {
    let net = record.totals.net;
    if net > Decimal::ZERO {
        record
            .totals
            .vat
            .checked_div(net)
            .map(|ratio| mul_round(ratio, dec!(100), 2))
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Make an invoice id usable in file names and report headers.
///
/// Empty ids become [`MISSING_ID`]. Ids that do not start with an ASCII
/// letter or digit, or contain anything beyond `A-Z a-z 0-9 - _ / .`, become
/// `ID_INVALID_` followed by their first ten characters.
pub fn safe_document_id(raw: &str) -> String {
    let id = raw.trim();
    if id.is_empty() {
        return MISSING_ID.to_string();
    }

    let mut chars = id.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let valid_rest =
        chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'));
    if valid_start && valid_rest {
        id.to_string()
    } else {
        let prefix: String = id.chars().take(10).collect();
        format!("ID_INVALID_{prefix}")
    }
}
