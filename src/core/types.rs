use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::Finding;

/// Placeholder for party fields the document does not carry.
pub const PLACEHOLDER: &str = "-";

/// Which UBL envelope the document used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentKind {
    #[default]
    Invoice,
    CreditNote,
}

/// Normalized invoice data extracted from a UBL document.
///
/// Every amount is a finite [`Decimal`]; an amount absent from the source is
/// zero. Text fields the source does not carry are empty (header) or `"-"`
/// (parties, item names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice identifier. Empty when the document has none.
    pub id: String,
    /// Issue date as written in the document.
    pub issue_date: String,
    /// Document currency code.
    pub currency: String,
    pub kind: DocumentKind,
    pub supplier: PartyInfo,
    pub buyer: PartyInfo,
    pub lines: Vec<LineItem>,
    pub totals: Totals,
    /// Reconciliation findings, in evaluation order.
    pub validations: Vec<Finding>,
}

impl InvoiceRecord {
    pub fn has_errors(&self) -> bool {
        self.validations.iter().any(Finding::is_error)
    }
}

/// Supplier or buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInfo {
    pub name: String,
    /// Tax identifier (CUI / VAT id).
    pub tax_id: String,
    /// Street, city, postal zone and country joined with `", "`.
    pub address: String,
}

impl Default for PartyInfo {
    fn default() -> Self {
        Self {
            name: PLACEHOLDER.into(),
            tax_id: PLACEHOLDER.into(),
            address: PLACEHOLDER.into(),
        }
    }
}

/// One invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: Decimal,
    /// UN/ECE Rec 20 unit code, empty when absent.
    pub unit: String,
    /// Price per single unit (base quantity already divided out).
    pub unit_price: Decimal,
    /// Line amount before tax.
    pub line_net: Decimal,
    pub vat_percent: Decimal,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            name: PLACEHOLDER.into(),
            quantity: Decimal::ZERO,
            unit: String::new(),
            unit_price: Decimal::ZERO,
            line_net: Decimal::ZERO,
            vat_percent: Decimal::ZERO,
        }
    }
}

/// Declared header totals next to the totals recomputed from the lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Tax-exclusive amount.
    pub net: Decimal,
    /// Total tax amount.
    pub vat: Decimal,
    /// Tax-inclusive amount.
    pub gross: Decimal,
    pub payable: Decimal,
    pub calc_net_from_lines: Decimal,
    pub calc_vat_from_lines: Decimal,
    /// Per-rate tax breakdown as declared.
    pub tax_subtotals: Vec<TaxSubtotal>,
}

/// One entry of the declared per-rate tax breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSubtotal {
    pub rate: Decimal,
    pub taxable_base: Decimal,
    pub tax_amount: Decimal,
}
