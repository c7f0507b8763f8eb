use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::NirError;
use super::numeric::{coalesce, div_round, mul_round};
use super::path::{first_number, first_text, resolve_first, text_or};
use super::reconcile::{ReconcileConfig, net_from_lines, reconcile, vat_from_lines};
use super::tree::Node;
use super::types::*;

/// Currency assumed when the document does not declare one.
pub const DEFAULT_CURRENCY: &str = "RON";

/// Extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Currency used when `DocumentCurrencyCode` is absent.
    pub fallback_currency: String,
    /// Reject documents with more lines than this.
    pub max_lines: Option<usize>,
    pub reconcile: ReconcileConfig,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fallback_currency: DEFAULT_CURRENCY.into(),
            max_lines: None,
            reconcile: ReconcileConfig::default(),
        }
    }
}

// Candidate spellings, namespaced first.

const ID: &[&str] = &["cbc:ID", "ID"];
const ISSUE_DATE: &[&str] = &["cbc:IssueDate", "IssueDate"];
const CURRENCY: &[&str] = &["cbc:DocumentCurrencyCode", "DocumentCurrencyCode"];

const SUPPLIER: &[&str] = &["cac:AccountingSupplierParty", "AccountingSupplierParty"];
const BUYER: &[&str] = &["cac:AccountingCustomerParty", "AccountingCustomerParty"];
const PARTY: &[&str] = &["cac:Party", "Party"];
const PARTY_NAME: &[&str] = &[
    "cac:PartyName.cbc:Name",
    "PartyName.cbc:Name",
    "PartyName.Name",
    "cac:PartyLegalEntity.cbc:RegistrationName",
    "PartyLegalEntity.RegistrationName",
];
const PARTY_TAX_ID: &[&str] = &[
    "cac:PartyTaxScheme.cbc:CompanyID",
    "PartyTaxScheme.cbc:CompanyID",
    "PartyTaxScheme.CompanyID",
    "cac:PartyLegalEntity.cbc:CompanyID",
    "PartyLegalEntity.CompanyID",
];
const POSTAL_ADDRESS: &[&str] = &["cac:PostalAddress", "PostalAddress"];
const STREET: &[&str] = &["cbc:StreetName", "StreetName"];
const CITY: &[&str] = &["cbc:CityName", "CityName"];
const POSTAL_ZONE: &[&str] = &["cbc:PostalZone", "PostalZone"];
const COUNTRY: &[&str] = &[
    "cac:Country.cbc:IdentificationCode",
    "Country.IdentificationCode",
];

const INVOICE_LINES: &[&str] = &["cac:InvoiceLine", "InvoiceLine"];
const CREDIT_NOTE_LINES: &[&str] = &["cac:CreditNoteLine", "CreditNoteLine"];
const ITEM_NAME: &[&str] = &["cac:Item.cbc:Name", "Item.cbc:Name", "Item.Name"];
const QUANTITY: &[&str] = &[
    "cbc:InvoicedQuantity",
    "InvoicedQuantity",
    "cbc:CreditedQuantity",
    "CreditedQuantity",
];
const UNIT: &[&str] = &[
    "cbc:InvoicedQuantity.@unitCode",
    "InvoicedQuantity.@unitCode",
    "cbc:CreditedQuantity.@unitCode",
    "CreditedQuantity.@unitCode",
    "cac:Price.cbc:BaseQuantity.@unitCode",
    "Price.BaseQuantity.@unitCode",
];
const PRICE: &[&str] = &[
    "cac:Price.cbc:PriceAmount",
    "Price.cbc:PriceAmount",
    "Price.PriceAmount",
];
const BASE_QUANTITY: &[&str] = &[
    "cac:Price.cbc:BaseQuantity",
    "Price.cbc:BaseQuantity",
    "Price.BaseQuantity",
];
const LINE_NET: &[&str] = &["cbc:LineExtensionAmount", "LineExtensionAmount"];
const ITEM_VAT_PERCENT: &[&str] = &[
    "cac:Item.cac:ClassifiedTaxCategory.cbc:Percent",
    "Item.ClassifiedTaxCategory.Percent",
];
const LINE_SUBTOTAL_VAT_PERCENT: &[&str] = &[
    "cac:TaxTotal.cac:TaxSubtotal.cbc:Percent",
    "cac:TaxTotal.cac:TaxSubtotal.cac:TaxCategory.cbc:Percent",
    "TaxTotal.TaxSubtotal.Percent",
    "TaxTotal.TaxSubtotal.TaxCategory.Percent",
];

const TAX_TOTAL: &[&str] = &["cac:TaxTotal", "TaxTotal"];
const TAX_AMOUNT: &[&str] = &["cbc:TaxAmount", "TaxAmount"];
const TAX_SUBTOTAL: &[&str] = &["cac:TaxSubtotal", "TaxSubtotal"];
const SUBTOTAL_RATE: &[&str] = &[
    "cac:TaxCategory.cbc:Percent",
    "TaxCategory.Percent",
    "cbc:Percent",
    "Percent",
];
const TAXABLE_AMOUNT: &[&str] = &["cbc:TaxableAmount", "TaxableAmount"];
const MONETARY_TOTAL: &[&str] = &["cac:LegalMonetaryTotal", "LegalMonetaryTotal"];
const TAX_EXCLUSIVE: &[&str] = &["cbc:TaxExclusiveAmount", "TaxExclusiveAmount"];
const TAX_INCLUSIVE: &[&str] = &["cbc:TaxInclusiveAmount", "TaxInclusiveAmount"];
const PAYABLE: &[&str] = &["cbc:PayableAmount", "PayableAmount"];

/// Extract and reconcile an invoice with default options.
pub fn extract(tree: &Node) -> Result<InvoiceRecord, NirError> {
    extract_with(tree, &ExtractOptions::default())
}

/// Extract and reconcile an invoice.
///
/// Missing fields degrade to defaults. Only a tree that is not a mapping, or
/// an envelope that is not a mapping, is an error.
pub fn extract_with(tree: &Node, options: &ExtractOptions) -> Result<InvoiceRecord, NirError> {
    let (kind, body) = envelope(tree)?;

    let id = text_or(body, ID, "")?;
    let issue_date = text_or(body, ISSUE_DATE, "")?;
    let currency = text_or(body, CURRENCY, &options.fallback_currency)?;

    let supplier = party(body, SUPPLIER)?;
    let buyer = party(body, BUYER)?;

    let line_candidates = match kind {
        DocumentKind::Invoice => INVOICE_LINES,
        DocumentKind::CreditNote => CREDIT_NOTE_LINES,
    };
    let raw_lines = resolve_first(body, line_candidates)?
        .map(Node::items)
        .unwrap_or_default();
    if let Some(max) = options.max_lines {
        if raw_lines.len() > max {
            return Err(NirError::TooManyLines {
                count: raw_lines.len(),
                max,
            });
        }
    }
    let lines = raw_lines
        .into_iter()
        .map(line_item)
        .collect::<Result<Vec<_>, _>>()?;

    let mut totals = header_totals(body)?;
    totals.calc_net_from_lines = net_from_lines(&lines);
    totals.calc_vat_from_lines = vat_from_lines(&lines);

    let validations = reconcile(&id, &totals, &options.reconcile);

    tracing::debug!(
        id = %id,
        lines = lines.len(),
        findings = validations.len(),
        "extracted invoice"
    );

    Ok(InvoiceRecord {
        id,
        issue_date,
        currency,
        kind,
        supplier,
        buyer,
        lines,
        totals,
        validations,
    })
}

/// Locate the invoice body.
///
/// `Invoice` / `CreditNote` with or without a namespace prefix. A mapping
/// without a recognizable root key is taken to be the body itself.
fn envelope(tree: &Node) -> Result<(DocumentKind, &Node), NirError> {
    let Node::Mapping(map) = tree else {
        return Err(NirError::Structure("document root is not a mapping".into()));
    };

    let found = map.iter().find_map(|(key, node)| {
        let local = key.rsplit(':').next().unwrap_or(key.as_str());
        match local {
            "Invoice" => Some((DocumentKind::Invoice, key, node)),
            "CreditNote" => Some((DocumentKind::CreditNote, key, node)),
            _ => None,
        }
    });

    match found {
        Some((kind, key, node)) => match node.first() {
            Some(body @ Node::Mapping(_)) => Ok((kind, body)),
            _ => Err(NirError::Structure(format!("envelope '{key}' is not a mapping"))),
        },
        None => Ok((DocumentKind::Invoice, tree)),
    }
}

fn party(body: &Node, role: &[&str]) -> Result<PartyInfo, NirError> {
    let Some(party) = resolve_first(body, role)?
        .map(|node| resolve_first(node, PARTY))
        .transpose()?
        .flatten()
    else {
        return Ok(PartyInfo::default());
    };

    Ok(PartyInfo {
        name: text_or(party, PARTY_NAME, PLACEHOLDER)?,
        tax_id: text_or(party, PARTY_TAX_ID, PLACEHOLDER)?,
        address: compose_address(party)?,
    })
}

/// Street, city, postal zone and country, skipping absent parts.
///
/// `"-"` when no component is present.
fn compose_address(party: &Node) -> Result<String, NirError> {
    let Some(address) = resolve_first(party, POSTAL_ADDRESS)? else {
        return Ok(PLACEHOLDER.to_string());
    };

    let mut parts = Vec::with_capacity(4);
    for candidates in [STREET, CITY, POSTAL_ZONE, COUNTRY] {
        // A literal placeholder in the source counts as absent.
        if let Some(part) = first_text(address, candidates)?.filter(|p| *p != PLACEHOLDER) {
            parts.push(part);
        }
    }

    if parts.is_empty() {
        Ok(PLACEHOLDER.to_string())
    } else {
        Ok(parts.join(", "))
    }
}

fn line_item(line: &Node) -> Result<LineItem, NirError> {
    let name = text_or(line, ITEM_NAME, PLACEHOLDER)?;
    let quantity = first_number(line, QUANTITY)?.unwrap_or(Decimal::ZERO);
    let unit = text_or(line, UNIT, "")?;

    let raw_price = first_number(line, PRICE)?.unwrap_or(Decimal::ZERO);
    let mut unit_price = match first_number(line, BASE_QUANTITY)? {
        Some(base) if base != Decimal::ONE => div_round(raw_price, base, 6).unwrap_or(raw_price),
        _ => raw_price,
    };

    let declared_net = first_number(line, LINE_NET)?;
    let derived_net = (!quantity.is_zero() && !unit_price.is_zero())
        .then(|| mul_round(quantity, unit_price, 2));
    let line_net = coalesce([declared_net.filter(|n| !n.is_zero()), derived_net], Decimal::ZERO);

    if unit_price.is_zero() && !line_net.is_zero() {
        if let Some(derived) = div_round(line_net, quantity, 6) {
            unit_price = derived;
            tracing::trace!(%unit_price, "unit price derived from line net");
        }
    }

    let vat_percent = coalesce(
        [
            first_number(line, ITEM_VAT_PERCENT)?,
            first_number(line, LINE_SUBTOTAL_VAT_PERCENT)?,
        ],
        Decimal::ZERO,
    );

    Ok(LineItem {
        name,
        quantity,
        unit,
        unit_price,
        line_net,
        vat_percent,
    })
}

fn header_totals(body: &Node) -> Result<Totals, NirError> {
    let tax_total = resolve_first(body, TAX_TOTAL)?;
    let monetary = resolve_first(body, MONETARY_TOTAL)?;

    let amount = |node: Option<&Node>, candidates: &[&str]| -> Result<Decimal, NirError> {
        match node {
            Some(n) => Ok(first_number(n, candidates)?.unwrap_or(Decimal::ZERO)),
            None => Ok(Decimal::ZERO),
        }
    };

    // Only the first TaxTotal carries the document-currency breakdown.
    let subtotal_nodes = match tax_total.and_then(Node::first) {
        Some(first) => resolve_first(first, TAX_SUBTOTAL)?
            .map(Node::items)
            .unwrap_or_default(),
        None => Vec::new(),
    };
    let tax_subtotals = subtotal_nodes
        .into_iter()
        .map(|st| -> Result<TaxSubtotal, NirError> {
            Ok(TaxSubtotal {
                rate: amount(Some(st), SUBTOTAL_RATE)?,
                taxable_base: amount(Some(st), TAXABLE_AMOUNT)?,
                tax_amount: amount(Some(st), TAX_AMOUNT)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Totals {
        net: amount(monetary, TAX_EXCLUSIVE)?,
        vat: amount(tax_total, TAX_AMOUNT)?,
        gross: amount(monetary, TAX_INCLUSIVE)?,
        payable: amount(monetary, PAYABLE)?,
        calc_net_from_lines: Decimal::ZERO,
        calc_vat_from_lines: Decimal::ZERO,
        tax_subtotals,
    })
}
