#![cfg(feature = "xml")]

use efactura_nir::xml;
use efactura_nir::*;
use rust_decimal_macros::dec;

const SAMPLE: &str = include_str!("fixtures/sample_invoice.xml");

#[test]
fn sample_invoice_header() {
    let record = xml::extract_from_xml(SAMPLE).unwrap();

    assert_eq!(record.id, "INV-12345");
    assert_eq!(record.issue_date, "2024-05-14");
    assert_eq!(record.currency, "RON");
    assert_eq!(record.kind, DocumentKind::Invoice);
    assert!(record.validations.is_empty(), "{:?}", record.validations);
}

#[test]
fn sample_invoice_parties() {
    let record = xml::extract_from_xml(SAMPLE).unwrap();

    assert_eq!(record.supplier.name, "Papetăria Centrală SRL");
    assert_eq!(record.supplier.tax_id, "RO12345678");
    assert_eq!(
        record.supplier.address,
        "Str. Memorandumului 28, Cluj-Napoca, 400114, RO"
    );

    assert_eq!(record.buyer.name, "Magazin & Depozit SA");
    assert_eq!(record.buyer.tax_id, "RO87654321");
    assert_eq!(record.buyer.address, "Bd. Unirii 1, Sector 3, RO");
}

#[test]
fn sample_invoice_lines() {
    let record = xml::extract_from_xml(SAMPLE).unwrap();
    assert_eq!(record.lines.len(), 2);

    let paper = &record.lines[0];
    assert_eq!(paper.name, "Hârtie copiator A4, 80g/mp (top 500 coli)");
    assert_eq!(paper.quantity, dec!(10));
    assert_eq!(paper.unit, "H87");
    assert_eq!(paper.unit_price, dec!(22.50));
    assert_eq!(paper.line_net, dec!(225.00));
    assert_eq!(paper.vat_percent, dec!(19));

    let cable = &record.lines[1];
    assert_eq!(cable.unit, "MTR");
    assert_eq!(cable.unit_price, dec!(4.5));
    assert_eq!(cable.line_net, dec!(225.00));
}

#[test]
fn sample_invoice_totals() {
    let totals = xml::extract_from_xml(SAMPLE).unwrap().totals;

    assert_eq!(totals.net, dec!(450.00));
    assert_eq!(totals.vat, dec!(85.50));
    assert_eq!(totals.gross, dec!(535.50));
    assert_eq!(totals.payable, dec!(535.50));
    assert_eq!(totals.calc_net_from_lines, dec!(450.00));
    assert_eq!(totals.calc_vat_from_lines, dec!(85.50));
    assert_eq!(totals.tax_subtotals.len(), 1);
    assert_eq!(totals.tax_subtotals[0].rate, dec!(19));
}

#[test]
fn tree_keeps_prefixes_and_attributes() {
    let tree = xml::parse_tree(SAMPLE).unwrap();
    let amount = resolve_str(&tree, "Invoice.cac:TaxTotal.cbc:TaxAmount")
        .unwrap()
        .unwrap();
    assert_eq!(amount.text(), Some("85.50"));
    assert_eq!(amount.attr("currencyID"), Some("RON"));

    let lines = resolve_str(&tree, "Invoice.cac:InvoiceLine").unwrap().unwrap();
    assert!(matches!(lines, Node::Sequence(items) if items.len() == 2));
}

#[test]
fn single_line_document_is_a_bare_mapping() {
    let xml = r#"<Invoice>
        <cbc:ID>ONE</cbc:ID>
        <cac:InvoiceLine>
            <cbc:InvoicedQuantity unitCode="KGM">2</cbc:InvoicedQuantity>
            <cbc:LineExtensionAmount>7.00</cbc:LineExtensionAmount>
        </cac:InvoiceLine>
    </Invoice>"#;
    let tree = xml::parse_tree(xml).unwrap();
    assert!(matches!(
        resolve_str(&tree, "Invoice.cac:InvoiceLine").unwrap(),
        Some(Node::Mapping(_))
    ));

    let record = extract(&tree).unwrap();
    assert_eq!(record.lines.len(), 1);
    assert_eq!(record.lines[0].unit, "KGM");
    assert_eq!(record.lines[0].unit_price, dec!(3.5));
}

#[test]
fn credit_note_document() {
    let xml = r#"<CreditNote>
        <cbc:ID>CN-7</cbc:ID>
        <cac:CreditNoteLine>
            <cbc:CreditedQuantity unitCode="H87">1</cbc:CreditedQuantity>
            <cbc:LineExtensionAmount>15.00</cbc:LineExtensionAmount>
        </cac:CreditNoteLine>
    </CreditNote>"#;
    let record = xml::extract_from_xml(xml).unwrap();
    assert_eq!(record.kind, DocumentKind::CreditNote);
    assert_eq!(record.id, "CN-7");
    assert_eq!(record.lines[0].line_net, dec!(15.00));
}

#[test]
fn options_pass_through() {
    let options = ExtractOptions {
        max_lines: Some(1),
        ..ExtractOptions::default()
    };
    assert!(matches!(
        xml::extract_from_xml_with(SAMPLE, &options),
        Err(NirError::TooManyLines { count: 2, max: 1 })
    ));
}

#[test]
fn malformed_xml_reports_position() {
    let err = xml::parse_tree("<Invoice><cbc:ID>1</cbc:Note></Invoice>").unwrap_err();
    assert!(matches!(err, NirError::Xml(_)));
    assert!(err.to_string().contains("position"), "{err}");
}
