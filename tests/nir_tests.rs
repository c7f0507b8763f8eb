#![cfg(feature = "nir")]

use efactura_nir::nir::export::{self, Cell, SHEET_HEADER_ROW, Sheet};
use efactura_nir::nir::{MISSING_ID, NirDocument, header_vat_rate};
use efactura_nir::*;
use rust_decimal_macros::dec;

fn s(text: &str) -> Node {
    Node::from(text)
}

fn record() -> InvoiceRecord {
    let paper = Node::mapping([
        (
            "cbc:InvoicedQuantity",
            Node::mapping([("@unitCode", s("H87")), ("#text", s("10"))]),
        ),
        ("cbc:LineExtensionAmount", s("225.00")),
        (
            "cac:Item",
            Node::mapping([
                ("cbc:Name", s("Hârtie A4")),
                (
                    "cac:ClassifiedTaxCategory",
                    Node::mapping([("cbc:Percent", s("19"))]),
                ),
            ]),
        ),
        ("cac:Price", Node::mapping([("cbc:PriceAmount", s("22.50"))])),
    ]);
    let service = Node::mapping([
        ("cbc:InvoicedQuantity", s("2")),
        ("cbc:LineExtensionAmount", s("100.00")),
        ("cac:Item", Node::mapping([("cbc:Name", s("Servicii, montaj"))])),
    ]);
    let tree = Node::mapping([(
        "Invoice",
        Node::mapping([
            ("cbc:ID", s("F-100")),
            ("cbc:IssueDate", s("2024-05-14")),
            ("cac:InvoiceLine", Node::sequence([paper, service])),
            ("cac:TaxTotal", Node::mapping([("cbc:TaxAmount", s("61.75"))])),
            (
                "cac:LegalMonetaryTotal",
                Node::mapping([("cbc:TaxExclusiveAmount", s("325.00"))]),
            ),
        ]),
    )]);
    extract(&tree).unwrap()
}

#[test]
fn rows_take_header_rate_when_line_has_none() {
    let record = record();
    assert_eq!(header_vat_rate(&record), dec!(19));

    let nir = NirDocument::from_record(&record);
    assert_eq!(nir.rows.len(), 2);

    let service = &nir.rows[1];
    assert_eq!(service.unit_price, dec!(50));
    assert_eq!(service.vat_percent, dec!(19));
    assert_eq!(service.vat_amount, dec!(19.00));
    assert_eq!(service.total, dec!(119.00));

    assert_eq!(nir.totals.subtotal, dec!(325.00));
    assert_eq!(nir.totals.vat, dec!(61.75));
    assert_eq!(nir.totals.grand_total, dec!(386.75));
}

#[test]
fn findings_are_carried_over() {
    // Lines declare VAT only on the first row: 42.75 against 61.75.
    let nir = NirDocument::from_record(&record());
    assert_eq!(nir.findings.len(), 1);
    assert!(nir.findings[0].message.contains("61.75"));
    assert!(!nir.has_errors());
}

#[test]
fn missing_id_gets_placeholder() {
    let mut record = record();
    record.id = String::new();
    assert_eq!(NirDocument::from_record(&record).invoice_id, MISSING_ID);
}

#[test]
fn csv_export() {
    let csv = export::to_csv(&NirDocument::from_record(&record()));
    let expected = "\u{feff}Denumire,U.M.,Cant.,Preț unitar,Valoare netă,TVA %,TVA,Total\n\
                    Hârtie A4,H87,10.00,22.50,225.00,19.00,42.75,267.75\n\
                    \"Servicii, montaj\",,2.00,50.00,100.00,19.00,19.00,119.00\n";
    assert_eq!(csv, expected);
}

#[test]
fn sheet_layout() {
    let sheet = Sheet::from_document(&NirDocument::from_record(&record()));

    assert_eq!(sheet.rows().len(), SHEET_HEADER_ROW + 1 + 2);
    assert_eq!(sheet.cell(2, 1), Some(&Cell::Text("F-100".into())));
    assert_eq!(sheet.cell(SHEET_HEADER_ROW, 0), Some(&Cell::from("Denumire")));
    assert_eq!(
        sheet.cell(SHEET_HEADER_ROW + 1, 7),
        Some(&Cell::Number(dec!(267.75)))
    );
    assert_eq!(sheet.cell(1, 0), None);

    insta::assert_snapshot!(sheet.to_delimited(';').trim_end(), @r"
    NIR generat din e-Factura

    Număr factură:;F-100
    Dată factură:;2024-05-14
    Monedă:;RON
    Denumire;U.M.;Cant.;Preț unitar;Valoare netă;TVA %;TVA;Total
    Hârtie A4;H87;10.00;22.50;225.00;19.00;42.75;267.75
    Servicii, montaj;;2.00;50.00;100.00;19.00;19.00;119.00
    ");
}

#[test]
fn document_serializes_amounts_as_strings() {
    let nir = NirDocument::from_record(&record());
    let json = serde_json::to_value(&nir).unwrap();
    assert_eq!(json["rows"][0]["total"], "267.75");
    assert_eq!(json["findings"][0]["severity"], "warning");
}

#[cfg(feature = "xlsx")]
mod workbook {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    fn number(data: Option<&Data>) -> f64 {
        match data {
            Some(Data::Float(f)) => *f,
            Some(Data::Int(i)) => *i as f64,
            other => panic!("expected a number, got {other:?}"),
        }
    }

    fn text(data: Option<&Data>) -> &str {
        match data {
            Some(Data::String(s)) => s,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn workbook_keeps_sheet_layout() {
        let sheet = Sheet::from_document(&NirDocument::from_record(&record()));
        let bytes = sheet.to_xlsx().unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));

        let mut book = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = book.worksheet_range(export::WORKSHEET_NAME).unwrap();

        let at = |r: usize, c: usize| range.get_value((r as u32, c as u32));
        assert_eq!(text(at(0, 0)), "NIR generat din e-Factura");
        assert_eq!(text(at(2, 0)), "Număr factură:");
        assert_eq!(text(at(2, 1)), "F-100");
        assert_eq!(text(at(4, 1)), "RON");
        assert_eq!(text(at(SHEET_HEADER_ROW, 3)), "Preț unitar");

        let first = SHEET_HEADER_ROW + 1;
        assert_eq!(text(at(first, 0)), "Hârtie A4");
        assert_eq!(number(at(first, 2)), 10.0);
        assert_eq!(number(at(first, 7)), 267.75);
        assert_eq!(text(at(first + 1, 0)), "Servicii, montaj");
        assert_eq!(number(at(first + 1, 3)), 50.0);
    }
}
