#![cfg(feature = "pdf")]

use chrono::NaiveDate;
use efactura_nir::nir::NirDocument;
use efactura_nir::pdf::{PdfOptions, TextMeasure, render_nir, wrap_text};
use efactura_nir::*;
use lopdf::Document;

fn options() -> PdfOptions {
    PdfOptions {
        generated_at: NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0),
        compress: false,
        ..PdfOptions::default()
    }
}

fn document(lines: usize) -> NirDocument {
    let items: Vec<Node> = (0..lines)
        .map(|i| {
            Node::mapping([
                ("cbc:InvoicedQuantity", Node::from("1")),
                ("cbc:LineExtensionAmount", Node::from("10.00")),
                (
                    "cac:Item",
                    Node::mapping([("cbc:Name", Node::from(format!("Produs numarul {i}")))]),
                ),
            ])
        })
        .collect();
    let tree = Node::mapping([(
        "Invoice",
        Node::mapping([
            ("cbc:ID", Node::from("INV-PDF")),
            ("cbc:IssueDate", Node::from("2024-05-31")),
            ("cac:InvoiceLine", Node::from(items)),
        ]),
    )]);
    NirDocument::from_record(&extract(&tree).unwrap())
}

fn page_text(doc: &Document, page: u32) -> String {
    let pages = doc.get_pages();
    let content = doc.get_page_content(pages[&page]).unwrap();
    String::from_utf8_lossy(&content).into_owned()
}

#[test]
fn short_report_is_one_page() {
    let bytes = render_nir(&document(3), &options()).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));

    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);

    let text = page_text(&doc, 1);
    assert!(text.contains("NIR - Nota de intrare receptie"));
    assert!(text.contains("Factura: INV-PDF   |   Data: 2024-05-31"));
    assert!(text.contains("Produs numarul 2"));
    assert!(text.contains("Subtotal: 30.00"));
    assert!(text.contains("Comisia de receptie"));
    assert!(text.contains("Generat la 2024-06-01 09:30"));
}

#[test]
fn long_report_repeats_title_and_header() {
    let bytes = render_nir(&document(120), &options()).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    let pages = doc.get_pages().len() as u32;
    assert!(pages >= 3, "{pages} pages");

    for page in 1..=pages {
        let text = page_text(&doc, page);
        assert!(text.contains("NIR - Nota de intrare receptie"), "page {page}");
        assert!(text.contains(&format!("Pagina {page} ")), "page {page}");
        if page < pages {
            assert!(text.contains("Denumire"), "page {page}");
        }
    }
    assert!(page_text(&doc, pages).contains("Primit "));
    assert!(!page_text(&doc, 1).contains("Primit "));
}

#[test]
fn compressed_output_loads() {
    let options = PdfOptions {
        compress: true,
        ..options()
    };
    let bytes = render_nir(&document(40), &options).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert!(!doc.get_pages().is_empty());
}

#[test]
fn fonts_use_win_ansi() {
    let bytes = render_nir(&document(1), &options()).unwrap();
    let raw = String::from_utf8_lossy(&bytes);
    assert!(raw.contains("Helvetica-Bold"));
    assert!(raw.contains("WinAnsiEncoding"));
}

struct Mono;

impl TextMeasure for Mono {
    fn width(&self, text: &str) -> f32 {
        text.chars().count() as f32
    }
}

#[test]
fn wrap_is_public() {
    let lines = wrap_text("Surub autoforant 4,2x13 (set 100 buc)", 16.0, &Mono);
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|l| l.chars().count() <= 16));
}
