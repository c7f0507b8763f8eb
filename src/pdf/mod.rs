//! NIR rendering to PDF.
//!
//! The report is an A4 landscape page set drawn with the standard Helvetica
//! fonts, so no font files are embedded. Text is written in WinAnsi encoding;
//! Romanian letters outside that code page lose their diacritic.
//!
//! # Example
//!
//! ```
//! use efactura_nir::nir::NirDocument;
//! use efactura_nir::pdf::{PdfOptions, render_nir};
//!
//! let record = efactura_nir::extract(&efactura_nir::Node::mapping([(
//!     "Invoice",
//!     efactura_nir::Node::mapping([("cbc:ID", efactura_nir::Node::from("INV-1"))]),
//! )]))
//! .unwrap();
//! let bytes = render_nir(&NirDocument::from_record(&record), &PdfOptions::default()).unwrap();
//! assert!(bytes.starts_with(b"%PDF-"));
//! ```

mod font;
mod layout;
mod wrap;

pub use font::{Font, Metrics, encode_win_ansi};
pub use layout::report_totals;
pub use wrap::{TextMeasure, wrap_text};

use chrono::NaiveDateTime;
use lopdf::content::Content;
use lopdf::{Document, Object, Stream, dictionary};
use serde::{Deserialize, Serialize};

use crate::core::NirError;
use crate::nir::NirDocument;
use font::PT_PER_MM;
use layout::{NirPdf, PAGE_H, PAGE_W};

/// Title drawn at the top of every page.
pub const DEFAULT_TITLE: &str = "NIR - Nota de intrare recepție";

/// PDF rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfOptions {
    pub title: String,
    /// Timestamp printed in the page footer; the local time when `None`.
    pub generated_at: Option<NaiveDateTime>,
    /// Flate-compress page content streams.
    pub compress: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            generated_at: None,
            compress: true,
        }
    }
}

fn render_err(context: &str, e: impl std::fmt::Display) -> NirError {
    NirError::Render(format!("{context}: {e}"))
}

/// Render a NIR report.
pub fn render_nir(doc: &NirDocument, options: &PdfOptions) -> Result<Vec<u8>, NirError> {
    let generated_at = options
        .generated_at
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let timestamp = generated_at.format("%Y-%m-%d %H:%M").to_string();

    let pages = NirPdf::new(options, timestamp).compose(doc);
    tracing::debug!(id = %doc.invoice_id, pages = pages.len(), "rendered NIR layout");

    let mut pdf = Document::with_version("1.7");
    let pages_id = pdf.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for font in [Font::Regular, Font::Bold] {
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource(), Object::Reference(font_id));
    }
    let resources_id = pdf.add_object(dictionary! {
        "Font" => fonts,
    });

    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        Object::Real(PAGE_W * PT_PER_MM),
        Object::Real(PAGE_H * PT_PER_MM),
    ];
    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| render_err("failed to encode page content", e))?;
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => media_box.clone(),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
        });
        kids.push(Object::Reference(page_id));
    }
    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    pdf.trailer.set("Root", Object::Reference(catalog_id));

    let info_id = pdf.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&format!("NIR {}", doc.invoice_id))),
        "Producer" => Object::string_literal(concat!("efactura-nir ", env!("CARGO_PKG_VERSION"))),
    });
    pdf.trailer.set("Info", Object::Reference(info_id));

    if options.compress {
        pdf.compress();
    }

    let mut output = Vec::new();
    pdf.save_to(&mut output)
        .map_err(|e| render_err("failed to save PDF", e))?;
    Ok(output)
}
