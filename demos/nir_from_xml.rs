//! Build a NIR from a UBL invoice file.
//!
//! ```text
//! cargo run --example nir_from_xml --features all -- invoice.xml [out-dir]
//! ```
//!
//! Writes `NIR_<id>.pdf`, `NIR_<id>.csv` and `NIR_<id>.xlsx`. Set `RUST_LOG=efactura_nir=debug`
//! to see extraction details.

use std::path::PathBuf;

use efactura_nir::nir::export::{self, Sheet};
use efactura_nir::nir::NirDocument;
use efactura_nir::pdf::{PdfOptions, render_nir};
use efactura_nir::xml;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("usage: nir_from_xml <invoice.xml> [out-dir]");
        std::process::exit(2);
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".into()));

    let text = std::fs::read_to_string(&input)?;
    let record = xml::extract_from_xml(&text)?;

    println!("Invoice {} from {}", record.id, record.issue_date);
    println!("  supplier: {} ({})", record.supplier.name, record.supplier.tax_id);
    println!("  buyer:    {} ({})", record.buyer.name, record.buyer.tax_id);
    println!(
        "  lines: {}, net {} {}, VAT {}",
        record.lines.len(),
        record.totals.net,
        record.currency,
        record.totals.vat
    );
    for finding in &record.validations {
        println!("  {finding}");
    }

    let nir = NirDocument::from_record(&record);
    // Ids may contain '/', which is not valid in a file name.
    let stem = format!("NIR_{}", nir.invoice_id.replace('/', "_"));

    let pdf_path = out_dir.join(format!("{stem}.pdf"));
    std::fs::write(&pdf_path, render_nir(&nir, &PdfOptions::default())?)?;
    println!("Wrote {}", pdf_path.display());

    let csv_path = out_dir.join(format!("{stem}.csv"));
    std::fs::write(&csv_path, export::to_csv(&nir))?;
    println!("Wrote {}", csv_path.display());

    let xlsx_path = out_dir.join(format!("{stem}.xlsx"));
    std::fs::write(&xlsx_path, Sheet::from_document(&nir).to_xlsx()?)?;
    println!("Wrote {}", xlsx_path.display());

    Ok(())
}
