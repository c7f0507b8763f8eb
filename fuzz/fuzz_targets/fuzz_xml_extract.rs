#![no_main]

use efactura_nir::nir::{NirDocument, export};
use efactura_nir::pdf::{PdfOptions, render_nir};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Errors are fine, panics are bugs.
        if let Ok(record) = efactura_nir::xml::extract_from_xml(s) {
            let nir = NirDocument::from_record(&record);
            let _ = export::to_csv(&nir);
            let options = PdfOptions {
                compress: false,
                ..PdfOptions::default()
            };
            let _ = render_nir(&nir, &options);
        }
    }
});
