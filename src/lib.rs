//! # efactura-nir
//!
//! Reads UBL 2.1 e-invoices (Romanian e-Factura / CIUS-RO) from a generic
//! document tree, extracts an [`InvoiceRecord`], checks the declared totals
//! against the line items, and renders NIR (Notă de Intrare-Recepție) goods
//! reception reports.
//!
//! All monetary values use [`rust_decimal::Decimal`]. Parsing never fails on
//! a missing field: absent values fall back to documented defaults and any
//! disagreement between declared and computed totals is reported as a
//! [`Finding`] on the record.
//!
//! ## Quick Start
//!
//! ```rust
//! use efactura_nir::{Node, extract};
//! use rust_decimal_macros::dec;
//!
//! let line = Node::mapping([
//!     ("cbc:InvoicedQuantity", Node::from("2")),
//!     ("cbc:LineExtensionAmount", Node::from("100.00")),
//!     ("cac:Item", Node::mapping([("cbc:Name", Node::from("Servicii"))])),
//! ]);
//! let tree = Node::mapping([(
//!     "Invoice",
//!     Node::mapping([
//!         ("cbc:ID", Node::from("INV-1")),
//!         ("cac:InvoiceLine", line),
//!         (
//!             "cac:LegalMonetaryTotal",
//!             Node::mapping([("cbc:TaxExclusiveAmount", Node::from("100.00"))]),
//!         ),
//!     ]),
//! )]);
//!
//! let record = extract(&tree).unwrap();
//! assert_eq!(record.lines[0].unit_price, dec!(50));
//! assert!(record.validations.is_empty());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document tree, path resolver, extraction, reconciliation |
//! | `xml` | XML text to document tree (quick-xml) |
//! | `json` | JSON values to document tree (serde_json) |
//! | `nir` | NIR report model, CSV and sheet exports |
//! | `pdf` | NIR rendering to PDF (lopdf) |
//! | `xlsx` | NIR sheet as a formatted workbook (rust_xlsxwriter) |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "nir")]
pub mod nir;

#[cfg(feature = "pdf")]
pub mod pdf;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
