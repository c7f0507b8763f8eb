//! Document tree, path resolver, invoice extraction and reconciliation.
//!
//! This module has no I/O: it turns an already parsed [`Node`] tree into an
//! [`InvoiceRecord`] whose declared totals have been checked against the
//! line items.

mod error;
mod extract;
pub mod numeric;
mod path;
mod reconcile;
mod tree;
mod types;

pub use error::*;
pub use extract::*;
pub use path::*;
pub use reconcile::*;
pub use tree::*;
pub use types::*;
