//! Passes over the Conduit IR.
//!
//! This crate provides:
//! - Table catalog for name resolution (`catalog`)
//! - Pseudo-query pretty printer (`printer`)
//! - Validation and type inference (`checker`)

pub mod error;
pub mod catalog;
pub mod printer;
pub mod checker;

pub use catalog::{resolve_path, Catalog};
pub use checker::{check_root, infer_type};
pub use error::CheckError;
pub use printer::{print_root, Printer};
