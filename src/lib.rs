//! Core library for the tarifa-tools command line application.
//!
//! The library converts spreadsheet-style CSV price lists (chapters,
//! subchapters, sections, and line items) into the validated JSON
//! representation consumed by the quoting application. The modules are
//! structured to keep responsibilities narrow and composable: the CSV
//! tokenizer lives in [`tokenize`], header mapping in [`header`], row and
//! cross-row validation in [`validate`], the canonical transformation in
//! [`transform`], data representations inside [`model`], and the conversion
//! orchestration under [`convert`].

pub mod convert;
pub mod error;
pub mod header;
pub mod model;
pub mod tokenize;
pub mod transform;
pub mod validate;

pub use convert::{convert, convert_file};
pub use error::{Result, ToolError};
pub use model::{Conversion, Entry, ValidationError};
