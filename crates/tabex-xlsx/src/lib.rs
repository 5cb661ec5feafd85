//! # tabex-xlsx
//!
//! XLSX (Office Open XML) implementation of the tabex [`SheetWriter`] contract.
//!
//! [`XlsxSheetWriter`] buffers every command in memory and packages the
//! workbook when [`SheetWriter::serialize`] is called. When a palette is
//! handed over with [`SheetWriter::set_palette`] it is written as the
//! workbook's indexed color table, so `Indexed` color references resolve
//! against it.
//!
//! [`SheetWriter`]: tabex_core::SheetWriter
//! [`SheetWriter::serialize`]: tabex_core::SheetWriter::serialize
//! [`SheetWriter::set_palette`]: tabex_core::SheetWriter::set_palette

mod drawing;
pub mod error;
mod styles;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use writer::XlsxSheetWriter;
