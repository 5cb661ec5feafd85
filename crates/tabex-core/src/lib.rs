//! # tabex-core
//!
//! Core data structures shared by the tabex export pipeline and its writers.
//!
//! This crate provides:
//! - [`Rgb`] and [`ColorRef`] - Colors as the layout sees them and as a format stores them
//! - [`GridCoord`] and [`GridRect`] - Discrete grid addressing
//! - [`StyleAttributes`] - The canonical, hashable description of a cell style
//! - [`CellValue`] and [`RichString`] - Values handed to a writer
//! - [`ImageAnchor`] - Sub-cell placement of pictures
//! - [`SheetWriter`] - The primitive writer contract, plus [`RecordingWriter`]
//!
//! ## Example
//!
//! ```rust
//! use tabex_core::{CellValue, GridRect, RecordingWriter, SheetWriter};
//!
//! let mut writer = RecordingWriter::new();
//! writer.create_sheet("Report");
//! writer.create_row(0, 15.0);
//! writer.set_cell_value(0, 0, CellValue::string("Total"));
//! writer.add_merged_region(GridRect::new(0, 0, 1, 0));
//!
//! assert_eq!(writer.merged_regions(), vec![GridRect::new(0, 0, 1, 0)]);
//! ```

pub mod anchor;
pub mod color;
pub mod error;
pub mod grid;
pub mod limits;
pub mod print;
pub mod style;
pub mod value;
pub mod writer;

pub use anchor::{AnchorPoint, ImageAnchor, PictureFormat, PictureId};
pub use color::{ColorRef, Rgb, STANDARD_PALETTE};
pub use error::{WriteError, WriteResult};
pub use grid::{column_to_letters, GridCoord, GridRect};
pub use print::{Orientation, PaperSize, PrintSetup};
pub use style::{
    BorderEdge, BorderLineStyle, FontHandle, FontSpec, HorizontalAlignment, NumFmtHandle,
    StyleAttributes, StyleHandle, Underline, VerticalAlignment,
};
pub use value::{date_to_serial, CellValue, RichString, RichTextRun};
pub use writer::{RecordingWriter, SheetWriter, WriterCommand};

pub use limits::*;
