//! The primitive writer contract
//!
//! A [`SheetWriter`] receives low-level commands (sheets, rows, cell values,
//! styles, merges, pictures) and turns them into an on-disk format when
//! [`SheetWriter::serialize`] is called. Writers buffer in memory, so every
//! command except `serialize` is infallible.

mod recording;

pub use recording::{RecordingWriter, WriterCommand};

use crate::{
    CellValue, FontHandle, FontSpec, GridRect, ImageAnchor, NumFmtHandle, PictureFormat,
    PictureId, PrintSetup, Rgb, StyleAttributes, StyleHandle, WriteResult,
};
use std::io::Write;

/// Low-level workbook encoder driven by the export pipeline
///
/// Cell-level commands apply to the sheet opened by the last
/// [`create_sheet`](SheetWriter::create_sheet) call.
pub trait SheetWriter {
    /// Open a new sheet; it becomes the current sheet
    fn create_sheet(&mut self, name: &str);

    /// Set a column width in 1/256ths of a character
    fn set_column_width(&mut self, col: u32, width: u32);

    /// Create a row with the given height in points
    fn create_row(&mut self, row: u32, height: f64);

    /// Write a cell value
    fn set_cell_value(&mut self, col: u32, row: u32, value: CellValue);

    /// Apply a style to a cell
    fn set_cell_style(&mut self, col: u32, row: u32, style: StyleHandle);

    /// Merge a rectangular region
    fn add_merged_region(&mut self, rect: GridRect);

    /// Register a font and get its handle
    fn register_font(&mut self, font: &FontSpec) -> FontHandle;

    /// Register a number format code and get its handle
    fn register_number_format(&mut self, code: &str) -> NumFmtHandle;

    /// Materialize a native style object
    fn create_style(&mut self, attrs: &StyleAttributes) -> StyleHandle;

    /// Register encoded picture bytes
    fn register_picture(&mut self, bytes: Vec<u8>, format: PictureFormat) -> PictureId;

    /// Place a registered picture on the current sheet
    fn create_anchored_picture(&mut self, picture: PictureId, anchor: ImageAnchor);

    /// Set page header and footer text
    fn set_header_footer(&mut self, header: &str, footer: &str);

    /// Set print options for the current sheet
    fn set_print_setup(&mut self, setup: &PrintSetup);

    /// Freeze the given number of leading rows and columns
    fn freeze_panes(&mut self, rows: u32, cols: u32);

    /// Replace the indexed color table
    fn set_palette(&mut self, entries: &[Rgb]);

    /// Close the current sheet
    fn close_sheet(&mut self);

    /// Encode the whole workbook to `out`
    fn serialize(&mut self, out: &mut dyn Write) -> WriteResult<()>;
}

impl<W: SheetWriter + ?Sized> SheetWriter for &mut W {
    fn create_sheet(&mut self, name: &str) {
        (**self).create_sheet(name)
    }

    fn set_column_width(&mut self, col: u32, width: u32) {
        (**self).set_column_width(col, width)
    }

    fn create_row(&mut self, row: u32, height: f64) {
        (**self).create_row(row, height)
    }

    fn set_cell_value(&mut self, col: u32, row: u32, value: CellValue) {
        (**self).set_cell_value(col, row, value)
    }

    fn set_cell_style(&mut self, col: u32, row: u32, style: StyleHandle) {
        (**self).set_cell_style(col, row, style)
    }

    fn add_merged_region(&mut self, rect: GridRect) {
        (**self).add_merged_region(rect)
    }

    fn register_font(&mut self, font: &FontSpec) -> FontHandle {
        (**self).register_font(font)
    }

    fn register_number_format(&mut self, code: &str) -> NumFmtHandle {
        (**self).register_number_format(code)
    }

    fn create_style(&mut self, attrs: &StyleAttributes) -> StyleHandle {
        (**self).create_style(attrs)
    }

    fn register_picture(&mut self, bytes: Vec<u8>, format: PictureFormat) -> PictureId {
        (**self).register_picture(bytes, format)
    }

    fn create_anchored_picture(&mut self, picture: PictureId, anchor: ImageAnchor) {
        (**self).create_anchored_picture(picture, anchor)
    }

    fn set_header_footer(&mut self, header: &str, footer: &str) {
        (**self).set_header_footer(header, footer)
    }

    fn set_print_setup(&mut self, setup: &PrintSetup) {
        (**self).set_print_setup(setup)
    }

    fn freeze_panes(&mut self, rows: u32, cols: u32) {
        (**self).freeze_panes(rows, cols)
    }

    fn set_palette(&mut self, entries: &[Rgb]) {
        (**self).set_palette(entries)
    }

    fn close_sheet(&mut self) {
        (**self).close_sheet()
    }

    fn serialize(&mut self, out: &mut dyn Write) -> WriteResult<()> {
        (**self).serialize(out)
    }
}
