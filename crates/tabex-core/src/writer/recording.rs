//! In-memory writer that records every command
//!
//! Used for dry runs and as the writer in tests. Handles are issued
//! sequentially and every registered object is kept so callers can inspect
//! the resulting workbook without parsing a file.

use super::SheetWriter;
use crate::style::number_format::{builtin_format_id, FIRST_CUSTOM_FORMAT_ID};
use crate::{
    CellValue, FontHandle, FontSpec, GridRect, ImageAnchor, NumFmtHandle, PictureFormat,
    PictureId, PrintSetup, Rgb, StyleAttributes, StyleHandle, WriteResult,
};
use ahash::AHashMap;
use std::io::Write;

/// A single command received by a [`RecordingWriter`]
#[derive(Debug, Clone, PartialEq)]
pub enum WriterCommand {
    CreateSheet(String),
    SetColumnWidth { col: u32, width: u32 },
    CreateRow { row: u32, height: f64 },
    SetCellValue { col: u32, row: u32, value: CellValue },
    SetCellStyle { col: u32, row: u32, style: StyleHandle },
    AddMergedRegion(GridRect),
    RegisterFont(FontHandle),
    RegisterNumberFormat { handle: NumFmtHandle, code: String },
    CreateStyle(StyleHandle),
    RegisterPicture { id: PictureId, format: PictureFormat, len: usize },
    CreateAnchoredPicture { picture: PictureId, anchor: ImageAnchor },
    SetHeaderFooter { header: String, footer: String },
    SetPrintSetup(PrintSetup),
    FreezePanes { rows: u32, cols: u32 },
    SetPalette(Vec<Rgb>),
    CloseSheet,
}

#[derive(Debug, Default)]
struct RecordedSheet {
    name: String,
    values: AHashMap<(u32, u32), CellValue>,
    styles: AHashMap<(u32, u32), StyleHandle>,
    rows: Vec<u32>,
    merges: Vec<GridRect>,
    pictures: Vec<(PictureId, ImageAnchor)>,
}

/// Writer that keeps every command in memory
#[derive(Debug, Default)]
pub struct RecordingWriter {
    commands: Vec<WriterCommand>,
    sheets: Vec<RecordedSheet>,
    fonts: Vec<FontSpec>,
    formats: Vec<(NumFmtHandle, String)>,
    styles: Vec<StyleAttributes>,
    pictures: Vec<(PictureFormat, Vec<u8>)>,
    palette: Option<Vec<Rgb>>,
    open: bool,
}

impl RecordingWriter {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command in arrival order
    pub fn commands(&self) -> &[WriterCommand] {
        &self.commands
    }

    /// Names of all sheets created so far
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of `create_style` calls
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Number of `register_font` calls
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Number of `register_number_format` calls
    pub fn number_format_count(&self) -> usize {
        self.formats.len()
    }

    /// Attributes a style handle was created from
    pub fn style(&self, handle: StyleHandle) -> Option<&StyleAttributes> {
        self.styles.get(handle.0 as usize)
    }

    /// Font a handle was registered for
    pub fn font(&self, handle: FontHandle) -> Option<&FontSpec> {
        self.fonts.get(handle.0 as usize)
    }

    /// Format code a handle was registered for
    pub fn number_format(&self, handle: NumFmtHandle) -> Option<&str> {
        self.formats
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, code)| code.as_str())
    }

    /// The palette handed over with `set_palette`, if any
    pub fn palette(&self) -> Option<&[Rgb]> {
        self.palette.as_deref()
    }

    /// Registered picture bytes
    pub fn picture(&self, id: PictureId) -> Option<(PictureFormat, &[u8])> {
        self.pictures
            .get(id.0 as usize)
            .map(|(format, bytes)| (*format, bytes.as_slice()))
    }

    /// Value of a cell on the last sheet
    pub fn cell_value(&self, col: u32, row: u32) -> Option<&CellValue> {
        self.sheets.last()?.values.get(&(col, row))
    }

    /// Style of a cell on the last sheet
    pub fn cell_style(&self, col: u32, row: u32) -> Option<StyleHandle> {
        self.sheets.last()?.styles.get(&(col, row)).copied()
    }

    /// Number of styled cells on the last sheet
    pub fn styled_cell_count(&self) -> usize {
        self.sheets.last().map(|s| s.styles.len()).unwrap_or(0)
    }

    /// Rows created on the last sheet, in creation order
    pub fn rows(&self) -> Vec<u32> {
        self.sheets.last().map(|s| s.rows.clone()).unwrap_or_default()
    }

    /// Merged regions on the last sheet
    pub fn merged_regions(&self) -> Vec<GridRect> {
        self.sheets
            .last()
            .map(|s| s.merges.clone())
            .unwrap_or_default()
    }

    /// Anchored pictures on the last sheet
    pub fn anchored_pictures(&self) -> Vec<(PictureId, ImageAnchor)> {
        self.sheets
            .last()
            .map(|s| s.pictures.clone())
            .unwrap_or_default()
    }

    /// Whether a sheet is currently open
    pub fn is_sheet_open(&self) -> bool {
        self.open
    }

    fn current(&mut self) -> Option<&mut RecordedSheet> {
        if self.open {
            self.sheets.last_mut()
        } else {
            None
        }
    }
}

impl SheetWriter for RecordingWriter {
    fn create_sheet(&mut self, name: &str) {
        self.commands.push(WriterCommand::CreateSheet(name.to_string()));
        self.sheets.push(RecordedSheet {
            name: name.to_string(),
            ..Default::default()
        });
        self.open = true;
    }

    fn set_column_width(&mut self, col: u32, width: u32) {
        self.commands
            .push(WriterCommand::SetColumnWidth { col, width });
    }

    fn create_row(&mut self, row: u32, height: f64) {
        self.commands.push(WriterCommand::CreateRow { row, height });
        if let Some(sheet) = self.current() {
            sheet.rows.push(row);
        }
    }

    fn set_cell_value(&mut self, col: u32, row: u32, value: CellValue) {
        if let Some(sheet) = self.current() {
            sheet.values.insert((col, row), value.clone());
        }
        self.commands
            .push(WriterCommand::SetCellValue { col, row, value });
    }

    fn set_cell_style(&mut self, col: u32, row: u32, style: StyleHandle) {
        self.commands
            .push(WriterCommand::SetCellStyle { col, row, style });
        if let Some(sheet) = self.current() {
            sheet.styles.insert((col, row), style);
        }
    }

    fn add_merged_region(&mut self, rect: GridRect) {
        self.commands.push(WriterCommand::AddMergedRegion(rect));
        if let Some(sheet) = self.current() {
            sheet.merges.push(rect);
        }
    }

    fn register_font(&mut self, font: &FontSpec) -> FontHandle {
        let handle = FontHandle(self.fonts.len() as u32);
        self.fonts.push(font.clone());
        self.commands.push(WriterCommand::RegisterFont(handle));
        handle
    }

    fn register_number_format(&mut self, code: &str) -> NumFmtHandle {
        let custom = self
            .formats
            .iter()
            .filter(|(h, _)| h.0 >= FIRST_CUSTOM_FORMAT_ID)
            .count() as u32;
        let handle = NumFmtHandle(
            builtin_format_id(code).unwrap_or(FIRST_CUSTOM_FORMAT_ID + custom),
        );
        self.formats.push((handle, code.to_string()));
        self.commands.push(WriterCommand::RegisterNumberFormat {
            handle,
            code: code.to_string(),
        });
        handle
    }

    fn create_style(&mut self, attrs: &StyleAttributes) -> StyleHandle {
        let handle = StyleHandle(self.styles.len() as u32);
        self.styles.push(attrs.clone());
        self.commands.push(WriterCommand::CreateStyle(handle));
        handle
    }

    fn register_picture(&mut self, bytes: Vec<u8>, format: PictureFormat) -> PictureId {
        let id = PictureId(self.pictures.len() as u32);
        self.commands.push(WriterCommand::RegisterPicture {
            id,
            format,
            len: bytes.len(),
        });
        self.pictures.push((format, bytes));
        id
    }

    fn create_anchored_picture(&mut self, picture: PictureId, anchor: ImageAnchor) {
        self.commands
            .push(WriterCommand::CreateAnchoredPicture { picture, anchor });
        if let Some(sheet) = self.current() {
            sheet.pictures.push((picture, anchor));
        }
    }

    fn set_header_footer(&mut self, header: &str, footer: &str) {
        self.commands.push(WriterCommand::SetHeaderFooter {
            header: header.to_string(),
            footer: footer.to_string(),
        });
    }

    fn set_print_setup(&mut self, setup: &PrintSetup) {
        self.commands.push(WriterCommand::SetPrintSetup(setup.clone()));
    }

    fn freeze_panes(&mut self, rows: u32, cols: u32) {
        self.commands.push(WriterCommand::FreezePanes { rows, cols });
    }

    fn set_palette(&mut self, entries: &[Rgb]) {
        self.palette = Some(entries.to_vec());
        self.commands.push(WriterCommand::SetPalette(entries.to_vec()));
    }

    fn close_sheet(&mut self) {
        self.commands.push(WriterCommand::CloseSheet);
        self.open = false;
    }

    /// Writes one line per recorded command
    fn serialize(&mut self, out: &mut dyn Write) -> WriteResult<()> {
        for command in &self.commands {
            writeln!(out, "{command:?}")?;
        }
        out.flush()?;
        Ok(())
    }
}
