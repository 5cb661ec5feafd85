//! XLSX sheet writer

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use tabex_core::style::number_format::{builtin_format_id, FIRST_CUSTOM_FORMAT_ID};
use tabex_core::{
    date_to_serial, CellValue, FontHandle, FontSpec, GridCoord, GridRect, ImageAnchor,
    NumFmtHandle, PictureFormat, PictureId, PrintSetup, Rgb, RichString, SheetWriter,
    StyleAttributes, StyleHandle, WriteResult,
};

use crate::drawing::{self, PlacedPicture};
use crate::error::{XlsxError, XlsxResult};
use crate::styles::{self, XlsxStyleTable};

#[derive(Debug, Default)]
struct CellData {
    value: Option<CellValue>,
    style: Option<StyleHandle>,
}

#[derive(Debug, Default)]
struct RowData {
    height: Option<f64>,
    cells: BTreeMap<u32, CellData>,
}

#[derive(Debug, Default)]
struct SheetData {
    name: String,
    col_widths: BTreeMap<u32, u32>,
    rows: BTreeMap<u32, RowData>,
    merges: Vec<GridRect>,
    pictures: Vec<(PictureId, ImageAnchor)>,
    header_footer: Option<(String, String)>,
    print_setup: Option<PrintSetup>,
    freeze: Option<(u32, u32)>,
}

impl SheetData {
    fn cell_mut(&mut self, col: u32, row: u32) -> &mut CellData {
        self.rows.entry(row).or_default().cells.entry(col).or_default()
    }
}

/// Buffers writer commands and packages them as an XLSX workbook
#[derive(Debug, Default)]
pub struct XlsxSheetWriter {
    sheets: Vec<SheetData>,
    current: Option<usize>,
    fonts: Vec<FontSpec>,
    num_fmts: Vec<(u32, String)>,
    styles: Vec<StyleAttributes>,
    pictures: Vec<(PictureFormat, Vec<u8>)>,
    palette: Option<Vec<Rgb>>,
    dropped_commands: usize,
}

impl XlsxSheetWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sheets created so far
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Package the workbook into a byte vector
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.write_package(&mut buf)?;
        Ok(buf.into_inner())
    }

    /// Package the workbook into a file
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        self.write_package(file)
    }

    fn sheet(&mut self) -> Option<&mut SheetData> {
        match self.current {
            Some(i) => self.sheets.get_mut(i),
            None => {
                self.dropped_commands += 1;
                None
            }
        }
    }

    fn write_package<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        if self.sheets.is_empty() {
            return Err(XlsxError::InvalidState(
                "a workbook needs at least one sheet".into(),
            ));
        }
        if self.dropped_commands > 0 {
            log::warn!(
                "{} cell commands arrived with no open sheet and were dropped",
                self.dropped_commands
            );
        }

        let mut zip = zip::ZipWriter::new(writer);

        self.write_content_types(&mut zip)?;
        Self::write_root_rels(&mut zip)?;
        self.write_workbook_xml(&mut zip)?;
        self.write_workbook_rels(&mut zip)?;
        self.write_styles_xml(&mut zip)?;

        let mut drawing_index = 0;
        for (i, sheet) in self.sheets.iter().enumerate() {
            let drawing = if sheet.pictures.is_empty() {
                None
            } else {
                drawing_index += 1;
                Some(drawing_index)
            };
            self.write_worksheet(&mut zip, i, sheet, drawing)?;
            if let Some(n) = drawing {
                self.write_drawing(&mut zip, i, n, sheet)?;
            }
        }

        for (i, (format, bytes)) in self.pictures.iter().enumerate() {
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file(drawing::media_path(PictureId(i as u32), *format), options)?;
            zip.write_all(bytes)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(&self, zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>"#,
        );

        let mut formats: Vec<PictureFormat> = Vec::new();
        for (format, _) in &self.pictures {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        for format in formats {
            content.push_str(&format!(
                r#"
    <Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            ));
        }

        content.push_str(
            r#"
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..self.sheets.len() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        let drawings = self.sheets.iter().filter(|s| !s.pictures.is_empty()).count();
        for n in 1..=drawings {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/drawings/drawing{}.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/>"#,
                n
            ));
        }

        content.push_str("\n</Types>");
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(&self, zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, sheet) in self.sheets.iter().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(sheet.name.as_str()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(&self, zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..self.sheets.len() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            self.sheets.len() + 1
        ));

        content.push_str("\n</Relationships>");
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_styles_xml<W: Write + Seek>(&self, zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;
        let table = XlsxStyleTable {
            fonts: &self.fonts,
            custom_formats: &self.num_fmts,
            styles: &self.styles,
            palette: self.palette.as_deref(),
        };
        zip.write_all(table.to_styles_xml().as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        &self,
        zip: &mut zip::ZipWriter<W>,
        index: usize,
        sheet: &SheetData,
        drawing: Option<usize>,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        Self::write_sheet_views(&mut content, sheet);

        if !sheet.col_widths.is_empty() {
            content.push_str("\n    <cols>");
            for (col, width) in &sheet.col_widths {
                content.push_str(&format!(
                    "\n        <col min=\"{}\" max=\"{}\" width=\"{}\" customWidth=\"1\"/>",
                    col + 1,
                    col + 1,
                    *width as f64 / 256.0
                ));
            }
            content.push_str("\n    </cols>");
        }

        content.push_str("\n    <sheetData>");
        for (row, data) in &sheet.rows {
            match data.height {
                Some(h) => content.push_str(&format!(
                    "\n        <row r=\"{}\" ht=\"{}\" customHeight=\"1\">",
                    row + 1,
                    h
                )),
                None => content.push_str(&format!("\n        <row r=\"{}\">", row + 1)),
            }
            for (col, cell) in &data.cells {
                self.write_cell(&mut content, GridCoord::new(*col, *row), cell);
            }
            content.push_str("\n        </row>");
        }
        content.push_str("\n    </sheetData>");

        if !sheet.merges.is_empty() {
            content.push_str(&format!(
                "\n    <mergeCells count=\"{}\">",
                sheet.merges.len()
            ));
            for range in &sheet.merges {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        if let Some(setup) = &sheet.print_setup {
            Self::write_print_setup(&mut content, setup);
        }

        if let Some((header, footer)) = &sheet.header_footer {
            content.push_str("\n    <headerFooter>");
            if !header.is_empty() {
                content.push_str(&format!(
                    "<oddHeader>&amp;C{}</oddHeader>",
                    escape(header_footer_text(header).as_str())
                ));
            }
            if !footer.is_empty() {
                content.push_str(&format!(
                    "<oddFooter>&amp;C{}</oddFooter>",
                    escape(header_footer_text(footer).as_str())
                ));
            }
            content.push_str("</headerFooter>");
        }

        if drawing.is_some() {
            content.push_str("\n    <drawing r:id=\"rId1\"/>");
        }

        content.push_str("\n</worksheet>");
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_sheet_views(content: &mut String, sheet: &SheetData) {
        let hide_grid = sheet
            .print_setup
            .as_ref()
            .map(|p| !p.gridlines_displayed)
            .unwrap_or(false);
        let grid_attr = if hide_grid { " showGridLines=\"0\"" } else { "" };

        match sheet.freeze {
            Some((rows, cols)) if rows > 0 || cols > 0 => {
                let pane = match (rows > 0, cols > 0) {
                    (true, true) => "bottomRight",
                    (true, false) => "bottomLeft",
                    _ => "topRight",
                };
                let mut split = String::new();
                if cols > 0 {
                    split.push_str(&format!(" xSplit=\"{}\"", cols));
                }
                if rows > 0 {
                    split.push_str(&format!(" ySplit=\"{}\"", rows));
                }
                content.push_str(&format!(
                    "\n    <sheetViews><sheetView{} workbookViewId=\"0\"><pane{} topLeftCell=\"{}\" activePane=\"{}\" state=\"frozen\"/></sheetView></sheetViews>",
                    grid_attr,
                    split,
                    GridCoord::new(cols, rows).to_a1_string(),
                    pane
                ));
            }
            _ => content.push_str(&format!(
                "\n    <sheetViews><sheetView{} workbookViewId=\"0\"/></sheetViews>",
                grid_attr
            )),
        }
    }

    fn write_print_setup(content: &mut String, setup: &PrintSetup) {
        if setup.gridlines_printed {
            content.push_str("\n    <printOptions gridLines=\"1\"/>");
        }
        content.push_str(
            "\n    <pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>",
        );

        let mut attrs = format!(
            " paperSize=\"{}\" scale=\"{}\" orientation=\"{}\"",
            setup.paper_size.code(),
            setup.scale,
            setup.orientation.xlsx_name()
        );
        if setup.use_first_page_number {
            attrs.push_str(&format!(
                " firstPageNumber=\"{}\" useFirstPageNumber=\"1\"",
                setup.first_page_number
            ));
        }
        if setup.draft {
            attrs.push_str(" draft=\"1\"");
        }
        if setup.print_notes {
            attrs.push_str(" cellComments=\"atEnd\"");
        }
        if let Some(dpi) = setup.resolution {
            attrs.push_str(&format!(" horizontalDpi=\"{dpi}\" verticalDpi=\"{dpi}\""));
        }
        content.push_str(&format!("\n    <pageSetup{}/>", attrs));
    }

    fn write_cell(&self, content: &mut String, at: GridCoord, cell: &CellData) {
        let cell_ref = at.to_a1_string();
        let style_attr = cell
            .style
            .map(|h| format!(" s=\"{}\"", XlsxStyleTable::xf_id(h.0)))
            .unwrap_or_default();

        match &cell.value {
            None | Some(CellValue::Blank) => {
                content.push_str(&format!("\n            <c r=\"{}\"{}/>", cell_ref, style_attr));
            }
            Some(CellValue::Number(n)) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{}><v>{}</v></c>",
                    cell_ref, style_attr, n
                ));
            }
            Some(CellValue::Date(dt)) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{}><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    date_to_serial(*dt)
                ));
            }
            Some(CellValue::Boolean(b)) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    if *b { 1 } else { 0 }
                ));
            }
            Some(CellValue::String(s)) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"inlineStr\"><is>{}</is></c>",
                    cell_ref,
                    style_attr,
                    text_element(s)
                ));
            }
            Some(CellValue::Rich(rich)) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"inlineStr\"><is>{}</is></c>",
                    cell_ref,
                    style_attr,
                    self.rich_runs(rich)
                ));
            }
            Some(CellValue::Formula(text)) => {
                let formula = text.strip_prefix('=').unwrap_or(text);
                content.push_str(&format!(
                    "\n            <c r=\"{}\"{}><f>{}</f></c>",
                    cell_ref,
                    style_attr,
                    escape(formula)
                ));
            }
        }
    }

    fn rich_runs(&self, rich: &RichString) -> String {
        let mut s = String::new();
        for (text, font) in rich.segments() {
            s.push_str("<r>");
            if let Some(spec) = font.and_then(|h| self.fonts.get(h.0 as usize)) {
                s.push_str(&styles::write_run_properties(spec));
            }
            s.push_str(&text_element(text));
            s.push_str("</r>");
        }
        s
    }

    fn write_drawing<W: Write + Seek>(
        &self,
        zip: &mut zip::ZipWriter<W>,
        sheet_index: usize,
        drawing_index: usize,
        sheet: &SheetData,
    ) -> XlsxResult<()> {
        let placed: Vec<PlacedPicture> = sheet
            .pictures
            .iter()
            .filter_map(|(id, anchor)| {
                self.pictures.get(id.0 as usize).map(|(format, _)| PlacedPicture {
                    picture: *id,
                    format: *format,
                    anchor: *anchor,
                })
            })
            .collect();

        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(
            format!("xl/worksheets/_rels/sheet{}.xml.rels", sheet_index + 1),
            options,
        )?;
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing{}.xml"/>
</Relationships>"#,
            drawing_index
        );
        zip.write_all(rels.as_bytes())?;

        zip.start_file(format!("xl/drawings/drawing{}.xml", drawing_index), options)?;
        let xml = drawing::drawing_xml(
            &placed,
            |col| drawing::column_pixels(sheet.col_widths.get(&col).copied()),
            |row| {
                sheet
                    .rows
                    .get(&row)
                    .and_then(|r| r.height)
                    .unwrap_or(15.0)
            },
        );
        zip.write_all(xml.as_bytes())?;

        zip.start_file(
            format!("xl/drawings/_rels/drawing{}.xml.rels", drawing_index),
            options,
        )?;
        zip.write_all(drawing::drawing_rels_xml(&placed).as_bytes())?;
        Ok(())
    }
}

/// `<t>` element, preserving leading/trailing whitespace and line breaks
fn text_element(text: &str) -> String {
    let preserve = text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains('\n');
    if preserve {
        format!("<t xml:space=\"preserve\">{}</t>", escape(text))
    } else {
        format!("<t>{}</t>", escape(text))
    }
}

/// Header/footer strings use `&` as a control prefix
fn header_footer_text(text: &str) -> String {
    text.replace('&', "&&")
}

impl SheetWriter for XlsxSheetWriter {
    fn create_sheet(&mut self, name: &str) {
        self.sheets.push(SheetData {
            name: name.to_string(),
            ..Default::default()
        });
        self.current = Some(self.sheets.len() - 1);
    }

    fn set_column_width(&mut self, col: u32, width: u32) {
        if let Some(sheet) = self.sheet() {
            sheet.col_widths.insert(col, width);
        }
    }

    fn create_row(&mut self, row: u32, height: f64) {
        if let Some(sheet) = self.sheet() {
            sheet.rows.entry(row).or_default().height = Some(height);
        }
    }

    fn set_cell_value(&mut self, col: u32, row: u32, value: CellValue) {
        if let Some(sheet) = self.sheet() {
            sheet.cell_mut(col, row).value = Some(value);
        }
    }

    fn set_cell_style(&mut self, col: u32, row: u32, style: StyleHandle) {
        if let Some(sheet) = self.sheet() {
            sheet.cell_mut(col, row).style = Some(style);
        }
    }

    fn add_merged_region(&mut self, rect: GridRect) {
        if rect.is_single_cell() {
            return;
        }
        if let Some(sheet) = self.sheet() {
            sheet.merges.push(rect);
        }
    }

    fn register_font(&mut self, font: &FontSpec) -> FontHandle {
        self.fonts.push(font.clone());
        FontHandle(self.fonts.len() as u32 - 1)
    }

    fn register_number_format(&mut self, code: &str) -> NumFmtHandle {
        if let Some(id) = builtin_format_id(code) {
            return NumFmtHandle(id);
        }
        if let Some((id, _)) = self.num_fmts.iter().find(|(_, c)| c == code) {
            return NumFmtHandle(*id);
        }
        let id = FIRST_CUSTOM_FORMAT_ID + self.num_fmts.len() as u32;
        self.num_fmts.push((id, code.to_string()));
        NumFmtHandle(id)
    }

    fn create_style(&mut self, attrs: &StyleAttributes) -> StyleHandle {
        self.styles.push(attrs.clone());
        StyleHandle(self.styles.len() as u32 - 1)
    }

    fn register_picture(&mut self, bytes: Vec<u8>, format: PictureFormat) -> PictureId {
        self.pictures.push((format, bytes));
        PictureId(self.pictures.len() as u32 - 1)
    }

    fn create_anchored_picture(&mut self, picture: PictureId, anchor: ImageAnchor) {
        if let Some(sheet) = self.sheet() {
            sheet.pictures.push((picture, anchor));
        }
    }

    fn set_header_footer(&mut self, header: &str, footer: &str) {
        if let Some(sheet) = self.sheet() {
            sheet.header_footer = Some((header.to_string(), footer.to_string()));
        }
    }

    fn set_print_setup(&mut self, setup: &PrintSetup) {
        if let Some(sheet) = self.sheet() {
            sheet.print_setup = Some(setup.clone());
        }
    }

    fn freeze_panes(&mut self, rows: u32, cols: u32) {
        if let Some(sheet) = self.sheet() {
            sheet.freeze = Some((rows, cols));
        }
    }

    fn set_palette(&mut self, entries: &[Rgb]) {
        self.palette = Some(entries.to_vec());
    }

    fn close_sheet(&mut self) {
        self.current = None;
    }

    fn serialize(&mut self, out: &mut dyn Write) -> WriteResult<()> {
        let bytes = self.to_bytes()?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_element_preserves_whitespace() {
        assert_eq!(text_element("plain"), "<t>plain</t>");
        assert_eq!(
            text_element("a\nb"),
            "<t xml:space=\"preserve\">a\nb</t>"
        );
        assert_eq!(text_element("<&>"), "<t>&lt;&amp;&gt;</t>");
    }

    #[test]
    fn test_number_formats_reuse_ids() {
        let mut writer = XlsxSheetWriter::new();
        assert_eq!(writer.register_number_format("General"), NumFmtHandle(0));
        assert_eq!(writer.register_number_format("0.0%"), NumFmtHandle(164));
        assert_eq!(writer.register_number_format("0.0%"), NumFmtHandle(164));
        assert_eq!(writer.register_number_format("yyyy"), NumFmtHandle(165));
    }

    #[test]
    fn test_empty_workbook_is_rejected() {
        let writer = XlsxSheetWriter::new();
        assert!(matches!(
            writer.to_bytes(),
            Err(XlsxError::InvalidState(_))
        ));
    }

    #[test]
    fn test_commands_without_sheet_are_dropped() {
        let mut writer = XlsxSheetWriter::new();
        writer.set_cell_value(0, 0, CellValue::Number(1.0));
        writer.create_sheet("S");
        writer.close_sheet();
        writer.set_cell_value(0, 0, CellValue::Number(2.0));

        assert_eq!(writer.dropped_commands, 2);
        assert!(writer.sheets[0].rows.is_empty());
    }
}
