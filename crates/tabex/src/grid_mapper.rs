//! Grid mapping and sheet writing
//!
//! [`SheetExporter`] walks a layout row by row and turns each cell into
//! writer commands. A cell is either empty, the origin of a content box, or
//! spanned by a box whose origin lies elsewhere. Only origins produce values;
//! spanned cells are styled when their origin is written, so the borders and
//! fill of a merged region stay consistent.

use std::borrow::Cow;

use ahash::AHashSet;
use tabex_core::style::number_format::DEFAULT_DATE_FORMAT;
use tabex_core::{
    CellValue, GridRect, RichString, RichTextRun, SheetWriter, MAX_FORMULA_LEN,
    MAX_HEADER_FOOTER_LEN, MAX_SHEET_NAME_LEN, SHEET_NAME_FORBIDDEN,
};

use crate::diagnostics::{Degradation, Diagnostics};
use crate::error::{ExportError, Result};
use crate::image::{ImageFlags, PlacementRect};
use crate::layout::{
    to_points, BoxContent, BoxStyle, CellBackground, ContentBox, GridGeometry, ImageData,
    RawValue, SheetLayout,
};
use crate::rich_text::{self, Extracted};
use crate::session::ExportSession;

/// How a cell relates to the content boxes of the layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRole<'a> {
    Empty,
    /// The cell holding the top-left corner of a box
    Origin(&'a ContentBox, GridRect),
    /// A cell covered by a box whose origin is elsewhere
    Spanned(GridRect),
}

/// Classify one cell
pub fn classify<L>(layout: &L, col: u32, row: u32) -> Result<CellRole<'_>>
where
    L: SheetLayout + ?Sized,
{
    let Some(content) = layout.content_at(col, row) else {
        return Ok(CellRole::Empty);
    };
    if !content.finished {
        return Err(ExportError::UnfinishedContent { col, row });
    }
    let span = layout.resolve(&content.bounds);
    if span.x1 == col && span.y1 == row {
        Ok(CellRole::Origin(content, span))
    } else {
        Ok(CellRole::Spanned(span))
    }
}

/// Check a requested sheet name against the format rules
pub fn is_valid_sheet_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=MAX_SHEET_NAME_LEN).contains(&len)
        && !name.chars().any(|c| SHEET_NAME_FORBIDDEN.contains(&c))
}

/// Picks sheet names that are valid and unique within one workbook
#[derive(Debug, Default)]
pub(crate) struct SheetNames {
    used: AHashSet<String>,
}

impl SheetNames {
    pub(crate) fn assign(&mut self, requested: Option<&str>, diagnostics: &mut Diagnostics) -> String {
        let ordinal = self.used.len() + 1;
        let base = match requested {
            Some(name) if is_valid_sheet_name(name) => name.to_string(),
            Some(name) => {
                diagnostics.record(
                    Degradation::InvalidSheetName,
                    format_args!("'{name}' is not a valid sheet name, using Sheet{ordinal}"),
                );
                format!("Sheet{ordinal}")
            }
            None => format!("Sheet{ordinal}"),
        };

        let mut name = base.clone();
        let mut n = 2;
        while self.used.contains(&name.to_lowercase()) {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            name = format!("{}{suffix}", rich_text::truncate(&base, keep));
            n += 1;
        }
        self.used.insert(name.to_lowercase());
        name
    }
}

/// Writes one sheet of a session
///
/// Created by [`ExportSession::begin_sheet`]. Rows are exported in
/// increasing ranges; the sheet is closed by [`finish_sheet`] or on drop.
///
/// [`finish_sheet`]: SheetExporter::finish_sheet
pub struct SheetExporter<'s, W: SheetWriter> {
    session: &'s mut ExportSession<W>,
    name: String,
    next_row: u32,
    open: bool,
}

impl<'s, W: SheetWriter> SheetExporter<'s, W> {
    pub(crate) fn open<L>(session: &'s mut ExportSession<W>, layout: &L) -> Self
    where
        L: SheetLayout + ?Sized,
    {
        let s = &mut *session;
        let name = s.sheet_names.assign(layout.sheet_name(), &mut s.diagnostics);
        s.writer.create_sheet(&name);
        s.sheet_opened(&name);
        log::debug!("opened sheet '{name}'");

        let header = layout.header().unwrap_or("");
        let footer = layout.footer().unwrap_or("");
        if !header.is_empty() || !footer.is_empty() {
            let combined = header.chars().count() + footer.chars().count();
            if combined < MAX_HEADER_FOOTER_LEN {
                s.writer.set_header_footer(header, footer);
            } else {
                s.diagnostics.record(
                    Degradation::HeaderFooterTooLong,
                    format_args!("header and footer of '{name}' have {combined} characters"),
                );
            }
        }

        let overlapping = layout.overlapping_boxes();
        if overlapping > 0 {
            s.diagnostics.record(
                Degradation::OverlappingContent,
                format_args!("{overlapping} overlapping box(es) left out of '{name}'"),
            );
            s.diagnostics
                .absorb(Degradation::OverlappingContent, overlapping - 1);
        }

        s.writer.set_print_setup(&s.config.print);
        if s.config.freeze_rows > 0 || s.config.freeze_columns > 0 {
            s.writer
                .freeze_panes(s.config.freeze_rows, s.config.freeze_columns);
        }

        let scale = s.config.cell_width_scale as f64;
        for col in 0..layout.column_count() {
            let width = (to_points(layout.column_width(col)) * scale).round();
            s.writer.set_column_width(col, width.max(0.0) as u32);
        }

        Self {
            session,
            name,
            next_row: 0,
            open: true,
        }
    }

    /// Name the sheet was created with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First row not yet exported
    pub fn next_row(&self) -> u32 {
        self.next_row
    }

    /// Export rows `start..end`
    ///
    /// Rows already exported and rows the layout does not have yet are
    /// skipped.
    pub fn export_rows<L>(&mut self, layout: &L, start: u32, end: u32) -> Result<()>
    where
        L: SheetLayout + ?Sized,
    {
        let start = start.max(self.next_row);
        let end = end.min(layout.row_count());
        for row in start..end {
            self.session
                .writer
                .create_row(row, to_points(layout.row_height(row)));
            for col in 0..layout.column_count() {
                match classify(layout, col, row)? {
                    CellRole::Empty => self.write_background(layout, col, row),
                    CellRole::Origin(content, span) => self.write_origin(layout, content, span),
                    CellRole::Spanned(_) => {}
                }
            }
        }
        self.next_row = self.next_row.max(end);
        Ok(())
    }

    /// Export every remaining row
    pub fn export_all<L>(&mut self, layout: &L) -> Result<()>
    where
        L: SheetLayout + ?Sized,
    {
        self.export_rows(layout, self.next_row, layout.row_count())
    }

    /// Close the sheet
    pub fn finish_sheet(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.session.writer.close_sheet();
            log::debug!("closed sheet '{}' after {} rows", self.name, self.next_row);
        }
    }

    fn write_background<L>(&mut self, layout: &L, col: u32, row: u32)
    where
        L: SheetLayout + ?Sized,
    {
        let Some(background) = layout.background_at(col, row).filter(|b| !b.is_empty()) else {
            return;
        };
        let s = &mut *self.session;
        if let Some(handle) = s.styles.get_or_create(
            Some(background),
            None,
            &mut s.palette,
            &mut s.writer,
            &mut s.diagnostics,
        ) {
            s.writer.set_cell_style(col, row, handle);
        }
    }

    /// Style every cell of a span except the origin
    ///
    /// Covered cells carry the origin's content style. The origin background
    /// wins; a covered cell's own background only adds attributes the origin
    /// leaves unset, so a uniform span shares the origin's handle.
    fn write_covered<L>(
        &mut self,
        layout: &L,
        span: &GridRect,
        origin: &CellBackground,
        content: Option<&BoxStyle>,
    ) where
        L: SheetLayout + ?Sized,
    {
        let s = &mut *self.session;
        for cell in span.cells().skip(1) {
            let own = layout
                .background_at(cell.col, cell.row)
                .copied()
                .unwrap_or_default();
            let merged = origin.overlay(&own);
            let background = (!merged.is_empty()).then_some(&merged);
            if let Some(handle) = s.styles.get_or_create(
                background,
                content,
                &mut s.palette,
                &mut s.writer,
                &mut s.diagnostics,
            ) {
                s.writer.set_cell_style(cell.col, cell.row, handle);
            }
        }
    }

    fn write_origin<L>(&mut self, layout: &L, content: &ContentBox, span: GridRect)
    where
        L: SheetLayout + ?Sized,
    {
        let col = span.x1;
        let row = span.y1;
        let origin_bg = layout.background_at(col, row).copied().unwrap_or_default();

        if let BoxContent::Raw(RawValue::Image(image) | RawValue::Drawable(image)) = &content.content
        {
            self.write_image(layout, content, image, span, &origin_bg);
            return;
        }

        let s = &mut *self.session;
        let extracted = rich_text::extract(content, &mut s.palette, &mut s.diagnostics);

        let mut style = Cow::Borrowed(&content.style);
        if matches!(extracted, Extracted::Raw(RawValue::Date(_))) && style.number_format.is_none() {
            style.to_mut().number_format = Some(DEFAULT_DATE_FORMAT.to_string());
        }

        let mut value = match extracted {
            Extracted::Empty => CellValue::Blank,
            Extracted::Plain(text) => CellValue::String(text),
            Extracted::Rich(styled) => {
                let runs = styled
                    .runs
                    .into_iter()
                    .map(|run| RichTextRun::new(run.offset, s.styles.font_handle(run.font, &mut s.writer)))
                    .collect();
                CellValue::Rich(RichString::new(styled.text, runs))
            }
            Extracted::Raw(RawValue::Number(n)) => CellValue::Number(n),
            Extracted::Raw(RawValue::Date(d)) => CellValue::Date(d),
            Extracted::Raw(RawValue::Boolean(b)) => CellValue::Boolean(b),
            Extracted::Raw(RawValue::Text(t)) => CellValue::String(t),
            Extracted::Raw(RawValue::Image(_) | RawValue::Drawable(_)) => CellValue::Blank,
        };

        if let Some(target) = style.href.as_deref().filter(|t| !t.is_empty()) {
            let text = display_text(&value).unwrap_or_else(|| target.to_string());
            let formula = hyperlink_formula(target, &text);
            if formula.chars().count() < MAX_FORMULA_LEN {
                value = CellValue::Formula(formula);
            } else {
                s.diagnostics.record(
                    Degradation::HyperlinkTooLong,
                    format_args!("link at {} written as text", span.origin().to_a1_string()),
                );
                if value.is_blank() {
                    value = CellValue::String(text);
                }
            }
        } else if let Some(formula) = style.formula.as_deref().filter(|f| !f.is_empty()) {
            let formula = formula.strip_prefix('=').unwrap_or(formula);
            if formula.chars().count() < MAX_FORMULA_LEN {
                value = CellValue::formula(formula);
            } else {
                s.diagnostics.record(
                    Degradation::FormulaTooLong,
                    format_args!("formula at {} written as its value", span.origin().to_a1_string()),
                );
            }
        }

        let background = (!origin_bg.is_empty()).then_some(&origin_bg);
        if let Some(handle) = s.styles.get_or_create(
            background,
            Some(style.as_ref()),
            &mut s.palette,
            &mut s.writer,
            &mut s.diagnostics,
        ) {
            s.writer.set_cell_style(col, row, handle);
        }
        if !value.is_blank() {
            s.writer.set_cell_value(col, row, value);
        }

        if !span.is_single_cell() {
            s.writer.add_merged_region(span);
            self.write_covered(layout, &span, &origin_bg, Some(style.as_ref()));
        }
    }

    fn write_image<L>(
        &mut self,
        layout: &L,
        content: &ContentBox,
        image: &ImageData,
        span: GridRect,
        origin_bg: &CellBackground,
    ) where
        L: SheetLayout + ?Sized,
    {
        {
            let s = &mut *self.session;
            if !origin_bg.is_empty() {
                if let Some(handle) = s.styles.get_or_create(
                    Some(origin_bg),
                    None,
                    &mut s.palette,
                    &mut s.writer,
                    &mut s.diagnostics,
                ) {
                    s.writer.set_cell_style(span.x1, span.y1, handle);
                }
            }
        }
        if !span.is_single_cell() {
            self.write_covered(layout, &span, origin_bg, None);
        }

        let s = &mut *self.session;
        let footprint = PlacementRect::from_bounds(&layout.cell_bounds(&span));
        let flags = ImageFlags::from(&content.style);
        if let Some(embedded) = s
            .embedder
            .embed(image, &footprint, &flags, layout, &mut s.diagnostics)
        {
            let id = s.writer.register_picture(embedded.bytes, embedded.format);
            s.writer.create_anchored_picture(id, embedded.anchor);
        }
    }
}

impl<W: SheetWriter> Drop for SheetExporter<'_, W> {
    fn drop(&mut self) {
        self.close();
    }
}

fn display_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Blank => None,
        CellValue::String(s) => Some(s.clone()),
        CellValue::Rich(r) => Some(r.text().to_string()),
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Date(d) => Some(d.to_string()),
        CellValue::Boolean(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        CellValue::Formula(f) => Some(f.clone()),
    }
}

/// `HYPERLINK("target","text")` with embedded quotes doubled
pub fn hyperlink_formula(target: &str, text: &str) -> String {
    format!(
        "HYPERLINK(\"{}\",\"{}\")",
        target.replace('"', "\"\""),
        text.replace('"', "\"\"")
    )
}
