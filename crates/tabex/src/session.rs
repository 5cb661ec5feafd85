//! Export sessions
//!
//! An [`ExportSession`] produces one workbook. It owns the writer together
//! with the state that must be shared by every sheet of that workbook: the
//! color palette, the style cache, the degradation log and the set of sheet
//! names already taken.

use std::fmt;
use std::io::Write;

use tabex_core::SheetWriter;

use crate::config::ExportConfig;
use crate::diagnostics::{Degradation, Diagnostics};
use crate::error::Result;
use crate::grid_mapper::{SheetExporter, SheetNames};
use crate::image::ImageEmbedder;
use crate::layout::SheetLayout;
use crate::palette::{ColorPalette, ColorResolver};
use crate::style_cache::{StyleCache, StyleStats};

/// Exports layouts into one workbook
///
/// ```rust
/// use tabex::prelude::*;
///
/// let mut layout = GridLayout::new(&[60.0], &[15.0]).with_name("Summary");
/// layout.place(GridRect::single(0, 0), ContentBox::text(Bounds::default(), "Total"));
///
/// let mut session = ExportSession::new(RecordingWriter::new(), ExportConfig::default());
/// session.export_sheet(&layout).unwrap();
///
/// let mut out = Vec::new();
/// let report = session.finish(&mut out).unwrap();
/// assert_eq!(report.sheets, vec!["Summary".to_string()]);
/// ```
pub struct ExportSession<W: SheetWriter> {
    pub(crate) writer: W,
    pub(crate) config: ExportConfig,
    pub(crate) palette: ColorPalette,
    pub(crate) styles: StyleCache,
    pub(crate) embedder: ImageEmbedder,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) sheet_names: SheetNames,
    sheets: Vec<String>,
}

impl<W: SheetWriter> ExportSession<W> {
    /// Start a workbook
    pub fn new(writer: W, config: ExportConfig) -> Self {
        log::debug!(
            "starting {:?} export, style limit {}",
            config.variant,
            config.style_limit
        );
        Self {
            writer,
            palette: ColorPalette::for_variant(config.variant, config.color_strategy),
            styles: StyleCache::new(config.style_limit),
            embedder: ImageEmbedder::from_config(&config),
            diagnostics: Diagnostics::new(),
            sheet_names: SheetNames::default(),
            sheets: Vec::new(),
            config,
        }
    }

    /// Open a sheet for a layout; rows are exported through the returned handle
    pub fn begin_sheet<L>(&mut self, layout: &L) -> SheetExporter<'_, W>
    where
        L: SheetLayout + ?Sized,
    {
        SheetExporter::open(self, layout)
    }

    /// Export a whole layout as one sheet
    pub fn export_sheet<L>(&mut self, layout: &L) -> Result<String>
    where
        L: SheetLayout + ?Sized,
    {
        let mut sheet = self.begin_sheet(layout);
        sheet.export_all(layout)?;
        let name = sheet.name().to_string();
        sheet.finish_sheet();
        Ok(name)
    }

    /// Settings in effect
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Degradations recorded so far
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Style cache counters so far
    pub fn style_stats(&self) -> StyleStats {
        self.styles.stats()
    }

    /// The underlying writer
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub(crate) fn sheet_opened(&mut self, name: &str) {
        self.sheets.push(name.to_string());
    }

    /// Hand the palette to the writer, serialize, and report
    pub fn finish(mut self, out: &mut dyn Write) -> Result<ExportReport> {
        if let Some(entries) = self.palette.entries() {
            self.writer.set_palette(entries);
        }
        self.diagnostics
            .absorb(Degradation::PaletteExhausted, self.palette.fallback_count());

        self.writer.serialize(out)?;

        let report = ExportReport {
            sheets: self.sheets,
            styles: self.styles.stats(),
            palette_slots: self.palette.allocated(),
            degradations: self.diagnostics.summary(),
        };
        log::debug!("export finished: {report}");
        Ok(report)
    }
}

/// Summary of a finished export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Sheet names in creation order
    pub sheets: Vec<String>,
    pub styles: StyleStats,
    /// Legacy palette slots rewritten, `None` for the extended variant
    pub palette_slots: Option<usize>,
    pub degradations: Vec<(Degradation, usize)>,
}

impl ExportReport {
    /// Whether the export was lossless
    pub fn is_clean(&self) -> bool {
        self.degradations.is_empty()
    }

    /// Occurrences of one degradation kind
    pub fn count(&self, kind: Degradation) -> usize {
        self.degradations
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, n)| *n)
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sheet(s), {} style(s), {} font(s), {} format(s), {} cache hit(s)",
            self.sheets.len(),
            self.styles.styles,
            self.styles.fonts,
            self.styles.formats,
            self.styles.hits
        )?;
        if let Some(slots) = self.palette_slots {
            write!(f, ", {slots} palette slot(s)")?;
        }
        for (kind, count) in &self.degradations {
            write!(f, ", {kind} x{count}")?;
        }
        Ok(())
    }
}
