//! # tabex
//!
//! Exports finished page layouts to grid-based spreadsheets.
//!
//! A layout engine produces positioned content boxes; tabex maps them onto
//! spreadsheet cells and drives a [`SheetWriter`] while respecting the hard
//! limits of the target format: a 64-entry palette in the legacy variant, a
//! ceiling on distinct styles, per-cell text and formula lengths, and sheet
//! name rules. Anything lossy is recorded as a [`Degradation`] and reported,
//! never raised as an error.
//!
//! ## Pipeline
//!
//! - [`palette`] - Maps layout colors to format color references
//! - [`style_cache`] - Deduplicates cell styles into reusable handles
//! - [`rich_text`] - Splits styled inline text into font runs
//! - [`image`] - Scales, clips and anchors pictures
//! - [`grid_mapper`] - Walks the grid and writes values, styles and merges
//! - [`session`] - Ties the above together for one workbook
//!
//! ## Example
//!
//! ```rust
//! use tabex::prelude::*;
//!
//! let mut layout = GridLayout::new(&[80.0, 80.0], &[20.0]).with_name("Report");
//! layout.place(
//!     GridRect::new(0, 0, 1, 0),
//!     ContentBox::text(Bounds::default(), "Quarterly sales"),
//! );
//! layout.fill_background(GridRect::new(0, 0, 1, 0), CellBackground::filled(Rgb::new(255, 255, 153)));
//!
//! let mut out = Vec::new();
//! let report = tabex::export_xlsx([&layout], ExportConfig::default(), &mut out).unwrap();
//!
//! assert_eq!(report.sheets, vec!["Report".to_string()]);
//! assert!(out.starts_with(b"PK"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grid_mapper;
pub mod image;
pub mod layout;
pub mod palette;
pub mod prelude;
pub mod rich_text;
pub mod session;
pub mod style_cache;

use std::io::Write;
use std::path::Path;

pub use config::{ColorStrategy, ExportConfig, FormatVariant, StyleLimit};
pub use diagnostics::{Degradation, Diagnostics};
pub use error::{ConfigError, ExportError, Result};
pub use grid_mapper::SheetExporter;
pub use layout::{GridLayout, SheetLayout};
pub use session::{ExportReport, ExportSession};

pub use tabex_core::{RecordingWriter, SheetWriter};
pub use tabex_xlsx::XlsxSheetWriter;

/// Export layouts as the sheets of one XLSX workbook
pub fn export_xlsx<'a, I, L>(layouts: I, config: ExportConfig, out: &mut dyn Write) -> Result<ExportReport>
where
    I: IntoIterator<Item = &'a L>,
    L: SheetLayout + ?Sized + 'a,
{
    let mut session = ExportSession::new(XlsxSheetWriter::new(), config);
    for layout in layouts {
        session.export_sheet(layout)?;
    }
    session.finish(out)
}

/// Export layouts to an XLSX file
pub fn export_xlsx_file<'a, I, L, P>(layouts: I, config: ExportConfig, path: P) -> Result<ExportReport>
where
    I: IntoIterator<Item = &'a L>,
    L: SheetLayout + ?Sized + 'a,
    P: AsRef<Path>,
{
    let mut file = std::io::BufWriter::new(
        std::fs::File::create(path).map_err(|e| ExportError::Write(e.into()))?,
    );
    let report = export_xlsx(layouts, config, &mut file)?;
    file.flush().map_err(|e| ExportError::Write(e.into()))?;
    Ok(report)
}
