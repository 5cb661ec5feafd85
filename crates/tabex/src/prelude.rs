//! Prelude module - common imports for tabex users
//!
//! ```rust
//! use tabex::prelude::*;
//! ```

pub use crate::{
    // Configuration
    ColorStrategy,
    Degradation,
    ExportConfig,
    // Errors
    ExportError,
    ExportReport,
    // Session types
    ExportSession,
    FormatVariant,
    GridLayout,
    RecordingWriter,
    Result,
    SheetExporter,
    SheetLayout,
    SheetWriter,
    StyleLimit,
    XlsxSheetWriter,
};

pub use crate::layout::{
    BorderSpec, Bounds, BoxContent, BoxStyle, CellBackground, ContentBox, FontOverride,
    ImageData, InlineBox, LineStyle, RawValue, TextChunk,
};

pub use tabex_core::{GridRect, HorizontalAlignment, Rgb, VerticalAlignment};
