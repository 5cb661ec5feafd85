//! Degradation tracking
//!
//! Recoverable conditions never abort an export. Each kind is logged once per
//! document, the first time it happens, and every occurrence is counted so the
//! final [`ExportReport`](crate::session::ExportReport) can summarize them.

use std::fmt;

use ahash::AHashMap;

/// A recoverable, lossy condition hit during export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Degradation {
    /// The legacy palette ran out of slots; colors now map to the nearest entry
    PaletteExhausted,
    /// The configured distinct-style ceiling was reached
    StyleLimitReached,
    /// Cell text exceeded the per-cell character ceiling
    TextTruncated,
    /// An image could not be decoded, clipped or re-encoded
    ImageSkipped,
    /// Header and footer together were too long to apply
    HeaderFooterTooLong,
    /// A hyperlink formula would exceed the formula ceiling
    HyperlinkTooLong,
    /// A raw formula exceeded the formula ceiling
    FormulaTooLong,
    /// The requested sheet name was not usable
    InvalidSheetName,
    /// A content box overlapped cells claimed by another box and was left out
    OverlappingContent,
}

impl Degradation {
    /// Short, stable name
    pub fn name(&self) -> &'static str {
        match self {
            Degradation::PaletteExhausted => "palette-exhausted",
            Degradation::StyleLimitReached => "style-limit-reached",
            Degradation::TextTruncated => "text-truncated",
            Degradation::ImageSkipped => "image-skipped",
            Degradation::HeaderFooterTooLong => "header-footer-too-long",
            Degradation::HyperlinkTooLong => "hyperlink-too-long",
            Degradation::FormulaTooLong => "formula-too-long",
            Degradation::InvalidSheetName => "invalid-sheet-name",
            Degradation::OverlappingContent => "overlapping-content",
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-document degradation log
#[derive(Debug, Default)]
pub struct Diagnostics {
    counts: AHashMap<Degradation, usize>,
}

impl Diagnostics {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence; the first one of each kind is logged
    pub fn record(&mut self, kind: Degradation, detail: impl fmt::Display) {
        let count = self.counts.entry(kind).or_insert(0);
        if *count == 0 {
            log::warn!("{kind}: {detail} (further occurrences are counted, not logged)");
        }
        *count += 1;
    }

    /// Add occurrences that were already logged elsewhere
    pub fn absorb(&mut self, kind: Degradation, occurrences: usize) {
        if occurrences > 0 {
            *self.counts.entry(kind).or_insert(0) += occurrences;
        }
    }

    /// Number of occurrences of a kind
    pub fn count(&self, kind: Degradation) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Whether nothing was recorded
    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }

    /// All recorded kinds with their counts, in a stable order
    pub fn summary(&self) -> Vec<(Degradation, usize)> {
        let mut out: Vec<_> = self.counts.iter().map(|(k, v)| (*k, *v)).collect();
        out.sort();
        out
    }
}
