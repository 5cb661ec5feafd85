//! Cell value types

use crate::FontHandle;
use chrono::{NaiveDate, NaiveDateTime};

/// A value handed to a writer for a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Cell exists (it may carry a style) but holds no value
    Blank,
    /// Plain string
    String(String),
    /// String with per-range fonts
    Rich(RichString),
    /// Numeric value
    Number(f64),
    /// Date and time, stored as a serial number by the format
    Date(NaiveDateTime),
    /// Boolean value
    Boolean(bool),
    /// Formula text without the leading `=`
    Formula(String),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Create a new formula value
    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula(text.into())
    }

    /// Check if the value is blank
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Get the text of a string or rich string value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            CellValue::Rich(r) => Some(r.text()),
            _ => None,
        }
    }
}

/// Start of a font run inside a [`RichString`]
///
/// `offset` counts characters, not bytes. A run extends to the next run's
/// offset, or to the end of the text for the last run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RichTextRun {
    /// Character offset where the run starts
    pub offset: usize,
    /// Font applied to the run
    pub font: FontHandle,
}

impl RichTextRun {
    /// Create a new run
    pub fn new(offset: usize, font: FontHandle) -> Self {
        Self { offset, font }
    }
}

/// Text with font runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichString {
    text: String,
    runs: Vec<RichTextRun>,
}

impl RichString {
    /// Build a rich string from text and runs
    ///
    /// Runs are sorted, runs at or past the end of the text are dropped and
    /// adjacent runs with the same font are coalesced.
    pub fn new<S: Into<String>>(text: S, mut runs: Vec<RichTextRun>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        runs.sort_by_key(|r| r.offset);
        runs.retain(|r| r.offset < len);
        runs.dedup_by(|next, prev| next.font == prev.font || next.offset == prev.offset);
        Self { text, runs }
    }

    /// The full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The font runs, ordered by offset
    pub fn runs(&self) -> &[RichTextRun] {
        &self.runs
    }

    /// Iterate over `(text, font)` pieces, one per run
    ///
    /// Text before the first run (if the first run does not start at zero) is
    /// yielded with `None`.
    pub fn segments(&self) -> Vec<(&str, Option<FontHandle>)> {
        let byte_at = |char_offset: usize| {
            self.text
                .char_indices()
                .nth(char_offset)
                .map(|(i, _)| i)
                .unwrap_or(self.text.len())
        };

        let mut out = Vec::with_capacity(self.runs.len() + 1);
        let first = self.runs.first().map(|r| r.offset).unwrap_or(usize::MAX);
        if first > 0 {
            let end = byte_at(first);
            if end > 0 {
                out.push((&self.text[..end], None));
            }
        }
        for (i, run) in self.runs.iter().enumerate() {
            let start = byte_at(run.offset);
            let end = self
                .runs
                .get(i + 1)
                .map(|next| byte_at(next.offset))
                .unwrap_or(self.text.len());
            out.push((&self.text[start..end], Some(run.font)));
        }
        out
    }
}

/// Convert a date to the format's serial day number
///
/// Day 1 is 1900-01-01 and the fictitious 1900-02-29 is honored, so the epoch
/// is 1899-12-30 for every date after February 1900. The time of day is the
/// fractional part.
pub fn date_to_serial(dt: NaiveDateTime) -> f64 {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return 0.0;
    };
    let delta = dt - epoch;
    let mut days = delta.num_seconds() as f64 / 86_400.0;
    if days < 61.0 {
        // Dates before the phantom leap day sit one lower
        days -= 1.0;
    }
    days
}
