//! Cell styling types
//!
//! This module contains the canonical style description a writer materializes:
//! - [`StyleAttributes`] - Complete cell style, compared and hashed structurally
//! - [`FontSpec`] - Font settings
//! - [`BorderEdge`] - One border edge
//! - [`HorizontalAlignment`] / [`VerticalAlignment`] - Text alignment
//!
//! Fonts and number formats are referenced through handles issued by the
//! writer, so two styles sharing a font compare equal without comparing the
//! font itself.

mod alignment;
mod border;
mod font;
pub mod number_format;

pub use alignment::{HorizontalAlignment, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle};
pub use font::{FontSpec, Underline};

/// Opaque reference to a style materialized by a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleHandle(pub u32);

/// Opaque reference to a font registered with a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontHandle(pub u32);

/// Reference to a number format registered with a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumFmtHandle(pub u32);

/// Complete, immutable description of a cell style
///
/// Two instances are equal iff every field is equal, including color
/// references. That makes it usable directly as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StyleAttributes {
    /// Top border
    pub top: Option<BorderEdge>,
    /// Left border
    pub left: Option<BorderEdge>,
    /// Bottom border
    pub bottom: Option<BorderEdge>,
    /// Right border
    pub right: Option<BorderEdge>,
    /// Solid background fill
    pub fill: Option<crate::ColorRef>,
    /// Horizontal alignment
    pub horizontal: HorizontalAlignment,
    /// Vertical alignment
    pub vertical: VerticalAlignment,
    /// Wrap text
    pub wrap_text: bool,
    /// Font
    pub font: Option<FontHandle>,
    /// Number format
    pub number_format: Option<NumFmtHandle>,
    /// Text rotation in degrees (-90 to 90, or 255 for vertical)
    pub rotation: Option<i16>,
}

impl StyleAttributes {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any border edge is set
    pub fn has_border(&self) -> bool {
        self.top.is_some() || self.left.is_some() || self.bottom.is_some() || self.right.is_some()
    }

    /// Check if alignment differs from the format default
    pub fn has_alignment(&self) -> bool {
        self.horizontal != HorizontalAlignment::default()
            || self.vertical != VerticalAlignment::default()
            || self.wrap_text
            || self.rotation.is_some()
    }
}
