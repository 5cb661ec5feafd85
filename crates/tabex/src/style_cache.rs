//! Style canonicalization and caching
//!
//! Every distinct combination of background, borders, font, alignment and
//! number format becomes exactly one native style object. Cells that look
//! the same share a [`StyleHandle`], so the writer sees one `create_style`
//! call per distinct look no matter how many cells use it.

use ahash::AHashMap;
use tabex_core::{
    BorderEdge, BorderLineStyle, FontHandle, FontSpec, NumFmtHandle, SheetWriter,
    StyleAttributes, StyleHandle,
};

use crate::config::StyleLimit;
use crate::diagnostics::{Degradation, Diagnostics};
use crate::layout::{BorderSpec, BoxStyle, CellBackground, LineStyle};
use crate::palette::ColorResolver;

/// Rotation value meaning vertically stacked text
pub const VERTICAL_TEXT: i16 = 255;

/// Counters describing cache behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleStats {
    /// Native styles created
    pub styles: usize,
    /// Fonts registered
    pub fonts: usize,
    /// Number formats registered
    pub formats: usize,
    /// Lookups answered from the cache
    pub hits: usize,
    /// New styles refused by a hard limit
    pub refusals: usize,
}

/// Per-workbook style cache
#[derive(Debug)]
pub struct StyleCache {
    limit: StyleLimit,
    styles: AHashMap<StyleAttributes, StyleHandle>,
    fonts: AHashMap<FontSpec, FontHandle>,
    formats: AHashMap<String, NumFmtHandle>,
    hits: usize,
    refusals: usize,
}

impl Default for StyleCache {
    fn default() -> Self {
        Self::new(StyleLimit::default())
    }
}

impl StyleCache {
    /// Create an empty cache
    pub fn new(limit: StyleLimit) -> Self {
        Self {
            limit,
            styles: AHashMap::new(),
            fonts: AHashMap::new(),
            formats: AHashMap::new(),
            hits: 0,
            refusals: 0,
        }
    }

    /// Get the handle for a cell's look, creating the native style on a miss
    ///
    /// Returns `None` when there is nothing to style or when a hard limit
    /// refuses a new style; the cell then keeps the default appearance.
    pub fn get_or_create(
        &mut self,
        background: Option<&CellBackground>,
        content: Option<&BoxStyle>,
        palette: &mut dyn ColorResolver,
        writer: &mut dyn SheetWriter,
        diagnostics: &mut Diagnostics,
    ) -> Option<StyleHandle> {
        if background.is_none() && content.is_none() {
            return None;
        }
        let attrs = self.build_attributes(background, content, palette, writer);

        if let Some(&handle) = self.styles.get(&attrs) {
            self.hits += 1;
            return Some(handle);
        }

        let threshold = self.limit.threshold();
        if let StyleLimit::Hard(_) = self.limit {
            if self.styles.len() >= threshold {
                self.refusals += 1;
                diagnostics.record(
                    Degradation::StyleLimitReached,
                    format_args!("{threshold} distinct styles in use, new styles are not applied"),
                );
                return None;
            }
        }

        let handle = writer.create_style(&attrs);
        self.styles.insert(attrs, handle);

        if let StyleLimit::Soft(_) = self.limit {
            if self.styles.len() == threshold {
                diagnostics.record(
                    Degradation::StyleLimitReached,
                    format_args!("{threshold} distinct styles created, the target may refuse to open the file"),
                );
            }
        }
        Some(handle)
    }

    /// Handle for a font, registering it on first use
    pub fn font_handle(&mut self, font: FontSpec, writer: &mut dyn SheetWriter) -> FontHandle {
        if let Some(&handle) = self.fonts.get(&font) {
            return handle;
        }
        let handle = writer.register_font(&font);
        self.fonts.insert(font, handle);
        handle
    }

    /// Handle for a number format code, registering it on first use
    pub fn format_handle(&mut self, code: &str, writer: &mut dyn SheetWriter) -> NumFmtHandle {
        if let Some(&handle) = self.formats.get(code) {
            return handle;
        }
        let handle = writer.register_number_format(code);
        self.formats.insert(code.to_string(), handle);
        handle
    }

    /// Current counters
    pub fn stats(&self) -> StyleStats {
        StyleStats {
            styles: self.styles.len(),
            fonts: self.fonts.len(),
            formats: self.formats.len(),
            hits: self.hits,
            refusals: self.refusals,
        }
    }

    fn build_attributes(
        &mut self,
        background: Option<&CellBackground>,
        content: Option<&BoxStyle>,
        palette: &mut dyn ColorResolver,
        writer: &mut dyn SheetWriter,
    ) -> StyleAttributes {
        let mut attrs = StyleAttributes::new();

        if let Some(background) = background {
            attrs.fill = background.fill.map(|c| palette.resolve(c));
            let mut edge = |spec: &Option<BorderSpec>| {
                spec.and_then(|spec| {
                    let style = border_weight(spec.line, spec.width);
                    (style != BorderLineStyle::None)
                        .then(|| BorderEdge::new(style, palette.resolve(spec.color)))
                })
            };
            attrs.top = edge(&background.top);
            attrs.left = edge(&background.left);
            attrs.bottom = edge(&background.bottom);
            attrs.right = edge(&background.right);
        }

        match content {
            Some(style) => {
                if !style.font.is_empty() {
                    let spec = style.font.to_spec(palette);
                    attrs.font = Some(self.font_handle(spec, writer));
                }
                attrs.horizontal = style.horizontal_align;
                attrs.vertical = style.vertical_align;
                attrs.number_format = style
                    .number_format
                    .as_deref()
                    .filter(|code| !code.is_empty())
                    .map(|code| self.format_handle(code, writer));

                let rotation = style.rotation.map(normalize_rotation).filter(|&r| r != 0);
                attrs.rotation = rotation;
                attrs.wrap_text = rotation.is_none()
                    && style.wrap_override.or(style.text_wrap).unwrap_or(true);
            }
            None => attrs.wrap_text = true,
        }
        attrs
    }
}

/// Map a layout line onto a discrete border style
///
/// Solid lines are bucketed by width in points; patterned lines keep their
/// pattern whatever the width.
pub fn border_weight(line: LineStyle, width: f64) -> BorderLineStyle {
    match line {
        LineStyle::None => BorderLineStyle::None,
        LineStyle::Solid => {
            if width <= 0.0 || width.is_nan() {
                BorderLineStyle::None
            } else if width < 0.75 {
                BorderLineStyle::Hair
            } else if width < 1.5 {
                BorderLineStyle::Thin
            } else if width < 2.5 {
                BorderLineStyle::Medium
            } else {
                BorderLineStyle::Thick
            }
        }
        LineStyle::Dashed => BorderLineStyle::Dashed,
        LineStyle::Dotted => BorderLineStyle::Dotted,
        LineStyle::Double => BorderLineStyle::Double,
        LineStyle::DashDot => BorderLineStyle::DashDot,
        LineStyle::DashDotDot => BorderLineStyle::DashDotDot,
    }
}

/// Fold any angle into the -90..=90 range the format can store
pub fn normalize_rotation(degrees: i16) -> i16 {
    if degrees == VERTICAL_TEXT {
        return VERTICAL_TEXT;
    }
    let mut r = degrees.rem_euclid(360);
    if r > 180 {
        r -= 360;
    }
    if r > 90 {
        r - 180
    } else if r < -90 {
        r + 180
    } else {
        r
    }
}
