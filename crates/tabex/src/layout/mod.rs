//! Layout input model
//!
//! A finished layout is a set of positioned content boxes over a grid of
//! column and row boundaries. Coordinates are integer micro-points
//! ([`MICRO_POINTS_PER_POINT`] per point) so boundary comparisons are exact.
//!
//! [`SheetLayout`] is what the grid mapper walks. [`GridGeometry`] is the
//! narrower view the image embedder needs to turn a placement rectangle back
//! into grid cells; every `SheetLayout` gets it for free.

mod grid_layout;

pub use grid_layout::GridLayout;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tabex_core::{
    FontSpec, GridRect, HorizontalAlignment, Rgb, Underline, VerticalAlignment,
    MICRO_POINTS_PER_POINT,
};

use crate::palette::ColorResolver;

/// Convert points to micro-points
pub fn to_micro(points: f64) -> i64 {
    (points * MICRO_POINTS_PER_POINT as f64).round() as i64
}

/// Convert micro-points to points
pub fn to_points(micro: i64) -> f64 {
    micro as f64 / MICRO_POINTS_PER_POINT as f64
}

/// Axis-aligned rectangle in micro-points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Bounds {
    /// Create bounds from micro-point values
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create bounds from point values
    pub fn from_points(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(to_micro(x), to_micro(y), to_micro(width), to_micro(height))
    }

    /// Exclusive right edge
    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }

    /// Whether the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A layout whose boxes have been mapped onto a grid
pub trait SheetLayout {
    /// Requested sheet name, if any
    fn sheet_name(&self) -> Option<&str>;

    /// Page header text
    fn header(&self) -> Option<&str>;

    /// Page footer text
    fn footer(&self) -> Option<&str>;

    /// Number of grid columns
    fn column_count(&self) -> u32;

    /// Number of grid rows available so far
    fn row_count(&self) -> u32;

    /// Width of a column in micro-points
    fn column_width(&self, col: u32) -> i64;

    /// Height of a row in micro-points
    fn row_height(&self, row: u32) -> i64;

    /// The content box covering a cell, if any
    ///
    /// For a box spanning several cells every covered cell returns the same
    /// box; the cell holding the box origin is the one that gets its value.
    fn content_at(&self, col: u32, row: u32) -> Option<&ContentBox>;

    /// Background painted on a single cell
    fn background_at(&self, col: u32, row: u32) -> Option<&CellBackground>;

    /// Left edge of a column in micro-points
    ///
    /// The default adds up the widths before it. Layouts that keep running
    /// totals override it so grid lookups stay logarithmic.
    fn column_start(&self, col: u32) -> i64 {
        (0..col.min(self.column_count()))
            .map(|c| self.column_width(c))
            .sum()
    }

    /// Top edge of a row in micro-points
    fn row_start(&self, row: u32) -> i64 {
        (0..row.min(self.row_count())).map(|r| self.row_height(r)).sum()
    }

    /// Boxes left out because they overlapped cells claimed by another box
    fn overlapping_boxes(&self) -> usize {
        0
    }

    /// Grid rectangle covered by a box
    fn resolve(&self, bounds: &Bounds) -> GridRect {
        self.locate(bounds)
    }
}

/// Grid boundary lookups
pub trait GridGeometry {
    /// Left edge of a column; `column_limit()` gives the right edge of the grid
    fn column_edge(&self, col: u32) -> i64;

    /// Top edge of a row; `row_limit()` gives the bottom edge of the grid
    fn row_edge(&self, row: u32) -> i64;

    /// Number of columns
    fn column_limit(&self) -> u32;

    /// Number of rows
    fn row_limit(&self) -> u32;

    /// Column containing a horizontal position, clamped to the grid
    fn column_at(&self, x: i64) -> u32 {
        last_edge_at_or_before(self.column_limit(), x, |col| self.column_edge(col))
    }

    /// Row containing a vertical position, clamped to the grid
    fn row_at(&self, y: i64) -> u32 {
        last_edge_at_or_before(self.row_limit(), y, |row| self.row_edge(row))
    }

    /// Cells touched by a rectangle; edges are exclusive
    fn locate(&self, bounds: &Bounds) -> GridRect {
        let x1 = self.column_at(bounds.x);
        let y1 = self.row_at(bounds.y);
        let x2 = if bounds.width > 0 {
            self.column_at(bounds.right() - 1)
        } else {
            x1
        };
        let y2 = if bounds.height > 0 {
            self.row_at(bounds.bottom() - 1)
        } else {
            y1
        };
        GridRect::new(x1, y1, x2.max(x1), y2.max(y1))
    }

    /// Bounds of a grid rectangle
    fn cell_bounds(&self, rect: &GridRect) -> Bounds {
        let x = self.column_edge(rect.x1);
        let y = self.row_edge(rect.y1);
        Bounds::new(
            x,
            y,
            self.column_edge(rect.x2 + 1) - x,
            self.row_edge(rect.y2 + 1) - y,
        )
    }
}

/// Binary search over non-decreasing edges: the last index in `0..limit`
/// whose edge is at or before `pos`, or 0
fn last_edge_at_or_before(limit: u32, pos: i64, edge: impl Fn(u32) -> i64) -> u32 {
    let (mut lo, mut hi) = (0, limit.max(1));
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if edge(mid) <= pos {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

impl<T: SheetLayout + ?Sized> GridGeometry for T {
    fn column_edge(&self, col: u32) -> i64 {
        self.column_start(col)
    }

    fn row_edge(&self, row: u32) -> i64 {
        self.row_start(row)
    }

    fn column_limit(&self) -> u32 {
        self.column_count()
    }

    fn row_limit(&self) -> u32 {
        self.row_count()
    }
}

fn default_true() -> bool {
    true
}

/// A positioned content box
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentBox {
    pub bounds: Bounds,
    #[serde(default)]
    pub style: BoxStyle,
    #[serde(default)]
    pub content: BoxContent,
    /// Whether the layout engine has committed this box
    #[serde(default = "default_true")]
    pub finished: bool,
}

impl ContentBox {
    /// Create a finished box with the default style
    pub fn new(bounds: Bounds, content: BoxContent) -> Self {
        Self {
            bounds,
            style: BoxStyle::default(),
            content,
            finished: true,
        }
    }

    /// Box holding a single plain text chunk
    pub fn text(bounds: Bounds, text: impl Into<String>) -> Self {
        Self::new(bounds, BoxContent::Text(vec![InlineBox::text(text)]))
    }

    /// Box holding a raw value
    pub fn raw(bounds: Bounds, value: RawValue) -> Self {
        Self::new(bounds, BoxContent::Raw(value))
    }

    /// Replace the style
    pub fn with_style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    /// Mark the box as not yet committed
    pub fn unfinished(mut self) -> Self {
        self.finished = false;
        self
    }
}

/// What a box holds
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxContent {
    #[default]
    Empty,
    /// Inline text, possibly with nested styled spans
    Text(Vec<InlineBox>),
    /// A value that is not laid out as text
    Raw(RawValue),
}

/// Typed content carried through unchanged
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Boolean(bool),
    Image(ImageData),
    /// Vector content already rendered to a bitmap
    Drawable(ImageData),
}

/// Encoded image with its intrinsic pixel size
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    /// Resolution the image was rendered at, if known
    #[serde(default)]
    pub dpi: Option<f64>,
}

impl ImageData {
    pub fn new(bytes: Vec<u8>, width_px: u32, height_px: u32) -> Self {
        Self {
            bytes,
            width_px,
            height_px,
            dpi: None,
        }
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = Some(dpi);
        self
    }
}

/// Font attributes a box or chunk sets explicitly
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FontOverride {
    pub family: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<Underline>,
    pub strikethrough: Option<bool>,
    pub color: Option<Rgb>,
}

impl FontOverride {
    /// Whether nothing is overridden
    pub fn is_empty(&self) -> bool {
        *self == FontOverride::default()
    }

    /// Merge `self` over `base`; fields set here win
    pub fn over(&self, base: &FontOverride) -> FontOverride {
        FontOverride {
            family: self.family.clone().or_else(|| base.family.clone()),
            size: self.size.or(base.size),
            bold: self.bold.or(base.bold),
            italic: self.italic.or(base.italic),
            underline: self.underline.or(base.underline),
            strikethrough: self.strikethrough.or(base.strikethrough),
            color: self.color.or(base.color),
        }
    }

    /// Resolve to a concrete font, filling gaps from the writer default
    pub fn to_spec(&self, palette: &mut dyn ColorResolver) -> FontSpec {
        let mut spec = FontSpec::default();
        if let Some(family) = &self.family {
            spec.name = family.clone();
        }
        if let Some(size) = self.size {
            spec.size = size;
        }
        spec.bold = self.bold.unwrap_or(false);
        spec.italic = self.italic.unwrap_or(false);
        spec.underline = self.underline.unwrap_or_default();
        spec.strikethrough = self.strikethrough.unwrap_or(false);
        if let Some(color) = self.color {
            spec.color = palette.resolve(color);
        }
        spec
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Visual attributes of a content box
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BoxStyle {
    pub font: FontOverride,
    pub horizontal_align: HorizontalAlignment,
    pub vertical_align: VerticalAlignment,
    /// Generic wrapping hint
    pub text_wrap: Option<bool>,
    /// Explicit wrapping choice; beats `text_wrap`
    pub wrap_override: Option<bool>,
    pub number_format: Option<String>,
    /// Text rotation in degrees, counter-clockwise
    pub rotation: Option<i16>,
    /// Hyperlink target
    pub href: Option<String>,
    /// Formula to write instead of the displayed value
    pub formula: Option<String>,
    /// Scale images to the cell instead of clipping them
    pub scale_to_fit: bool,
    pub keep_aspect_ratio: bool,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            font: FontOverride::default(),
            horizontal_align: HorizontalAlignment::default(),
            vertical_align: VerticalAlignment::default(),
            text_wrap: None,
            wrap_override: None,
            number_format: None,
            rotation: None,
            href: None,
            formula: None,
            scale_to_fit: false,
            keep_aspect_ratio: true,
        }
    }
}

/// Nested inline content of a text box
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InlineBox {
    #[serde(default)]
    pub font: FontOverride,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(flatten)]
    pub kind: InlineKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InlineKind {
    /// Text split into chunks that may carry their own fonts
    Text { chunks: Vec<TextChunk> },
    /// Container whose font applies to its children
    Span { children: Vec<InlineBox> },
    LineBreak,
}

/// A run of text inside an inline text box
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextChunk {
    pub text: String,
    #[serde(default)]
    pub font: FontOverride,
}

impl TextChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: FontOverride::default(),
        }
    }

    pub fn styled(text: impl Into<String>, font: FontOverride) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }
}

impl InlineBox {
    fn with_kind(kind: InlineKind) -> Self {
        Self {
            font: FontOverride::default(),
            visible: true,
            kind,
        }
    }

    /// Unstyled text
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(InlineKind::Text {
            chunks: vec![TextChunk::new(text)],
        })
    }

    /// Text in a given font
    pub fn styled(text: impl Into<String>, font: FontOverride) -> Self {
        Self::text(text).with_font(font)
    }

    /// Text made of several chunks
    pub fn chunks(chunks: Vec<TextChunk>) -> Self {
        Self::with_kind(InlineKind::Text { chunks })
    }

    /// Container for nested boxes
    pub fn span(children: Vec<InlineBox>) -> Self {
        Self::with_kind(InlineKind::Span { children })
    }

    pub fn line_break() -> Self {
        Self::with_kind(InlineKind::LineBreak)
    }

    pub fn with_font(mut self, font: FontOverride) -> Self {
        self.font = font;
        self
    }

    /// Hide the box and everything inside it
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Border line pattern as the layout describes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
    DashDot,
    DashDotDot,
}

/// One border edge
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BorderSpec {
    pub line: LineStyle,
    /// Line width in points
    pub width: f64,
    pub color: Rgb,
}

impl Default for BorderSpec {
    fn default() -> Self {
        Self {
            line: LineStyle::Solid,
            width: 1.0,
            color: Rgb::BLACK,
        }
    }
}

impl BorderSpec {
    pub fn new(line: LineStyle, width: f64, color: Rgb) -> Self {
        Self { line, width, color }
    }

    /// Solid black line of the given width
    pub fn solid(width: f64) -> Self {
        Self::new(LineStyle::Solid, width, Rgb::BLACK)
    }
}

/// Fill and borders painted on a cell
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CellBackground {
    pub fill: Option<Rgb>,
    pub top: Option<BorderSpec>,
    pub left: Option<BorderSpec>,
    pub bottom: Option<BorderSpec>,
    pub right: Option<BorderSpec>,
}

impl CellBackground {
    /// Background with only a fill
    pub fn filled(color: Rgb) -> Self {
        Self {
            fill: Some(color),
            ..Default::default()
        }
    }

    /// Whether nothing is painted
    pub fn is_empty(&self) -> bool {
        *self == CellBackground::default()
    }

    /// Set all four edges
    pub fn with_box_border(mut self, border: BorderSpec) -> Self {
        self.top = Some(border);
        self.left = Some(border);
        self.bottom = Some(border);
        self.right = Some(border);
        self
    }

    /// Lay `self` over `base`; attributes set here win
    pub fn overlay(&self, base: &CellBackground) -> CellBackground {
        CellBackground {
            fill: self.fill.or(base.fill),
            top: self.top.or(base.top),
            left: self.left.or(base.left),
            bottom: self.bottom.or(base.bottom),
            right: self.right.or(base.right),
        }
    }
}
