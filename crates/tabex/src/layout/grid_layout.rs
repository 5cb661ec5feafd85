//! In-memory layout snapshot

use ahash::AHashMap;
use serde::Deserialize;
use tabex_core::GridRect;

use super::{to_micro, CellBackground, ContentBox, GridGeometry, SheetLayout};

/// Wire form of a [`GridLayout`]; all lengths are micro-points
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct LayoutSnapshot {
    name: Option<String>,
    header: Option<String>,
    footer: Option<String>,
    columns: Vec<i64>,
    rows: Vec<i64>,
    boxes: Vec<ContentBox>,
    backgrounds: Vec<PlacedBackground>,
}

#[derive(Debug, Deserialize)]
struct PlacedBackground {
    col: u32,
    row: u32,
    #[serde(default = "one")]
    cols: u32,
    #[serde(default = "one")]
    rows: u32,
    #[serde(flatten)]
    background: CellBackground,
}

fn one() -> u32 {
    1
}

/// A fully materialized sheet layout
///
/// Boxes are indexed by every cell they cover. Column and row edges are kept
/// as running totals, so locating a position is a binary search. A box that
/// touches a cell already claimed by an earlier box is left out and counted.
///
/// ```rust
/// use tabex::layout::{Bounds, ContentBox, GridLayout, SheetLayout};
///
/// let mut layout = GridLayout::new(&[50.0, 50.0], &[15.0]);
/// layout.add_box(ContentBox::text(Bounds::from_points(0.0, 0.0, 100.0, 15.0), "Total"));
///
/// let a = layout.content_at(0, 0).unwrap();
/// let b = layout.content_at(1, 0).unwrap();
/// assert!(std::ptr::eq(a, b));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "LayoutSnapshot")]
pub struct GridLayout {
    name: Option<String>,
    header: Option<String>,
    footer: Option<String>,
    /// `column_edges[c]` is the left edge of column `c`; one more than columns
    column_edges: Vec<i64>,
    row_edges: Vec<i64>,
    boxes: Vec<ContentBox>,
    cells: AHashMap<(u32, u32), usize>,
    backgrounds: AHashMap<(u32, u32), CellBackground>,
    overlapping: usize,
}

/// Running totals of sizes, starting at 0; negative sizes count as 0
fn running_edges(sizes: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut total = 0;
    let mut edges = vec![0];
    edges.extend(sizes.into_iter().map(|size| {
        total += size.max(0);
        total
    }));
    edges
}

fn edge_at(edges: &[i64], index: u32) -> i64 {
    let last = edges.len().saturating_sub(1);
    edges.get((index as usize).min(last)).copied().unwrap_or(0)
}

fn size_at(edges: &[i64], index: u32) -> i64 {
    let i = index as usize;
    match (edges.get(i), edges.get(i + 1)) {
        (Some(start), Some(end)) => end - start,
        _ => 0,
    }
}

impl From<LayoutSnapshot> for GridLayout {
    fn from(snapshot: LayoutSnapshot) -> Self {
        let mut layout = GridLayout {
            name: snapshot.name,
            header: snapshot.header,
            footer: snapshot.footer,
            column_edges: running_edges(snapshot.columns),
            row_edges: running_edges(snapshot.rows),
            ..Default::default()
        };
        for content in snapshot.boxes {
            layout.add_box(content);
        }
        for placed in snapshot.backgrounds {
            let rect = GridRect::new(
                placed.col,
                placed.row,
                placed.col + placed.cols.max(1) - 1,
                placed.row + placed.rows.max(1) - 1,
            );
            layout.fill_background(rect, placed.background);
        }
        layout
    }
}

impl GridLayout {
    /// Create an empty layout from column widths and row heights in points
    pub fn new(column_widths: &[f64], row_heights: &[f64]) -> Self {
        Self {
            column_edges: running_edges(column_widths.iter().copied().map(to_micro)),
            row_edges: running_edges(row_heights.iter().copied().map(to_micro)),
            ..Default::default()
        }
    }

    /// Parse a JSON snapshot
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Set the requested sheet name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set page header and footer text
    pub fn with_header_footer(mut self, header: impl Into<String>, footer: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self.footer = Some(footer.into());
        self
    }

    /// Add a box and index the cells it covers
    ///
    /// A box touching any cell an earlier box already claimed is left out
    /// and counted in [`SheetLayout::overlapping_boxes`].
    pub fn add_box(&mut self, content: ContentBox) -> &mut Self {
        let rect = self.locate(&content.bounds);
        if rect
            .cells()
            .any(|cell| self.cells.contains_key(&(cell.col, cell.row)))
        {
            log::debug!("box at {} overlaps an earlier box, left out", rect.origin().to_a1_string());
            self.overlapping += 1;
            return self;
        }

        let index = self.boxes.len();
        for cell in rect.cells() {
            self.cells.insert((cell.col, cell.row), index);
        }
        self.boxes.push(content);
        self
    }

    /// Add a box covering exactly the given cells
    pub fn place(&mut self, rect: GridRect, mut content: ContentBox) -> &mut Self {
        content.bounds = self.cell_bounds(&rect);
        self.add_box(content)
    }

    /// Paint a background on one cell
    pub fn set_background(&mut self, col: u32, row: u32, background: CellBackground) -> &mut Self {
        self.backgrounds.insert((col, row), background);
        self
    }

    /// Paint the same background on every cell of a rectangle
    pub fn fill_background(&mut self, rect: GridRect, background: CellBackground) -> &mut Self {
        for cell in rect.cells() {
            self.backgrounds.insert((cell.col, cell.row), background);
        }
        self
    }

    /// All boxes in insertion order
    pub fn boxes(&self) -> &[ContentBox] {
        &self.boxes
    }
}

impl SheetLayout for GridLayout {
    fn sheet_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    fn column_count(&self) -> u32 {
        self.column_edges.len().saturating_sub(1) as u32
    }

    fn row_count(&self) -> u32 {
        self.row_edges.len().saturating_sub(1) as u32
    }

    fn column_width(&self, col: u32) -> i64 {
        size_at(&self.column_edges, col)
    }

    fn row_height(&self, row: u32) -> i64 {
        size_at(&self.row_edges, row)
    }

    fn column_start(&self, col: u32) -> i64 {
        edge_at(&self.column_edges, col)
    }

    fn row_start(&self, row: u32) -> i64 {
        edge_at(&self.row_edges, row)
    }

    fn content_at(&self, col: u32, row: u32) -> Option<&ContentBox> {
        self.cells
            .get(&(col, row))
            .and_then(|&index| self.boxes.get(index))
    }

    fn background_at(&self, col: u32, row: u32) -> Option<&CellBackground> {
        self.backgrounds.get(&(col, row))
    }

    fn overlapping_boxes(&self) -> usize {
        self.overlapping
    }
}
