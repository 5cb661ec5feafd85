//! Grid coordinates and rectangles

use std::fmt;

/// A zero-based `(column, row)` position on the output grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridCoord {
    /// Column index (0-based)
    pub col: u32,
    /// Row index (0-based)
    pub row: u32,
}

impl GridCoord {
    /// Create a new coordinate
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

/// An inclusive rectangle of grid cells
///
/// `x` is the column axis and `y` the row axis. The constructor normalizes
/// swapped corners so `x2 >= x1` and `y2 >= y1` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl GridRect {
    /// Create a rectangle from two corners (inclusive)
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// A rectangle covering a single cell
    pub fn single(col: u32, row: u32) -> Self {
        Self::new(col, row, col, row)
    }

    /// Top-left cell
    pub fn origin(&self) -> GridCoord {
        GridCoord::new(self.x1, self.y1)
    }

    /// Number of columns covered
    pub fn width(&self) -> u32 {
        self.x2 - self.x1 + 1
    }

    /// Number of rows covered
    pub fn height(&self) -> u32 {
        self.y2 - self.y1 + 1
    }

    /// Total number of cells covered
    pub fn cell_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// A 1x1 rectangle never carries a merge
    pub fn is_single_cell(&self) -> bool {
        self.x1 == self.x2 && self.y1 == self.y2
    }

    /// Check whether the cell lies inside the rectangle
    pub fn contains(&self, col: u32, row: u32) -> bool {
        col >= self.x1 && col <= self.x2 && row >= self.y1 && row <= self.y2
    }

    /// Check whether two rectangles share at least one cell
    pub fn intersects(&self, other: &GridRect) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    /// Iterate over all covered cells, row-major
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (self.y1..=self.y2).flat_map(move |row| (self.x1..=self.x2).map(move |col| GridCoord::new(col, row)))
    }

    /// Format as A1-style range (`A1:B2`, or `A1` for a single cell)
    pub fn to_a1_string(&self) -> String {
        let start = GridCoord::new(self.x1, self.y1).to_a1_string();
        if self.is_single_cell() {
            start
        } else {
            format!("{}:{}", start, GridCoord::new(self.x2, self.y2).to_a1_string())
        }
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

/// Convert a column index to letters (0 = A, 25 = Z, 26 = AA, ...)
pub fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col as u64 + 1;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}
