//! Picture anchoring types

use crate::{GridRect, ANCHOR_UNITS_X, ANCHOR_UNITS_Y};

/// Identifier of a picture registered with a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PictureId(pub u32);

/// Encoded picture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG
    Jpeg,
    /// GIF
    Gif,
    /// Windows bitmap
    Bmp,
}

impl PictureFormat {
    /// Guess the format from the leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(PictureFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(PictureFormat::Jpeg)
        } else if bytes.starts_with(b"GIF8") {
            Some(PictureFormat::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(PictureFormat::Bmp)
        } else {
            None
        }
    }

    /// File extension used inside the package
    pub fn extension(&self) -> &'static str {
        match self {
            PictureFormat::Png => "png",
            PictureFormat::Jpeg => "jpeg",
            PictureFormat::Gif => "gif",
            PictureFormat::Bmp => "bmp",
        }
    }

    /// MIME content type
    pub fn content_type(&self) -> &'static str {
        match self {
            PictureFormat::Png => "image/png",
            PictureFormat::Jpeg => "image/jpeg",
            PictureFormat::Gif => "image/gif",
            PictureFormat::Bmp => "image/bmp",
        }
    }
}

/// One corner of an anchor: a cell plus an offset inside it
///
/// `dx` is in 1/1024ths of the cell width, `dy` in 1/256ths of the cell height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AnchorPoint {
    /// Column index
    pub col: u32,
    /// Row index
    pub row: u32,
    /// Horizontal offset, `0..=ANCHOR_UNITS_X`
    pub dx: u32,
    /// Vertical offset, `0..=ANCHOR_UNITS_Y`
    pub dy: u32,
}

impl AnchorPoint {
    /// Create a new anchor point, clamping offsets to the unit grid
    pub fn new(col: u32, row: u32, dx: u32, dy: u32) -> Self {
        Self {
            col,
            row,
            dx: dx.min(ANCHOR_UNITS_X),
            dy: dy.min(ANCHOR_UNITS_Y),
        }
    }

    /// Horizontal offset as a fraction of the cell width
    pub fn dx_fraction(&self) -> f64 {
        self.dx as f64 / ANCHOR_UNITS_X as f64
    }

    /// Vertical offset as a fraction of the cell height
    pub fn dy_fraction(&self) -> f64 {
        self.dy as f64 / ANCHOR_UNITS_Y as f64
    }
}

/// Two-cell anchor of a picture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageAnchor {
    /// Top-left corner
    pub from: AnchorPoint,
    /// Bottom-right corner
    pub to: AnchorPoint,
}

impl ImageAnchor {
    /// Create a new anchor
    pub fn new(from: AnchorPoint, to: AnchorPoint) -> Self {
        Self { from, to }
    }

    /// Cells touched by the anchor
    pub fn span(&self) -> GridRect {
        GridRect::new(self.from.col, self.from.row, self.to.col, self.to.row)
    }
}
