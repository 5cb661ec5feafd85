//! Image cell embedding
//!
//! Places a picture inside the footprint of its cell: corrects the intrinsic
//! size for the device resolution, scales or aligns it, clips what overflows
//! the cell, and expresses the result as a two-cell anchor on the grid.

use std::io::Cursor;

use png::{BitDepth, ColorType};
use tabex_core::{
    AnchorPoint, GridRect, HorizontalAlignment, ImageAnchor, PictureFormat, VerticalAlignment,
    ANCHOR_UNITS_X, ANCHOR_UNITS_Y,
};
use thiserror::Error;

use crate::config::ExportConfig;
use crate::diagnostics::{Degradation, Diagnostics};
use crate::layout::{to_points, Bounds, BoxStyle, GridGeometry, ImageData};

/// Rectangle in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlacementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacementRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert layout bounds to points
    pub fn from_bounds(bounds: &Bounds) -> Self {
        Self::new(
            to_points(bounds.x),
            to_points(bounds.y),
            to_points(bounds.width),
            to_points(bounds.height),
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn to_bounds(&self) -> Bounds {
        Bounds::from_points(self.x, self.y, self.width, self.height)
    }

    fn intersect(&self, other: &PlacementRect) -> PlacementRect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        PlacementRect::new(
            x,
            y,
            (self.right().min(other.right()) - x).max(0.0),
            (self.bottom().min(other.bottom()) - y).max(0.0),
        )
    }
}

/// How a picture should sit in its cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFlags {
    pub scale_to_fit: bool,
    pub keep_aspect_ratio: bool,
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
}

impl Default for ImageFlags {
    fn default() -> Self {
        Self {
            scale_to_fit: false,
            keep_aspect_ratio: true,
            horizontal: HorizontalAlignment::default(),
            vertical: VerticalAlignment::default(),
        }
    }
}

impl From<&BoxStyle> for ImageFlags {
    fn from(style: &BoxStyle) -> Self {
        Self {
            scale_to_fit: style.scale_to_fit,
            keep_aspect_ratio: style.keep_aspect_ratio,
            horizontal: style.horizontal_align,
            vertical: style.vertical_align,
        }
    }
}

/// A picture ready to be handed to the writer
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    /// Cells the picture touches
    pub span: GridRect,
    pub anchor: ImageAnchor,
    /// Final picture rectangle in points
    pub placement: PlacementRect,
    pub bytes: Vec<u8>,
    pub format: PictureFormat,
}

#[derive(Debug, Error)]
enum ClipError {
    #[error("decode failed: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("encode failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("unsupported pixel layout {0:?}/{1:?}")]
    Unsupported(ColorType, BitDepth),

    #[error("{0} images cannot be clipped")]
    NotPng(&'static str),
}

/// Computes placement and anchors for pictures
#[derive(Debug, Clone, Copy)]
pub struct ImageEmbedder {
    reference_dpi: f64,
    resolution_aware: bool,
    device_dpi: Option<f64>,
}

impl ImageEmbedder {
    /// Create an embedder for a reference resolution
    pub fn new(reference_dpi: f64) -> Self {
        Self {
            reference_dpi,
            resolution_aware: true,
            device_dpi: None,
        }
    }

    /// Create an embedder from export settings
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            reference_dpi: config.variant.reference_dpi(),
            resolution_aware: config.image_resolution_aware,
            device_dpi: config.device_resolution,
        }
    }

    /// Toggle device-resolution correction
    pub fn with_resolution_aware(mut self, aware: bool) -> Self {
        self.resolution_aware = aware;
        self
    }

    /// Resolution assumed for images that carry none
    pub fn with_device_dpi(mut self, dpi: f64) -> Self {
        self.device_dpi = Some(dpi);
        self
    }

    /// Intrinsic size in points after resolution correction
    pub fn natural_size(&self, image: &ImageData) -> (f64, f64) {
        let mut width = image.width_px as f64;
        let mut height = image.height_px as f64;
        if self.resolution_aware {
            if let Some(dpi) = image.dpi.or(self.device_dpi).filter(|d| *d > 0.0) {
                if (dpi - self.reference_dpi).abs() > f64::EPSILON {
                    let factor = self.reference_dpi / dpi;
                    width *= factor;
                    height *= factor;
                }
            }
        }
        (width, height)
    }

    /// Place an image inside a cell footprint
    ///
    /// Returns `None` for images with no pixels and for images that had to be
    /// clipped but could not be re-encoded.
    ///
    /// Only PNG data can be clipped. A JPEG, GIF or BMP that overflows its cell
    /// is skipped with [`Degradation::ImageSkipped`]; pictures that fit, or that
    /// are scaled to fit, keep their original encoding.
    pub fn embed<G>(
        &self,
        image: &ImageData,
        cell: &PlacementRect,
        flags: &ImageFlags,
        grid: &G,
        diagnostics: &mut Diagnostics,
    ) -> Option<EmbeddedImage>
    where
        G: GridGeometry + ?Sized,
    {
        if image.width_px < 1 || image.height_px < 1 {
            return None;
        }
        let Some(format) = PictureFormat::sniff(&image.bytes) else {
            diagnostics.record(Degradation::ImageSkipped, "unrecognized image data");
            return None;
        };

        let (mut width, mut height) = self.natural_size(image);
        if flags.scale_to_fit {
            let fit_x = cell.width / width;
            let fit_y = cell.height / height;
            if flags.keep_aspect_ratio {
                let factor = fit_x.min(fit_y);
                width *= factor;
                height *= factor;
            } else {
                width = cell.width;
                height = cell.height;
            }
        }

        let aligned = PlacementRect::new(
            cell.x + (cell.width - width) * flags.horizontal.offset_factor(),
            cell.y + (cell.height - height) * flags.vertical.offset_factor(),
            width,
            height,
        );

        let overflows = aligned.x < cell.x - 1e-9
            || aligned.y < cell.y - 1e-9
            || aligned.right() > cell.right() + 1e-9
            || aligned.bottom() > cell.bottom() + 1e-9;

        let (placement, bytes) = if overflows {
            let visible = aligned.intersect(cell);
            if visible.width <= 0.0 || visible.height <= 0.0 {
                return None;
            }
            match clip(&image.bytes, format, &aligned, &visible) {
                Ok(bytes) => (visible, bytes),
                Err(e) => {
                    diagnostics.record(Degradation::ImageSkipped, e);
                    return None;
                }
            }
        } else {
            (aligned, image.bytes.clone())
        };

        let format = if overflows { PictureFormat::Png } else { format };
        let span = grid.locate(&placement.to_bounds());
        let anchor = anchor_for(grid, &span, &placement);
        Some(EmbeddedImage {
            span,
            anchor,
            placement,
            bytes,
            format,
        })
    }
}

fn anchor_for<G>(grid: &G, span: &GridRect, placement: &PlacementRect) -> ImageAnchor
where
    G: GridGeometry + ?Sized,
{
    let offset = |start: i64, end: i64, pos: f64, units: u32| -> u32 {
        let size = to_points(end - start);
        if size <= 0.0 {
            return 0;
        }
        let fraction = ((pos - to_points(start)) / size).clamp(0.0, 1.0);
        (fraction * units as f64).round() as u32
    };
    let col_offset = |col: u32, x: f64| {
        offset(grid.column_edge(col), grid.column_edge(col + 1), x, ANCHOR_UNITS_X)
    };
    let row_offset = |row: u32, y: f64| {
        offset(grid.row_edge(row), grid.row_edge(row + 1), y, ANCHOR_UNITS_Y)
    };

    ImageAnchor::new(
        AnchorPoint::new(
            span.x1,
            span.y1,
            col_offset(span.x1, placement.x),
            row_offset(span.y1, placement.y),
        ),
        AnchorPoint::new(
            span.x2,
            span.y2,
            col_offset(span.x2, placement.right()),
            row_offset(span.y2, placement.bottom()),
        ),
    )
}

/// Re-encode the part of `full` that lies inside `visible`
fn clip(
    bytes: &[u8],
    format: PictureFormat,
    full: &PlacementRect,
    visible: &PlacementRect,
) -> Result<Vec<u8>, ClipError> {
    if format != PictureFormat::Png {
        return Err(ClipError::NotPng(format.extension()));
    }
    let (width, height, rgba) = decode_rgba8(bytes)?;

    let scale_x = width as f64 / full.width;
    let scale_y = height as f64 / full.height;
    let left = (((visible.x - full.x) * scale_x).floor() as u32).min(width - 1);
    let top = (((visible.y - full.y) * scale_y).floor() as u32).min(height - 1);
    let crop_w = ((visible.width * scale_x).round() as u32).clamp(1, width - left);
    let crop_h = ((visible.height * scale_y).round() as u32).clamp(1, height - top);

    let stride = width as usize * 4;
    let mut cropped = Vec::with_capacity(crop_w as usize * crop_h as usize * 4);
    for row in top..top + crop_h {
        let start = row as usize * stride + left as usize * 4;
        cropped.extend_from_slice(&rgba[start..start + crop_w as usize * 4]);
    }
    encode_rgba8(crop_w, crop_h, &cropped)
}

fn decode_rgba8(bytes: &[u8]) -> Result<(u32, u32, Vec<u8>), ClipError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let data = &buf[..info.buffer_size()];

    let mut rgba = Vec::with_capacity(info.width as usize * info.height as usize * 4);
    match (info.color_type, info.bit_depth) {
        (ColorType::Rgba, BitDepth::Eight) => rgba.extend_from_slice(data),
        (ColorType::Rgb, BitDepth::Eight) => {
            for px in data.chunks_exact(3) {
                rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        (ColorType::Grayscale, BitDepth::Eight) => {
            for &g in data {
                rgba.extend_from_slice(&[g, g, g, 255]);
            }
        }
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => {
            for px in data.chunks_exact(2) {
                rgba.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
            }
        }
        (color, depth) => return Err(ClipError::Unsupported(color, depth)),
    }
    Ok((info.width, info.height, rgba))
}

fn encode_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, ClipError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba)?;
    }
    Ok(out)
}
