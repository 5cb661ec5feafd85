//! Hard numeric limits of the target spreadsheet format

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters a sheet name may not contain
pub const SHEET_NAME_FORBIDDEN: [char; 7] = ['/', '\\', '?', '*', ']', '[', ':'];

/// Header and footer text combined must stay below this many characters
pub const MAX_HEADER_FOOTER_LEN: usize = 255;

/// Maximum number of characters stored in a single cell
pub const MAX_CELL_TEXT_CHARS: usize = 32_767;

/// Formula text must stay below this many characters
pub const MAX_FORMULA_LEN: usize = 1024;

/// Number of slots in the legacy indexed palette
pub const PALETTE_SIZE: usize = 64;

/// Leading palette slots reserved for fixed system colors
pub const PALETTE_RESERVED: usize = 8;

/// Horizontal sub-cell units per cell in an [`ImageAnchor`]
pub const ANCHOR_UNITS_X: u32 = 1024;

/// Vertical sub-cell units per cell in an [`ImageAnchor`]
pub const ANCHOR_UNITS_Y: u32 = 256;

/// Distinct style count at which formats start to misbehave in practice
pub const STYLE_SOFT_LIMIT: usize = 4000;

/// Layout coordinates are fixed-point micro-points
pub const MICRO_POINTS_PER_POINT: i64 = 1000;
