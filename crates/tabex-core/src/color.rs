//! Color representation

use std::fmt;

/// An sRGB color as produced by the style-sheet model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create an RGB color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from a hex string (e.g., "#FF0000" or "FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Convert to hex string (without # prefix)
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert to ARGB hex string (8 characters, fully opaque)
    pub fn to_argb_hex(&self) -> String {
        format!("FF{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Component-sum distance between two colors
    pub fn distance(&self, other: &Rgb) -> u32 {
        let d = |a: u8, b: u8| (a as i32 - b as i32).unsigned_abs();
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid color '{}'", value))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// A color as stored by the target format
///
/// The legacy variant only knows palette indices; the extended variant
/// stores colors directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorRef {
    /// Automatic/default color
    #[default]
    Auto,

    /// Slot in the 64-entry legacy palette
    Indexed(u8),

    /// Direct RGB color
    Rgb(Rgb),
}

impl ColorRef {
    /// Check if color is automatic/default
    pub fn is_auto(&self) -> bool {
        matches!(self, ColorRef::Auto)
    }

    /// Resolve to RGB, looking indexed colors up in `palette`
    pub fn to_rgb(&self, palette: &[Rgb]) -> Option<Rgb> {
        match self {
            ColorRef::Auto => None,
            ColorRef::Indexed(i) => palette.get(*i as usize).copied(),
            ColorRef::Rgb(rgb) => Some(*rgb),
        }
    }
}

impl fmt::Display for ColorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorRef::Auto => write!(f, "auto"),
            ColorRef::Indexed(i) => write!(f, "indexed({})", i),
            ColorRef::Rgb(rgb) => write!(f, "{}", rgb),
        }
    }
}

/// The format's standard 64-entry palette.
///
/// Slots 0–7 are the fixed system (EGA) colors; 8–63 are the defaults a
/// workbook starts with before any slot is reassigned.
pub const STANDARD_PALETTE: [Rgb; 64] = [
    Rgb::new(0, 0, 0),       //  0: Black
    Rgb::new(255, 255, 255), //  1: White
    Rgb::new(255, 0, 0),     //  2: Red
    Rgb::new(0, 255, 0),     //  3: Bright Green
    Rgb::new(0, 0, 255),     //  4: Blue
    Rgb::new(255, 255, 0),   //  5: Yellow
    Rgb::new(255, 0, 255),   //  6: Pink
    Rgb::new(0, 255, 255),   //  7: Turquoise
    Rgb::new(0, 0, 0),       //  8: Black
    Rgb::new(255, 255, 255), //  9: White
    Rgb::new(255, 0, 0),     // 10: Red
    Rgb::new(0, 255, 0),     // 11: Bright Green
    Rgb::new(0, 0, 255),     // 12: Blue
    Rgb::new(255, 255, 0),   // 13: Yellow
    Rgb::new(255, 0, 255),   // 14: Pink
    Rgb::new(0, 255, 255),   // 15: Turquoise
    Rgb::new(128, 0, 0),     // 16: Dark Red
    Rgb::new(0, 128, 0),     // 17: Green
    Rgb::new(0, 0, 128),     // 18: Dark Blue
    Rgb::new(128, 128, 0),   // 19: Dark Yellow
    Rgb::new(128, 0, 128),   // 20: Violet
    Rgb::new(0, 128, 128),   // 21: Teal
    Rgb::new(192, 192, 192), // 22: Silver (25% Gray)
    Rgb::new(128, 128, 128), // 23: Gray (50% Gray)
    Rgb::new(153, 153, 255), // 24: Periwinkle
    Rgb::new(153, 51, 102),  // 25: Plum
    Rgb::new(255, 255, 204), // 26: Ivory
    Rgb::new(204, 255, 255), // 27: Light Turquoise
    Rgb::new(102, 0, 102),   // 28: Dark Purple
    Rgb::new(255, 128, 128), // 29: Coral
    Rgb::new(0, 102, 204),   // 30: Ocean Blue
    Rgb::new(204, 204, 255), // 31: Ice Blue
    Rgb::new(0, 0, 128),     // 32: Dark Blue
    Rgb::new(255, 0, 255),   // 33: Pink
    Rgb::new(255, 255, 0),   // 34: Yellow
    Rgb::new(0, 255, 255),   // 35: Turquoise
    Rgb::new(128, 0, 128),   // 36: Violet
    Rgb::new(128, 0, 0),     // 37: Dark Red
    Rgb::new(0, 128, 128),   // 38: Teal
    Rgb::new(0, 0, 255),     // 39: Blue
    Rgb::new(0, 204, 255),   // 40: Sky Blue
    Rgb::new(204, 255, 255), // 41: Light Turquoise
    Rgb::new(204, 255, 204), // 42: Light Green
    Rgb::new(255, 255, 153), // 43: Light Yellow
    Rgb::new(153, 204, 255), // 44: Pale Blue
    Rgb::new(255, 153, 204), // 45: Rose
    Rgb::new(204, 153, 255), // 46: Lavender
    Rgb::new(255, 204, 153), // 47: Tan
    Rgb::new(51, 102, 255),  // 48: Light Blue
    Rgb::new(51, 204, 204),  // 49: Aqua
    Rgb::new(153, 204, 0),   // 50: Lime
    Rgb::new(255, 204, 0),   // 51: Gold
    Rgb::new(255, 153, 0),   // 52: Light Orange
    Rgb::new(255, 102, 0),   // 53: Orange
    Rgb::new(102, 102, 153), // 54: Blue-Gray
    Rgb::new(150, 150, 150), // 55: 40% Gray
    Rgb::new(0, 51, 102),    // 56: Dark Teal
    Rgb::new(51, 153, 102),  // 57: Sea Green
    Rgb::new(0, 51, 0),      // 58: Dark Green
    Rgb::new(51, 51, 0),     // 59: Olive Green
    Rgb::new(153, 51, 0),    // 60: Brown
    Rgb::new(153, 51, 51),   // 61: Dark Rose
    Rgb::new(51, 51, 153),   // 62: Indigo
    Rgb::new(51, 51, 51),    // 63: 80% Gray
];
