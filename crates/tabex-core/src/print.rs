//! Print setup for a worksheet

use std::fmt;
use std::str::FromStr;

/// Page setup for printing
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "kebab-case")
)]
pub struct PrintSetup {
    /// Paper size
    pub paper_size: PaperSize,
    /// Orientation
    pub orientation: Orientation,
    /// Scale percentage (10-400)
    pub scale: u16,
    /// Print resolution in dpi, format default when absent
    pub resolution: Option<u16>,
    /// Show gridlines on screen
    pub gridlines_displayed: bool,
    /// Print gridlines
    pub gridlines_printed: bool,
    /// Print cell notes
    pub print_notes: bool,
    /// Start page numbering at `first_page_number` instead of automatically
    pub use_first_page_number: bool,
    /// First page number, used with `use_first_page_number`
    pub first_page_number: u16,
    /// Draft quality
    pub draft: bool,
}

impl Default for PrintSetup {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::Letter,
            orientation: Orientation::Portrait,
            scale: 100,
            resolution: None,
            gridlines_displayed: true,
            gridlines_printed: false,
            print_notes: false,
            use_first_page_number: false,
            first_page_number: 1,
            draft: false,
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// OOXML attribute value
    pub fn xlsx_name(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(format!("unknown orientation: {other}")),
        }
    }
}

/// Paper size
///
/// Named sizes map to the format's paper codes; anything else is carried as
/// a raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum PaperSize {
    #[default]
    Letter,
    Tabloid,
    Legal,
    Executive,
    A3,
    A4,
    A5,
    B5,
    /// Raw paper code
    Code(u8),
}

impl PaperSize {
    /// Paper code stored in the file
    pub fn code(&self) -> u8 {
        match self {
            PaperSize::Letter => 1,
            PaperSize::Tabloid => 3,
            PaperSize::Legal => 5,
            PaperSize::Executive => 7,
            PaperSize::A3 => 8,
            PaperSize::A4 => 9,
            PaperSize::A5 => 11,
            PaperSize::B5 => 13,
            PaperSize::Code(c) => *c,
        }
    }
}

impl FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Ok(PaperSize::Code(code));
        }
        match s.to_ascii_lowercase().as_str() {
            "letter" => Ok(PaperSize::Letter),
            "tabloid" => Ok(PaperSize::Tabloid),
            "legal" => Ok(PaperSize::Legal),
            "executive" => Ok(PaperSize::Executive),
            "a3" => Ok(PaperSize::A3),
            "a4" => Ok(PaperSize::A4),
            "a5" => Ok(PaperSize::A5),
            "b5" => Ok(PaperSize::B5),
            other => Err(format!("unknown paper size: {other}")),
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::Letter => write!(f, "letter"),
            PaperSize::Tabloid => write!(f, "tabloid"),
            PaperSize::Legal => write!(f, "legal"),
            PaperSize::Executive => write!(f, "executive"),
            PaperSize::A3 => write!(f, "a3"),
            PaperSize::A4 => write!(f, "a4"),
            PaperSize::A5 => write!(f, "a5"),
            PaperSize::B5 => write!(f, "b5"),
            PaperSize::Code(c) => write!(f, "{c}"),
        }
    }
}

impl TryFrom<String> for PaperSize {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaperSize> for String {
    fn from(value: PaperSize) -> Self {
        value.to_string()
    }
}
