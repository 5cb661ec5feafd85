//! Text alignment types

/// Horizontal alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum HorizontalAlignment {
    /// General alignment (text left, numbers right)
    #[default]
    General,
    /// Left aligned
    Left,
    /// Center aligned
    Center,
    /// Right aligned
    Right,
    /// Justify (stretch to fit width)
    Justify,
}

impl HorizontalAlignment {
    /// Fraction of free horizontal space placed before the content
    pub fn offset_factor(&self) -> f64 {
        match self {
            HorizontalAlignment::Center => 0.5,
            HorizontalAlignment::Right => 1.0,
            _ => 0.0,
        }
    }

    /// OOXML attribute value
    pub fn xlsx_name(&self) -> &'static str {
        match self {
            HorizontalAlignment::General => "general",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
            HorizontalAlignment::Justify => "justify",
        }
    }
}

/// Vertical alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VerticalAlignment {
    /// Top aligned
    Top,
    /// Center aligned
    Center,
    /// Bottom aligned (default)
    #[default]
    Bottom,
    /// Justify
    Justify,
}

impl VerticalAlignment {
    /// Fraction of free vertical space placed above the content
    pub fn offset_factor(&self) -> f64 {
        match self {
            VerticalAlignment::Center => 0.5,
            VerticalAlignment::Bottom => 1.0,
            _ => 0.0,
        }
    }

    /// OOXML attribute value
    pub fn xlsx_name(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
            VerticalAlignment::Justify => "justify",
        }
    }
}
