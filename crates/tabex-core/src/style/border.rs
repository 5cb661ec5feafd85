//! Border style types

use crate::ColorRef;

/// A single border edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    /// Line style (also encodes the weight class)
    pub style: BorderLineStyle,
    /// Line color
    pub color: ColorRef,
}

impl BorderEdge {
    /// Create a new border edge
    pub fn new(style: BorderLineStyle, color: ColorRef) -> Self {
        Self { style, color }
    }
}

/// Discrete border line styles supported by the target format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderLineStyle {
    /// No border
    #[default]
    None,
    /// Hair line (very thin)
    Hair,
    /// Thin line
    Thin,
    /// Medium line
    Medium,
    /// Thick line
    Thick,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Double line
    Double,
    /// Medium dashed
    MediumDashed,
    /// Dash-dot
    DashDot,
    /// Dash-dot-dot
    DashDotDot,
}

impl BorderLineStyle {
    /// OOXML `style` attribute value
    pub fn xlsx_name(&self) -> Option<&'static str> {
        match self {
            BorderLineStyle::None => None,
            BorderLineStyle::Hair => Some("hair"),
            BorderLineStyle::Thin => Some("thin"),
            BorderLineStyle::Medium => Some("medium"),
            BorderLineStyle::Thick => Some("thick"),
            BorderLineStyle::Dashed => Some("dashed"),
            BorderLineStyle::Dotted => Some("dotted"),
            BorderLineStyle::Double => Some("double"),
            BorderLineStyle::MediumDashed => Some("mediumDashed"),
            BorderLineStyle::DashDot => Some("dashDot"),
            BorderLineStyle::DashDotDot => Some("dashDotDot"),
        }
    }
}
