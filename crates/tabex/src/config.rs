//! Export configuration
//!
//! [`ExportConfig`] can be built in code, deserialized with serde, or parsed
//! from the flat key/value form used by report properties:
//!
//! ```rust
//! use tabex::config::{ExportConfig, FormatVariant, StyleLimit};
//!
//! let config = ExportConfig::from_properties([
//!     ("format-variant", "legacy"),
//!     ("style-limit", "hard:500"),
//!     ("freeze-rows", "1"),
//! ])
//! .unwrap();
//!
//! assert_eq!(config.variant, FormatVariant::Legacy);
//! assert_eq!(config.style_limit, StyleLimit::Hard(500));
//! assert_eq!(config.freeze_rows, 1);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tabex_core::{PrintSetup, STYLE_SOFT_LIMIT};

use crate::error::ConfigError;

/// Default multiplier from points to 1/256ths of a character
pub const DEFAULT_CELL_WIDTH_SCALE: u32 = 50;

/// Target file variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVariant {
    /// 64-entry indexed palette
    Legacy,
    /// Direct RGB colors
    #[default]
    Extended,
}

impl FormatVariant {
    /// Resolution image pixel sizes are interpreted at
    pub fn reference_dpi(&self) -> f64 {
        match self {
            FormatVariant::Legacy => 72.0,
            FormatVariant::Extended => 96.0,
        }
    }
}

impl FromStr for FormatVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(FormatVariant::Legacy),
            "extended" => Ok(FormatVariant::Extended),
            other => Err(format!("expected 'legacy' or 'extended', got '{other}'")),
        }
    }
}

/// How the legacy palette assigns slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorStrategy {
    /// Rewrite free slots with the exact colors used
    #[default]
    Dynamic,
    /// Keep the standard palette and map to the nearest entry
    Static,
}

impl FromStr for ColorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamic" => Ok(ColorStrategy::Dynamic),
            "static" => Ok(ColorStrategy::Static),
            other => Err(format!("expected 'dynamic' or 'static', got '{other}'")),
        }
    }
}

/// Distinct-style ceiling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StyleLimit {
    /// Warn once at the ceiling, keep creating styles
    Soft(usize),
    /// Leave styles past the ceiling unapplied, counting each refusal
    Hard(usize),
}

impl StyleLimit {
    /// The ceiling value
    pub fn threshold(&self) -> usize {
        match self {
            StyleLimit::Soft(n) | StyleLimit::Hard(n) => *n,
        }
    }
}

impl Default for StyleLimit {
    fn default() -> Self {
        StyleLimit::Soft(STYLE_SOFT_LIMIT)
    }
}

impl FromStr for StyleLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, count) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| "expected 'soft:N' or 'hard:N'".to_string())?;
        let count: usize = count
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a style count", count.trim()))?;
        match mode.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(StyleLimit::Soft(count)),
            "hard" => Ok(StyleLimit::Hard(count)),
            other => Err(format!("unknown limit mode '{other}'")),
        }
    }
}

impl TryFrom<String> for StyleLimit {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for StyleLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleLimit::Soft(n) => write!(f, "soft:{n}"),
            StyleLimit::Hard(n) => write!(f, "hard:{n}"),
        }
    }
}

/// Everything that tunes one export
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExportConfig {
    /// Target file variant
    #[serde(rename = "format-variant")]
    pub variant: FormatVariant,
    /// Points to 1/256ths of a character
    pub cell_width_scale: u32,
    /// Legacy palette strategy
    pub color_strategy: ColorStrategy,
    /// Distinct-style ceiling
    pub style_limit: StyleLimit,
    /// Page and print options
    #[serde(flatten)]
    pub print: PrintSetup,
    /// Number of frozen leading rows
    pub freeze_rows: u32,
    /// Number of frozen leading columns
    pub freeze_columns: u32,
    /// Correct image sizes for the device resolution
    pub image_resolution_aware: bool,
    /// Device resolution assumed for images that carry none
    pub device_resolution: Option<f64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            variant: FormatVariant::default(),
            cell_width_scale: DEFAULT_CELL_WIDTH_SCALE,
            color_strategy: ColorStrategy::default(),
            style_limit: StyleLimit::default(),
            print: PrintSetup::default(),
            freeze_rows: 0,
            freeze_columns: 0,
            image_resolution_aware: true,
            device_resolution: None,
        }
    }
}

impl ExportConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target variant
    pub fn with_variant(mut self, variant: FormatVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the column width scale
    pub fn with_cell_width_scale(mut self, scale: u32) -> Self {
        self.cell_width_scale = scale;
        self
    }

    /// Set the legacy palette strategy
    pub fn with_color_strategy(mut self, strategy: ColorStrategy) -> Self {
        self.color_strategy = strategy;
        self
    }

    /// Set the style ceiling policy
    pub fn with_style_limit(mut self, limit: StyleLimit) -> Self {
        self.style_limit = limit;
        self
    }

    /// Set print options
    pub fn with_print_setup(mut self, print: PrintSetup) -> Self {
        self.print = print;
        self
    }

    /// Freeze leading rows and columns
    pub fn with_freeze(mut self, rows: u32, columns: u32) -> Self {
        self.freeze_rows = rows;
        self.freeze_columns = columns;
        self
    }

    /// Toggle device-resolution correction for images
    pub fn with_image_resolution_aware(mut self, aware: bool) -> Self {
        self.image_resolution_aware = aware;
        self
    }

    /// Parse the flat key/value form, starting from the defaults
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            config.set(key.as_ref(), value.as_ref())?;
        }
        Ok(config)
    }

    /// Apply a single key/value pair
    ///
    /// Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = key.trim();
        let value = value.trim();
        match key {
            "format-variant" => self.variant = parse(key, value)?,
            "cell-width-scale" => {
                self.cell_width_scale = parse_ranged(key, value, 1, 10_000)? as u32
            }
            "color-strategy" => self.color_strategy = parse(key, value)?,
            "style-limit" => self.style_limit = parse(key, value)?,
            "paper-size" => self.print.paper_size = parse(key, value)?,
            "orientation" => self.print.orientation = parse(key, value)?,
            "print-scale" => self.print.scale = parse_ranged(key, value, 10, 400)? as u16,
            "resolution" => {
                self.print.resolution = Some(parse_ranged(key, value, 1, u16::MAX as i64)? as u16)
            }
            "gridlines-displayed" => self.print.gridlines_displayed = parse_bool(key, value)?,
            "gridlines-printed" => self.print.gridlines_printed = parse_bool(key, value)?,
            "print-notes" => self.print.print_notes = parse_bool(key, value)?,
            "use-first-page-number" => {
                self.print.use_first_page_number = parse_bool(key, value)?
            }
            "first-page-number" => {
                self.print.first_page_number = parse_ranged(key, value, 0, u16::MAX as i64)? as u16
            }
            "draft" => self.print.draft = parse_bool(key, value)?,
            "freeze-rows" => self.freeze_rows = parse_ranged(key, value, 0, u32::MAX as i64)? as u32,
            "freeze-columns" => {
                self.freeze_columns = parse_ranged(key, value, 0, u32::MAX as i64)? as u32
            }
            "image-resolution-aware" => self.image_resolution_aware = parse_bool(key, value)?,
            "device-resolution" => {
                let dpi: f64 = value
                    .parse()
                    .map_err(|_| ConfigError::invalid(key, value, "expected a number"))?;
                if dpi.is_nan() || dpi <= 0.0 {
                    return Err(ConfigError::invalid(key, value, "must be positive"));
                }
                self.device_resolution = Some(dpi);
            }
            _ => log::debug!("ignoring unknown export property '{key}'"),
        }
        Ok(())
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, value, e.to_string()))
}

fn parse_ranged(key: &str, value: &str, min: i64, max: i64) -> Result<i64, ConfigError> {
    let n: i64 = value
        .parse()
        .map_err(|_| ConfigError::invalid(key, value, "expected an integer"))?;
    if n < min || n > max {
        return Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value: n,
            min,
            max,
        });
    }
    Ok(n)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabex_core::{Orientation, PaperSize};

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.variant, FormatVariant::Extended);
        assert_eq!(config.cell_width_scale, 50);
        assert_eq!(config.style_limit, StyleLimit::Soft(4000));
        assert_eq!(config.color_strategy, ColorStrategy::Dynamic);
    }

    #[test]
    fn test_all_print_keys() {
        let config = ExportConfig::from_properties([
            ("paper-size", "a4"),
            ("orientation", "landscape"),
            ("print-scale", "80"),
            ("resolution", "600"),
            ("gridlines-displayed", "false"),
            ("gridlines-printed", "yes"),
            ("print-notes", "1"),
            ("use-first-page-number", "true"),
            ("draft", "on"),
        ])
        .unwrap();

        assert_eq!(config.print.paper_size, PaperSize::A4);
        assert_eq!(config.print.orientation, Orientation::Landscape);
        assert_eq!(config.print.scale, 80);
        assert_eq!(config.print.resolution, Some(600));
        assert!(!config.print.gridlines_displayed);
        assert!(config.print.gridlines_printed);
        assert!(config.print.print_notes);
        assert!(config.print.use_first_page_number);
        assert!(config.print.draft);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = ExportConfig::from_properties([("sparkles", "lots")]).unwrap();
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_malformed_values() {
        assert!(matches!(
            ExportConfig::from_properties([("style-limit", "4000")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ExportConfig::from_properties([("print-scale", "900")]),
            Err(ConfigError::OutOfRange { value: 900, .. })
        ));
        assert!(matches!(
            ExportConfig::from_properties([("draft", "maybe")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ExportConfig::from_properties([("device-resolution", "-3")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_deserialize_json() {
        let config: ExportConfig = serde_json::from_str(
            r#"{"format-variant": "legacy", "style-limit": "hard:10", "paper-size": "legal", "freeze-rows": 2}"#,
        )
        .unwrap();

        assert_eq!(config.variant, FormatVariant::Legacy);
        assert_eq!(config.style_limit, StyleLimit::Hard(10));
        assert_eq!(config.print.paper_size, PaperSize::Legal);
        assert_eq!(config.freeze_rows, 2);
        assert_eq!(config.cell_width_scale, 50);
    }
}
