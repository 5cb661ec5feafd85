//! styles.xml generation
//!
//! Style handles issued by the writer map to `cellXfs` entries shifted by one,
//! since xf 0 is the mandatory default. Font handles are shifted the same way.
//! Fills and borders are deduplicated here because several styles usually
//! share them.

use std::collections::HashMap;

use quick_xml::escape::escape;
use tabex_core::style::number_format::FIRST_CUSTOM_FORMAT_ID;
use tabex_core::{
    BorderEdge, ColorRef, FontSpec, HorizontalAlignment, Rgb, StyleAttributes, Underline,
    VerticalAlignment,
};

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BorderKey {
    left: Option<BorderEdge>,
    right: Option<BorderEdge>,
    top: Option<BorderEdge>,
    bottom: Option<BorderEdge>,
}

impl BorderKey {
    fn of(style: &StyleAttributes) -> Self {
        Self {
            left: style.left,
            right: style.right,
            top: style.top,
            bottom: style.bottom,
        }
    }

    fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

/// Everything styles.xml is built from
pub(crate) struct XlsxStyleTable<'a> {
    pub(crate) fonts: &'a [FontSpec],
    pub(crate) custom_formats: &'a [(u32, String)],
    pub(crate) styles: &'a [StyleAttributes],
    pub(crate) palette: Option<&'a [Rgb]>,
}

impl XlsxStyleTable<'_> {
    /// `s` attribute value for a style handle
    pub(crate) fn xf_id(handle: u32) -> u32 {
        handle + 1
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fill_ids: HashMap<ColorRef, u32> = HashMap::new();
        // The first two fills are fixed: none and gray125
        let mut fills: Vec<ColorRef> = Vec::new();

        let mut border_ids: HashMap<BorderKey, u32> = HashMap::new();
        let mut borders: Vec<BorderKey> = Vec::new();

        let mut resolved: Vec<ResolvedXfIds> = Vec::with_capacity(self.styles.len());
        for style in self.styles {
            let fill_id = match style.fill {
                None => 0,
                Some(color) => *fill_ids.entry(color).or_insert_with(|| {
                    fills.push(color);
                    fills.len() as u32 + 1
                }),
            };

            let key = BorderKey::of(style);
            let border_id = if key.is_empty() {
                0
            } else if let Some(&id) = border_ids.get(&key) {
                id
            } else {
                borders.push(key.clone());
                let id = borders.len() as u32;
                border_ids.insert(key, id);
                id
            };

            resolved.push(ResolvedXfIds {
                font_id: style.font.map(|f| f.0 + 1).unwrap_or(0),
                fill_id,
                border_id,
                num_fmt_id: style.number_format.map(|n| n.0).unwrap_or(0),
            });
        }

        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        let custom: Vec<_> = self
            .custom_formats
            .iter()
            .filter(|(id, _)| *id >= FIRST_CUSTOM_FORMAT_ID)
            .collect();
        if !custom.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", custom.len()));
            for (id, code) in custom {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape(code.as_str())
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        // Fonts
        xml.push_str(&format!("\n  <fonts count=\"{}\">", self.fonts.len() + 1));
        xml.push_str("\n    ");
        xml.push_str(&write_font(&FontSpec::default()));
        for font in self.fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        // Fills
        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len() + 2));
        xml.push_str("\n    <fill><patternFill patternType=\"none\"/></fill>");
        xml.push_str("\n    <fill><patternFill patternType=\"gray125\"/></fill>");
        for color in &fills {
            xml.push_str(&format!(
                "\n    <fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
                write_color("fgColor", color)
            ));
        }
        xml.push_str("\n  </fills>");

        // Borders
        xml.push_str(&format!("\n  <borders count=\"{}\">", borders.len() + 1));
        xml.push_str("\n    <border><left/><right/><top/><bottom/><diagonal/></border>");
        for border in &borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        // cellXfs, index 0 is the default appearance
        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len() + 1));
        xml.push_str("\n    <xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/>");
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>"#,
        );

        if let Some(palette) = self.palette {
            xml.push_str("\n  <colors>\n    <indexedColors>");
            for rgb in palette {
                xml.push_str(&format!("\n      <rgbColor rgb=\"{}\"/>", rgb.to_argb_hex()));
            }
            xml.push_str("\n    </indexedColors>\n  </colors>");
        }

        xml.push_str("\n</styleSheet>");
        xml
    }
}

pub(crate) fn color_attrs(color: &ColorRef) -> String {
    match color {
        ColorRef::Auto => " auto=\"1\"".to_string(),
        ColorRef::Indexed(i) => format!(" indexed=\"{}\"", i),
        ColorRef::Rgb(rgb) => format!(" rgb=\"{}\"", rgb.to_argb_hex()),
    }
}

fn write_color(tag: &str, color: &ColorRef) -> String {
    format!("<{tag}{}/>", color_attrs(color))
}

fn write_font(font: &FontSpec) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    match font.underline {
        Underline::None => {}
        Underline::Single => s.push_str("<u/>"),
        Underline::Double => s.push_str("<u val=\"double\"/>"),
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape(font.name.as_str())));
    s.push_str("</font>");
    s
}

/// Run properties for an inline rich-text run
pub(crate) fn write_run_properties(font: &FontSpec) -> String {
    let mut s = String::from("<rPr>");
    s.push_str(&format!("<rFont val=\"{}\"/>", escape(font.name.as_str())));
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    match font.underline {
        Underline::None => {}
        Underline::Single => s.push_str("<u/>"),
        Underline::Double => s.push_str("<u val=\"double\"/>"),
    }
    s.push_str("</rPr>");
    s
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge.as_ref().and_then(|e| e.style.xlsx_name().map(|name| (name, e))) {
        None => format!("<{tag}/>"),
        Some((name, e)) => format!(
            "<{tag} style=\"{name}\">{}</{tag}>",
            write_color("color", &e.color)
        ),
    }
}

fn write_border(border: &BorderKey) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/></border>");
    s
}

fn write_alignment(style: &StyleAttributes) -> String {
    if !style.has_alignment() {
        return String::new();
    }

    let mut s = String::from("<alignment");
    if style.horizontal != HorizontalAlignment::default() {
        s.push_str(&format!(" horizontal=\"{}\"", style.horizontal.xlsx_name()));
    }
    if style.vertical != VerticalAlignment::default() {
        s.push_str(&format!(" vertical=\"{}\"", style.vertical.xlsx_name()));
    }
    if style.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if let Some(rotation) = style.rotation {
        s.push_str(&format!(" textRotation=\"{}\"", ooxml_rotation(rotation)));
    }
    s.push_str("/>");
    s
}

/// Map signed degrees to the file encoding (negative angles become 91..=180)
fn ooxml_rotation(degrees: i16) -> i16 {
    match degrees {
        255 => 255,
        d if d < 0 => 90 - d.max(-90),
        d => d.min(90),
    }
}

fn write_xf(style: &StyleAttributes, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if ids.font_id != 0 {
        attrs.push_str(" applyFont=\"1\"");
    }
    if ids.fill_id != 0 {
        attrs.push_str(" applyFill=\"1\"");
    }
    if ids.border_id != 0 {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if style.has_alignment() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );

    let alignment_xml = write_alignment(style);
    if alignment_xml.is_empty() {
        s.push_str("/>");
    } else {
        s.push('>');
        s.push_str(&alignment_xml);
        s.push_str("</xf>");
    }
    s
}
