//! Drawing parts for anchored pictures

use tabex_core::{AnchorPoint, ImageAnchor, PictureFormat, PictureId};

/// EMUs per screen pixel at 96 dpi
const EMU_PER_PIXEL: f64 = 9525.0;
/// EMUs per point
const EMU_PER_POINT: f64 = 12700.0;

/// A picture placed on one sheet
pub(crate) struct PlacedPicture {
    pub(crate) picture: PictureId,
    pub(crate) format: PictureFormat,
    pub(crate) anchor: ImageAnchor,
}

/// Package path of a registered picture
pub(crate) fn media_path(picture: PictureId, format: PictureFormat) -> String {
    format!("xl/media/image{}.{}", picture.0 + 1, format.extension())
}

/// Width in pixels of a column given its width in 1/256ths of a character
pub(crate) fn column_pixels(width: Option<u32>) -> f64 {
    match width {
        // Maximum digit width of the default font is 7px, plus 5px padding
        Some(w) => (w as f64 / 256.0 * 7.0 + 5.0).round(),
        None => 64.0,
    }
}

fn point_xml(tag: &str, point: &AnchorPoint, col_px: f64, row_pt: f64) -> String {
    let col_off = (point.dx_fraction() * col_px * EMU_PER_PIXEL).round() as i64;
    let row_off = (point.dy_fraction() * row_pt * EMU_PER_POINT).round() as i64;
    format!(
        "\n    <xdr:{tag}><xdr:col>{}</xdr:col><xdr:colOff>{}</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>{}</xdr:rowOff></xdr:{tag}>",
        point.col, col_off, point.row, row_off
    )
}

/// Build `xl/drawings/drawingN.xml`
///
/// `col_px` and `row_pt` give the native size of a column in pixels and of a
/// row in points; anchor offsets are fractions of those.
pub(crate) fn drawing_xml(
    pictures: &[PlacedPicture],
    col_px: impl Fn(u32) -> f64,
    row_pt: impl Fn(u32) -> f64,
) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    for (i, placed) in pictures.iter().enumerate() {
        let from = &placed.anchor.from;
        let to = &placed.anchor.to;
        xml.push_str("\n  <xdr:twoCellAnchor editAs=\"oneCell\">");
        xml.push_str(&point_xml("from", from, col_px(from.col), row_pt(from.row)));
        xml.push_str(&point_xml("to", to, col_px(to.col), row_pt(to.row)));
        xml.push_str(&format!(
            r#"
    <xdr:pic>
      <xdr:nvPicPr><xdr:cNvPr id="{}" name="Picture {}"/><xdr:cNvPicPr><a:picLocks noChangeAspect="1"/></xdr:cNvPicPr></xdr:nvPicPr>
      <xdr:blipFill><a:blip r:embed="rId{}"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>
      <xdr:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></xdr:spPr>
    </xdr:pic>
    <xdr:clientData/>
  </xdr:twoCellAnchor>"#,
            i + 2,
            i + 1,
            i + 1
        ));
    }

    xml.push_str("\n</xdr:wsDr>");
    xml
}

/// Build `xl/drawings/_rels/drawingN.xml.rels`
pub(crate) fn drawing_rels_xml(pictures: &[PlacedPicture]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, placed) in pictures.iter().enumerate() {
        xml.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image{}.{}"/>"#,
            i + 1,
            placed.picture.0 + 1,
            placed.format.extension()
        ));
    }
    xml.push_str("\n</Relationships>");
    xml
}
