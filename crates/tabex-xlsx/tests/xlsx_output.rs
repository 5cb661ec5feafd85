//! Package-level checks of the XLSX writer output

use std::io::{Cursor, Read};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tabex_core::{
    AnchorPoint, CellValue, ColorRef, FontSpec, GridRect, ImageAnchor, PictureFormat, PrintSetup,
    Rgb, RichString, RichTextRun, SheetWriter, StyleAttributes, STANDARD_PALETTE,
};
use tabex_xlsx::XlsxSheetWriter;

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut s = String::new();
    file.read_to_string(&mut s).unwrap();
    s
}

fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(|s| s.to_string()).collect()
}

/// Collect the values of `attr` on every element named `tag`
fn attribute_values(xml: &str, tag: &str, attr: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut out = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == tag.as_bytes() => {
                if let Some(a) = e.try_get_attribute(attr).unwrap() {
                    out.push(a.unescape_value().unwrap().into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    out
}

/// Concatenated text of every `<t>` element
fn text_content(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = Vec::new();
    let mut in_t = false;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"t" => in_t = true,
            Event::End(e) if e.name().as_ref() == b"t" => in_t = false,
            Event::Text(t) if in_t => out.push(t.unescape().unwrap().into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }
    out
}

fn sample_writer() -> XlsxSheetWriter {
    let mut writer = XlsxSheetWriter::new();
    let style = writer.create_style(&StyleAttributes {
        fill: Some(ColorRef::Rgb(Rgb::new(255, 255, 153))),
        ..Default::default()
    });

    writer.create_sheet("Report");
    writer.set_column_width(0, 20 * 256);
    writer.create_row(0, 18.0);
    writer.set_cell_value(0, 0, CellValue::string("Q1 & Q2"));
    writer.set_cell_style(0, 0, style);
    writer.set_cell_style(1, 0, style);
    writer.add_merged_region(GridRect::new(0, 0, 1, 0));
    writer.create_row(1, 15.0);
    writer.set_cell_value(0, 1, CellValue::Number(42.5));
    writer.set_cell_value(1, 1, CellValue::Boolean(true));
    writer.set_cell_value(2, 1, CellValue::formula("SUM(A2:B2)"));
    writer.close_sheet();
    writer
}

#[test]
fn test_package_contains_required_parts() {
    let bytes = sample_writer().to_bytes().unwrap();
    let names = part_names(&bytes);

    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/styles.xml",
        "xl/worksheets/sheet1.xml",
    ] {
        assert!(names.iter().any(|n| n == part), "missing {part}");
    }
}

#[test]
fn test_cells_and_merges() {
    let bytes = sample_writer().to_bytes().unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");

    assert_eq!(attribute_values(&sheet, "mergeCell", "ref"), vec!["A1:B1"]);
    assert_eq!(
        attribute_values(&sheet, "c", "r"),
        vec!["A1", "B1", "A2", "B2", "C2"]
    );
    assert_eq!(attribute_values(&sheet, "c", "s"), vec!["1", "1"]);
    assert_eq!(attribute_values(&sheet, "row", "ht"), vec!["18", "15"]);
    assert_eq!(text_content(&sheet), vec!["Q1 & Q2"]);
    assert!(sheet.contains("<f>SUM(A2:B2)</f>"));
    assert!(sheet.contains("t=\"b\"><v>1</v>"));
    assert!(sheet.contains("<col min=\"1\" max=\"1\" width=\"20\" customWidth=\"1\"/>"));
}

#[test]
fn test_fill_round_trips_as_rgb() {
    let bytes = sample_writer().to_bytes().unwrap();
    let styles = read_part(&bytes, "xl/styles.xml");

    assert_eq!(attribute_values(&styles, "fgColor", "rgb"), vec!["FFFFFF99"]);
    assert_eq!(attribute_values(&styles, "xf", "fillId").last().unwrap(), "2");
}

#[test]
fn test_rich_text_runs() {
    let mut writer = XlsxSheetWriter::new();
    let plain = writer.register_font(&FontSpec::default());
    let bold = writer.register_font(&FontSpec::default().with_bold(true));

    writer.create_sheet("Rich");
    writer.set_cell_value(
        0,
        0,
        CellValue::Rich(RichString::new(
            "Hello world",
            vec![RichTextRun::new(0, plain), RichTextRun::new(6, bold)],
        )),
    );
    writer.close_sheet();

    let bytes = writer.to_bytes().unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");

    assert_eq!(text_content(&sheet), vec!["Hello ", "world"]);
    assert_eq!(sheet.matches("<b/>").count(), 1);
    assert_eq!(attribute_values(&sheet, "rFont", "val"), vec!["Calibri", "Calibri"]);
}

#[test]
fn test_dates_are_serial_numbers() {
    let mut writer = XlsxSheetWriter::new();
    writer.create_sheet("Dates");
    let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    writer.set_cell_value(0, 0, CellValue::Date(dt));

    let bytes = writer.to_bytes().unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<v>45292.5</v>"));
}

#[test]
fn test_print_setup_freeze_and_header() {
    let mut writer = XlsxSheetWriter::new();
    writer.create_sheet("Print");
    writer.set_print_setup(&PrintSetup {
        paper_size: "a4".parse().unwrap(),
        orientation: "landscape".parse().unwrap(),
        gridlines_displayed: false,
        gridlines_printed: true,
        resolution: Some(300),
        ..Default::default()
    });
    writer.freeze_panes(1, 2);
    writer.set_header_footer("Sales & Costs", "Page");

    let bytes = writer.to_bytes().unwrap();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");

    assert_eq!(attribute_values(&sheet, "pageSetup", "paperSize"), vec!["9"]);
    assert_eq!(
        attribute_values(&sheet, "pageSetup", "orientation"),
        vec!["landscape"]
    );
    assert_eq!(attribute_values(&sheet, "pageSetup", "horizontalDpi"), vec!["300"]);
    assert_eq!(attribute_values(&sheet, "printOptions", "gridLines"), vec!["1"]);
    assert_eq!(attribute_values(&sheet, "sheetView", "showGridLines"), vec!["0"]);
    assert_eq!(attribute_values(&sheet, "pane", "topLeftCell"), vec!["C2"]);
    assert!(sheet.contains("<oddHeader>&amp;CSales &amp;&amp; Costs</oddHeader>"));
}

#[test]
fn test_indexed_palette_is_written() {
    let mut writer = XlsxSheetWriter::new();
    let mut palette = STANDARD_PALETTE.to_vec();
    palette[8] = Rgb::new(255, 255, 153);
    writer.set_palette(&palette);
    writer.create_style(&StyleAttributes {
        fill: Some(ColorRef::Indexed(8)),
        ..Default::default()
    });
    writer.create_sheet("Legacy");

    let bytes = writer.to_bytes().unwrap();
    let styles = read_part(&bytes, "xl/styles.xml");

    let colors = attribute_values(&styles, "rgbColor", "rgb");
    assert_eq!(colors.len(), 64);
    assert_eq!(colors[8], "FFFFFF99");
    assert_eq!(attribute_values(&styles, "fgColor", "indexed"), vec!["8"]);
}

#[test]
fn test_pictures_get_drawing_parts() {
    let mut writer = XlsxSheetWriter::new();
    writer.create_sheet("Pictures");
    let id = writer.register_picture(vec![0x89, b'P', b'N', b'G'], PictureFormat::Png);
    writer.create_anchored_picture(
        id,
        ImageAnchor::new(AnchorPoint::new(1, 1, 0, 0), AnchorPoint::new(2, 3, 512, 128)),
    );

    let bytes = writer.to_bytes().unwrap();
    let names = part_names(&bytes);
    for part in [
        "xl/media/image1.png",
        "xl/drawings/drawing1.xml",
        "xl/drawings/_rels/drawing1.xml.rels",
        "xl/worksheets/_rels/sheet1.xml.rels",
    ] {
        assert!(names.iter().any(|n| n == part), "missing {part}");
    }

    let content_types = read_part(&bytes, "[Content_Types].xml");
    assert!(content_types.contains("Extension=\"png\""));
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<drawing r:id=\"rId1\"/>"));
}

#[test]
fn test_write_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    sample_writer().write_file(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_serialize_through_trait() {
    let mut writer = sample_writer();
    let mut out = Vec::new();
    SheetWriter::serialize(&mut writer, &mut out).unwrap();
    assert!(part_names(&out).contains(&"xl/workbook.xml".to_string()));
}
