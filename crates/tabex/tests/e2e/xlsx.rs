//! Whole-pipeline exports inspected at the package level

use pretty_assertions::assert_eq;
use tabex::prelude::*;

use crate::common::{attribute_values, part_names, png_bytes, read_part};

fn report_layout() -> GridLayout {
    let mut layout = GridLayout::new(&[50.0, 50.0], &[15.0, 15.0]).with_name("Report");
    layout.place(
        GridRect::new(0, 0, 1, 0),
        ContentBox::text(Bounds::default(), "Quarterly"),
    );
    layout.set_background(0, 0, CellBackground::filled(Rgb::new(255, 255, 153)));
    layout.place(
        GridRect::single(0, 1),
        ContentBox::raw(Bounds::default(), RawValue::Number(42.0)),
    );
    layout
}

fn export_bytes(layouts: &[&GridLayout], config: ExportConfig) -> (Vec<u8>, ExportReport) {
    let mut out = Vec::new();
    let report = tabex::export_xlsx(layouts.iter().copied(), config, &mut out).unwrap();
    (out, report)
}

#[test]
fn test_extended_package() {
    let (bytes, report) = export_bytes(&[&report_layout()], ExportConfig::default());

    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert_eq!(attribute_values(&workbook, "sheet", "name"), vec!["Report"]);

    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert_eq!(attribute_values(&sheet, "mergeCell", "ref"), vec!["A1:B1"]);
    assert_eq!(attribute_values(&sheet, "row", "r"), vec!["1", "2"]);

    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(attribute_values(&styles, "fgColor", "rgb").contains(&"FFFFFF99".to_string()));
    assert!(!styles.contains("<indexedColors>"));
    assert!(report.is_clean());
}

#[test]
fn test_legacy_package_carries_palette() {
    let config = ExportConfig::default().with_variant(FormatVariant::Legacy);
    let (bytes, report) = export_bytes(&[&report_layout()], config);

    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(attribute_values(&styles, "fgColor", "indexed").contains(&"8".to_string()));
    let palette = attribute_values(&styles, "rgbColor", "rgb");
    assert_eq!(palette.len(), 64);
    assert_eq!(palette[8], "FFFFFF99");
    assert_eq!(report.palette_slots, Some(1));

    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert_eq!(attribute_values(&sheet, "mergeCell", "ref"), vec!["A1:B1"]);
}

#[test]
fn test_image_package_parts() {
    let mut layout = GridLayout::new(&[100.0], &[75.0]);
    layout.place(
        GridRect::single(0, 0),
        ContentBox::raw(
            Bounds::default(),
            RawValue::Image(ImageData::new(png_bytes(40, 30), 40, 30)),
        ),
    );

    let (bytes, _) = export_bytes(&[&layout], ExportConfig::default());
    let names = part_names(&bytes);

    assert!(names.contains(&"xl/media/image1.png".to_string()));
    assert!(names.contains(&"xl/drawings/drawing1.xml".to_string()));
    let drawing = read_part(&bytes, "xl/drawings/drawing1.xml");
    assert!(drawing.contains("twoCellAnchor"));
}

#[test]
fn test_several_sheets_in_one_package() {
    let first = report_layout();
    let second = report_layout().with_name("report");

    let (bytes, report) = export_bytes(&[&first, &second], ExportConfig::default());

    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert_eq!(
        attribute_values(&workbook, "sheet", "name"),
        vec!["Report", "report (2)"]
    );
    assert_eq!(report.sheets.len(), 2);
    assert!(part_names(&bytes).contains(&"xl/worksheets/sheet2.xml".to_string()));
}

#[test]
fn test_export_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    let report = tabex::export_xlsx_file([&report_layout()], ExportConfig::default(), &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(report.sheets, vec!["Report".to_string()]);
}
