//! Target-format limits and the degradations they cause

use tabex::prelude::*;
use tabex_core::{CellValue, WriterCommand, MAX_FORMULA_LEN};

use crate::common::{create_style_calls, export_recorded};

fn single_cell(content: ContentBox) -> GridLayout {
    let mut layout = GridLayout::new(&[60.0], &[15.0]);
    layout.place(GridRect::single(0, 0), content);
    layout
}

#[test]
fn test_unfinished_content_aborts_the_sheet() {
    let layout = single_cell(ContentBox::text(Bounds::default(), "pending").unfinished());
    let mut writer = RecordingWriter::new();
    let mut session = ExportSession::new(&mut writer, ExportConfig::default());

    let err = session.export_sheet(&layout).unwrap_err();

    assert!(matches!(
        err,
        ExportError::UnfinishedContent { col: 0, row: 0 }
    ));
}

#[test]
fn test_long_hyperlink_degrades_to_text() {
    let target = format!("https://example.com/{}", "a".repeat(MAX_FORMULA_LEN));
    let layout = single_cell(ContentBox::text(Bounds::default(), "Link").with_style(BoxStyle {
        href: Some(target),
        ..Default::default()
    }));

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(writer.cell_value(0, 0), Some(&CellValue::string("Link")));
    assert_eq!(report.count(Degradation::HyperlinkTooLong), 1);
}

#[test]
fn test_hyperlink_quotes_are_doubled() {
    let layout = single_cell(ContentBox::text(Bounds::default(), "say \"hi\"").with_style(BoxStyle {
        href: Some("https://example.com/?q=\"x\"".into()),
        ..Default::default()
    }));

    let (writer, _) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(
        writer.cell_value(0, 0),
        Some(&CellValue::formula(
            "HYPERLINK(\"https://example.com/?q=\"\"x\"\"\",\"say \"\"hi\"\"\")"
        ))
    );
}

#[test]
fn test_long_formula_keeps_the_value() {
    let formula = format!("={}", "1+".repeat(MAX_FORMULA_LEN) + "1");
    let layout = single_cell(
        ContentBox::raw(Bounds::default(), RawValue::Number(7.0)).with_style(BoxStyle {
            formula: Some(formula),
            ..Default::default()
        }),
    );

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(writer.cell_value(0, 0), Some(&CellValue::Number(7.0)));
    assert_eq!(report.count(Degradation::FormulaTooLong), 1);
}

#[test]
fn test_long_header_footer_is_dropped() {
    let layout = GridLayout::new(&[60.0], &[15.0]).with_header_footer("h".repeat(200), "f".repeat(55));

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());

    assert!(!writer
        .commands()
        .iter()
        .any(|c| matches!(c, WriterCommand::SetHeaderFooter { .. })));
    assert_eq!(report.count(Degradation::HeaderFooterTooLong), 1);
}

#[test]
fn test_header_footer_under_limit_is_kept() {
    let layout = GridLayout::new(&[60.0], &[15.0]).with_header_footer("h".repeat(200), "f".repeat(54));

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());

    assert!(writer
        .commands()
        .iter()
        .any(|c| matches!(c, WriterCommand::SetHeaderFooter { .. })));
    assert!(report.is_clean());
}

#[test]
fn test_hard_style_limit_refuses_new_styles() {
    let colors = [
        Rgb::RED,
        Rgb::GREEN,
        Rgb::BLUE,
        Rgb::YELLOW,
        Rgb::new(10, 20, 30),
    ];
    let mut layout = GridLayout::new(&[20.0; 5], &[15.0]);
    for (col, color) in colors.iter().enumerate() {
        layout.set_background(col as u32, 0, CellBackground::filled(*color));
    }

    let config = ExportConfig::default().with_style_limit(StyleLimit::Hard(3));
    let (writer, report) = export_recorded(&[&layout], config);

    assert_eq!(create_style_calls(&writer), 3);
    assert_eq!(report.styles.refusals, 2);
    assert_eq!(writer.cell_style(3, 0), None);
    assert_eq!(writer.cell_style(4, 0), None);
    assert_eq!(report.count(Degradation::StyleLimitReached), 2);
}

#[test]
fn test_soft_style_limit_warns_once() {
    let mut layout = GridLayout::new(&[20.0; 4], &[15.0]);
    for col in 0..4u8 {
        layout.set_background(col as u32, 0, CellBackground::filled(Rgb::new(col, 0, 0)));
    }

    let config = ExportConfig::default().with_style_limit(StyleLimit::Soft(2));
    let (writer, report) = export_recorded(&[&layout], config);

    assert_eq!(create_style_calls(&writer), 4);
    assert_eq!(report.count(Degradation::StyleLimitReached), 1);
}

#[test]
fn test_exhausted_palette_is_reported() {
    let mut layout = GridLayout::new(&[10.0; 60], &[15.0]);
    for col in 0..60u32 {
        let shade = (col * 4) as u8;
        layout.set_background(col, 0, CellBackground::filled(Rgb::new(shade, 255 - shade, 17)));
    }

    let config = ExportConfig::default().with_variant(FormatVariant::Legacy);
    let (writer, report) = export_recorded(&[&layout], config);

    assert_eq!(report.palette_slots, Some(56));
    assert!(report.count(Degradation::PaletteExhausted) > 0);
    assert_eq!(writer.palette().map(<[Rgb]>::len), Some(64));
}

#[test]
fn test_overlapping_box_is_reported() {
    let mut layout = GridLayout::new(&[40.0, 40.0], &[15.0]);
    layout
        .place(
            GridRect::single(0, 0),
            ContentBox::raw(Bounds::default(), RawValue::Number(1.0)),
        )
        .place(
            GridRect::new(0, 0, 1, 0),
            ContentBox::raw(Bounds::default(), RawValue::Number(2.0)),
        );

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(writer.cell_value(0, 0), Some(&CellValue::Number(1.0)));
    assert_eq!(writer.cell_value(1, 0), None);
    assert!(writer.merged_regions().is_empty());
    assert_eq!(report.count(Degradation::OverlappingContent), 1);
}
