//! Concrete export scenarios checked on the recorded writer commands

use chrono::NaiveDate;
use tabex::image::{ImageEmbedder, ImageFlags, PlacementRect};
use tabex::prelude::*;
use tabex::Diagnostics;
use tabex_core::{AnchorPoint, CellValue, ColorRef, PictureFormat, WriterCommand, STANDARD_PALETTE};

use crate::common::{create_style_calls, export_recorded, png_bytes};

fn merged_title(fill: Rgb) -> GridLayout {
    let mut layout = GridLayout::new(&[50.0, 50.0], &[15.0]);
    layout.place(
        GridRect::new(0, 0, 1, 0),
        ContentBox::text(Bounds::default(), "Total"),
    );
    layout.set_background(0, 0, CellBackground::filled(fill));
    layout
}

#[test]
fn test_round_trip_extended_variant() {
    let yellow = Rgb::new(255, 255, 153);
    let (writer, report) = export_recorded(&[&merged_title(yellow)], ExportConfig::default());

    assert_eq!(writer.merged_regions(), vec![GridRect::new(0, 0, 1, 0)]);
    let style = writer.style(writer.cell_style(0, 0).unwrap()).unwrap();
    assert_eq!(style.fill, Some(ColorRef::Rgb(yellow)));
    assert_eq!(writer.rows(), vec![0]);
    assert!(report.is_clean());
}

#[test]
fn test_round_trip_legacy_variant() {
    let yellow = Rgb::new(255, 255, 153);
    for strategy in [ColorStrategy::Dynamic, ColorStrategy::Static] {
        let config = ExportConfig::default()
            .with_variant(FormatVariant::Legacy)
            .with_color_strategy(strategy);
        let (writer, _) = export_recorded(&[&merged_title(yellow)], config);

        let style = writer.style(writer.cell_style(0, 0).unwrap()).unwrap();
        let Some(ColorRef::Indexed(index)) = style.fill else {
            panic!("legacy fills must be indexed, got {:?}", style.fill);
        };
        let palette = writer.palette().unwrap();
        assert_eq!(palette.len(), 64);
        assert_eq!(palette[index as usize], yellow, "{strategy:?}");
        assert_eq!(writer.merged_regions(), vec![GridRect::new(0, 0, 1, 0)]);
        assert_eq!(writer.rows(), vec![0]);
    }
}

#[test]
fn test_static_strategy_keeps_standard_palette() {
    let config = ExportConfig::default()
        .with_variant(FormatVariant::Legacy)
        .with_color_strategy(ColorStrategy::Static);
    let (writer, report) = export_recorded(&[&merged_title(Rgb::new(250, 250, 150))], config);

    assert_eq!(writer.palette().unwrap(), &STANDARD_PALETTE[..]);
    assert_eq!(report.palette_slots, Some(0));
}

#[test]
fn test_image_scaled_into_cell() {
    let grid = GridLayout::new(&[200.0, 50.0], &[150.0, 50.0]);
    let image = ImageData::new(png_bytes(800, 600), 800, 600);
    let flags = ImageFlags {
        scale_to_fit: true,
        keep_aspect_ratio: true,
        ..Default::default()
    };

    let embedded = ImageEmbedder::new(FormatVariant::Extended.reference_dpi())
        .embed(
            &image,
            &PlacementRect::new(0.0, 0.0, 200.0, 150.0),
            &flags,
            &grid,
            &mut Diagnostics::new(),
        )
        .unwrap();

    assert_eq!(embedded.placement, PlacementRect::new(0.0, 0.0, 200.0, 150.0));
    assert_eq!(embedded.span, GridRect::single(0, 0));
    assert_eq!(embedded.bytes, image.bytes);
}

#[test]
fn test_image_box_is_anchored_not_merged() {
    let mut layout = GridLayout::new(&[200.0, 50.0], &[150.0, 50.0]);
    let style = BoxStyle {
        scale_to_fit: true,
        ..Default::default()
    };
    layout.place(
        GridRect::single(0, 0),
        ContentBox::raw(
            Bounds::default(),
            RawValue::Image(ImageData::new(png_bytes(800, 600), 800, 600)),
        )
        .with_style(style),
    );

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());
    let pictures = writer.anchored_pictures();

    assert_eq!(pictures.len(), 1);
    let (id, anchor) = pictures[0];
    assert_eq!(anchor.span(), GridRect::single(0, 0));
    assert_eq!(anchor.from, AnchorPoint::new(0, 0, 0, 0));
    assert_eq!(anchor.to, AnchorPoint::new(0, 0, 1024, 256));
    assert_eq!(writer.picture(id).map(|(format, _)| format), Some(PictureFormat::Png));
    assert!(writer.merged_regions().is_empty());
    assert_eq!(writer.cell_value(0, 0), None);
    assert!(report.is_clean());
}

#[test]
fn test_invalid_sheet_name_falls_back() {
    let layout = merged_title(Rgb::WHITE).with_name("Q1/Sales");
    let mut out = Vec::new();

    let report = tabex::export_xlsx([&layout], ExportConfig::default(), &mut out).unwrap();

    assert_eq!(report.sheets.len(), 1);
    assert!(!report.sheets[0].contains('/'));
    assert_eq!(report.sheets[0], "Sheet1");
    assert_eq!(report.count(Degradation::InvalidSheetName), 1);
    assert!(out.starts_with(b"PK"));
}

#[test]
fn test_values_and_formats() {
    let mut layout = GridLayout::new(&[40.0; 4], &[15.0]);
    let date = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    layout
        .place(
            GridRect::single(0, 0),
            ContentBox::raw(Bounds::default(), RawValue::Number(12.5)).with_style(BoxStyle {
                number_format: Some("0.00".into()),
                ..Default::default()
            }),
        )
        .place(
            GridRect::single(1, 0),
            ContentBox::raw(Bounds::default(), RawValue::Date(date)),
        )
        .place(
            GridRect::single(2, 0),
            ContentBox::raw(Bounds::default(), RawValue::Boolean(true)),
        )
        .place(
            GridRect::single(3, 0),
            ContentBox::raw(Bounds::default(), RawValue::Text("plain".into())),
        );

    let (writer, _) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(writer.cell_value(0, 0), Some(&CellValue::Number(12.5)));
    assert_eq!(writer.cell_value(1, 0), Some(&CellValue::Date(date)));
    assert_eq!(writer.cell_value(2, 0), Some(&CellValue::Boolean(true)));
    assert_eq!(writer.cell_value(3, 0), Some(&CellValue::string("plain")));

    let number_style = writer.style(writer.cell_style(0, 0).unwrap()).unwrap();
    assert_eq!(writer.number_format(number_style.number_format.unwrap()), Some("0.00"));
    let date_style = writer.style(writer.cell_style(1, 0).unwrap()).unwrap();
    assert_eq!(
        writer.number_format(date_style.number_format.unwrap()),
        Some("yyyy-mm-dd hh:mm:ss")
    );
}

#[test]
fn test_rich_text_runs_reach_writer() {
    let mut layout = GridLayout::new(&[80.0], &[15.0]);
    layout.place(
        GridRect::single(0, 0),
        ContentBox::new(
            Bounds::default(),
            BoxContent::Text(vec![
                InlineBox::text("Net "),
                InlineBox::styled("loss", FontOverride::default().with_color(Rgb::RED)),
            ]),
        ),
    );

    let (writer, _) = export_recorded(&[&layout], ExportConfig::default());
    let Some(CellValue::Rich(rich)) = writer.cell_value(0, 0) else {
        panic!("expected rich text");
    };

    assert_eq!(rich.text(), "Net loss");
    assert_eq!(rich.runs().len(), 2);
    assert_eq!(rich.runs()[1].offset, 4);
    let red = writer.font(rich.runs()[1].font).unwrap();
    assert_eq!(red.color, ColorRef::Rgb(Rgb::RED));
}

#[test]
fn test_hyperlink_and_formula() {
    let mut layout = GridLayout::new(&[40.0; 2], &[15.0]);
    layout
        .place(
            GridRect::single(0, 0),
            ContentBox::text(Bounds::default(), "Home").with_style(BoxStyle {
                href: Some("https://example.com".into()),
                ..Default::default()
            }),
        )
        .place(
            GridRect::single(1, 0),
            ContentBox::raw(Bounds::default(), RawValue::Number(3.0)).with_style(BoxStyle {
                formula: Some("=1+2".into()),
                ..Default::default()
            }),
        );

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(
        writer.cell_value(0, 0),
        Some(&CellValue::formula("HYPERLINK(\"https://example.com\",\"Home\")"))
    );
    assert_eq!(writer.cell_value(1, 0), Some(&CellValue::formula("1+2")));
    assert!(report.is_clean());
}

#[test]
fn test_rotation_disables_wrap() {
    let mut layout = GridLayout::new(&[40.0], &[60.0]);
    layout.place(
        GridRect::single(0, 0),
        ContentBox::text(Bounds::default(), "Up").with_style(BoxStyle {
            rotation: Some(90),
            wrap_override: Some(true),
            ..Default::default()
        }),
    );

    let (writer, _) = export_recorded(&[&layout], ExportConfig::default());
    let style = writer.style(writer.cell_style(0, 0).unwrap()).unwrap();

    assert_eq!(style.rotation, Some(90));
    assert!(!style.wrap_text);
}

#[test]
fn test_sheet_setup_commands() {
    let layout = GridLayout::new(&[50.0, 12.5], &[15.0]).with_header_footer("Sales", "Page");
    let config = ExportConfig::default().with_freeze(1, 0);

    let (writer, _) = export_recorded(&[&layout], config);
    let commands = writer.commands();

    assert!(commands.contains(&WriterCommand::SetColumnWidth { col: 0, width: 2500 }));
    assert!(commands.contains(&WriterCommand::SetColumnWidth { col: 1, width: 625 }));
    assert!(commands.contains(&WriterCommand::FreezePanes { rows: 1, cols: 0 }));
    assert!(commands.contains(&WriterCommand::SetHeaderFooter {
        header: "Sales".into(),
        footer: "Page".into(),
    }));
    assert_eq!(commands.last(), Some(&WriterCommand::CloseSheet));
}

#[test]
fn test_rows_stream_in_increasing_ranges() {
    let mut layout = GridLayout::new(&[40.0], &[15.0; 4]);
    for row in 0..4 {
        layout.place(
            GridRect::single(0, row),
            ContentBox::raw(Bounds::default(), RawValue::Number(row as f64)),
        );
    }

    let mut writer = RecordingWriter::new();
    let mut session = ExportSession::new(&mut writer, ExportConfig::default());
    {
        let mut sheet = session.begin_sheet(&layout);
        sheet.export_rows(&layout, 0, 2).unwrap();
        sheet.export_rows(&layout, 1, 3).unwrap();
        sheet.export_rows(&layout, 3, 10).unwrap();
        assert_eq!(sheet.next_row(), 4);
        sheet.finish_sheet();
    }
    session.finish(&mut Vec::new()).unwrap();

    assert_eq!(writer.rows(), vec![0, 1, 2, 3]);
    assert_eq!(writer.cell_value(0, 3), Some(&CellValue::Number(3.0)));
}

#[test]
fn test_sheets_share_styles_and_get_unique_names() {
    let first = merged_title(Rgb::RED).with_name("Data");
    let second = merged_title(Rgb::RED).with_name("Data");

    let (writer, report) = export_recorded(&[&first, &second], ExportConfig::default());

    assert_eq!(writer.sheet_names(), vec!["Data", "Data (2)"]);
    assert_eq!(report.sheets, vec!["Data".to_string(), "Data (2)".to_string()]);
    assert!(report.styles.hits > 0);
}

#[test]
fn test_covered_cells_share_origin_style() {
    let mut layout = GridLayout::new(&[40.0, 40.0], &[15.0]);
    layout
        .place(
            GridRect::new(0, 0, 1, 0),
            ContentBox::raw(Bounds::default(), RawValue::Number(12.5)).with_style(BoxStyle {
                horizontal_align: HorizontalAlignment::Center,
                number_format: Some("0.00".into()),
                ..Default::default()
            }),
        )
        .fill_background(
            GridRect::new(0, 0, 1, 0),
            CellBackground::filled(Rgb::new(255, 255, 153)),
        );

    let (writer, _) = export_recorded(&[&layout], ExportConfig::default());

    let origin = writer.cell_style(0, 0).unwrap();
    assert_eq!(writer.cell_style(1, 0), Some(origin));
    let style = writer.style(origin).unwrap();
    assert_eq!(style.horizontal, HorizontalAlignment::Center);
    assert!(style.number_format.is_some());
    assert_eq!(create_style_calls(&writer), 1);
}

#[test]
fn test_covered_cell_keeps_content_style_over_own_background() {
    let mut layout = GridLayout::new(&[40.0, 40.0], &[15.0]);
    layout.place(
        GridRect::new(0, 0, 1, 0),
        ContentBox::text(Bounds::default(), "Total").with_style(BoxStyle {
            horizontal_align: HorizontalAlignment::Right,
            ..Default::default()
        }),
    );
    layout.set_background(1, 0, CellBackground::filled(Rgb::BLUE));

    let (writer, _) = export_recorded(&[&layout], ExportConfig::default());

    let covered = writer.style(writer.cell_style(1, 0).unwrap()).unwrap();
    assert_eq!(covered.horizontal, HorizontalAlignment::Right);
    assert_eq!(covered.fill, Some(ColorRef::Rgb(Rgb::BLUE)));
}

#[test]
fn test_tall_sheet_exports_every_row() {
    let rows = 20_000;
    let mut layout = GridLayout::new(&[40.0; 4], &vec![15.0; rows]);
    for row in 0..rows as u32 {
        for col in 0..4 {
            layout.place(
                GridRect::single(col, row),
                ContentBox::raw(Bounds::default(), RawValue::Number(row as f64)),
            );
        }
    }

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(writer.rows().len(), rows);
    assert_eq!(
        writer.cell_value(3, rows as u32 - 1),
        Some(&CellValue::Number((rows - 1) as f64))
    );
    assert!(report.is_clean());
}
