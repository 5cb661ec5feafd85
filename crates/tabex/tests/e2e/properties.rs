//! Invariants that must hold for any input

use proptest::prelude::*;
use tabex::layout::{
    BorderSpec, Bounds, BoxContent, CellBackground, ContentBox, FontOverride, InlineBox,
};
use tabex::palette::{ColorResolver, ExtendedPalette, LegacyPalette};
use tabex::rich_text::{extract, truncate, Extracted};
use tabex::{Diagnostics, ExportConfig, GridLayout};
use tabex_core::{CellValue, ColorRef, GridRect, Rgb, MAX_CELL_TEXT_CHARS, PALETTE_SIZE};

use crate::common::{create_style_calls, export_recorded, styled_cells_in};

#[test]
fn test_style_dedup_creates_one_style_per_distinct_look() {
    let colors = [Rgb::RED, Rgb::GREEN, Rgb::BLUE];
    let mut layout = GridLayout::new(&[20.0; 4], &[15.0; 3]);
    for row in 0..3 {
        for col in 0..4 {
            let color = colors[((row * 4 + col) % 3) as usize];
            layout.set_background(col, row, CellBackground::filled(color));
        }
    }

    let (writer, report) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(create_style_calls(&writer), 3);
    assert_eq!(writer.styled_cell_count(), 12);
    assert_eq!(report.styles.styles, 3);
    assert_eq!(report.styles.hits, 9);
}

#[test]
fn test_merge_styles_every_covered_cell_once() {
    let span = GridRect::new(0, 0, 1, 2);
    let mut layout = GridLayout::new(&[30.0; 3], &[15.0; 4]);
    layout.place(span, ContentBox::text(Bounds::default(), "Region"));
    layout.fill_background(span, CellBackground::filled(Rgb::new(220, 230, 241)));

    let (writer, _) = export_recorded(&[&layout], ExportConfig::default());

    assert_eq!(writer.merged_regions(), vec![span]);
    let mut styled = styled_cells_in(&writer, span);
    assert_eq!(styled.len(), 6);
    styled.sort();
    styled.dedup();
    assert_eq!(styled.len(), 6);
    assert_eq!(
        writer.cell_value(0, 0),
        Some(&CellValue::string("Region"))
    );
    assert_eq!(writer.cell_value(1, 1), None);
}

#[test]
fn test_origin_background_wins_in_merged_region() {
    let span = GridRect::new(0, 0, 1, 0);
    let mut layout = GridLayout::new(&[30.0; 2], &[15.0]);
    layout.place(span, ContentBox::text(Bounds::default(), "x"));
    layout.set_background(0, 0, CellBackground::filled(Rgb::RED));
    layout.set_background(
        1,
        0,
        CellBackground::filled(Rgb::BLUE).with_box_border(BorderSpec::solid(1.0)),
    );

    let (writer, _) = export_recorded(&[&layout], ExportConfig::default());
    let covered = writer.style(writer.cell_style(1, 0).unwrap()).unwrap();

    assert_eq!(covered.fill, Some(ColorRef::Rgb(Rgb::RED)));
    assert!(covered.top.is_some());
}

#[test]
fn test_truncation_drops_runs_past_the_cut() {
    let bold = FontOverride::default().with_bold(true);
    let content = ContentBox::new(
        Bounds::default(),
        BoxContent::Text(vec![
            InlineBox::text("a".repeat(35_000)),
            InlineBox::styled("b".repeat(5_000), bold),
            InlineBox::text("c"),
        ]),
    );
    let mut diag = Diagnostics::new();
    let once = extract(&content, &mut ExtendedPalette, &mut diag);

    let Extracted::Plain(text) = once else {
        panic!("every run boundary lies past the cut");
    };
    assert_eq!(text.chars().count(), MAX_CELL_TEXT_CHARS);
    assert_eq!(truncate(&text, MAX_CELL_TEXT_CHARS), text);

    let forty_thousand = "x".repeat(40_000);
    let first = truncate(&forty_thousand, MAX_CELL_TEXT_CHARS);
    assert_eq!(truncate(first, MAX_CELL_TEXT_CHARS), first);
    assert_eq!(first.len(), MAX_CELL_TEXT_CHARS);
}

fn rgb() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

proptest! {
    #[test]
    fn prop_palette_never_exceeds_its_slots(colors in prop::collection::vec(rgb(), 57..200)) {
        let mut palette = LegacyPalette::default();
        let mut exhausted_entries: Option<Vec<Rgb>> = None;

        for color in colors {
            let ColorRef::Indexed(index) = palette.resolve(color) else {
                panic!("legacy palette must return indices");
            };
            prop_assert!((index as usize) < PALETTE_SIZE);
            prop_assert!(palette.next_free() <= PALETTE_SIZE);

            let entries = palette.entries().unwrap().to_vec();
            if let Some(before) = &exhausted_entries {
                prop_assert_eq!(before, &entries);
            } else if palette.is_exhausted() {
                exhausted_entries = Some(entries);
            }
        }
    }

    #[test]
    fn prop_truncation_is_idempotent(text in ".{0,64}", max in 0usize..48) {
        let once = truncate(&text, max);
        prop_assert_eq!(truncate(once, max), once);
        prop_assert_eq!(once.chars().count(), text.chars().count().min(max));
        prop_assert!(text.starts_with(once));
    }
}
