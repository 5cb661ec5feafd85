//! Shared helpers for the end-to-end tests

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tabex::prelude::*;
use tabex_core::WriterCommand;

/// Export layouts into a recording writer
pub fn export_recorded(layouts: &[&GridLayout], config: ExportConfig) -> (RecordingWriter, ExportReport) {
    let mut writer = RecordingWriter::new();
    let mut session = ExportSession::new(&mut writer, config);
    for layout in layouts {
        session.export_sheet(*layout).unwrap();
    }
    let report = session.finish(&mut Vec::new()).unwrap();
    (writer, report)
}

/// Number of `create_style` calls
pub fn create_style_calls(writer: &RecordingWriter) -> usize {
    writer
        .commands()
        .iter()
        .filter(|c| matches!(c, WriterCommand::CreateStyle(_)))
        .count()
}

/// Cells inside `rect` that received a `set_cell_style` call, one entry per call
pub fn styled_cells_in(writer: &RecordingWriter, rect: GridRect) -> Vec<(u32, u32)> {
    writer
        .commands()
        .iter()
        .filter_map(|c| match c {
            WriterCommand::SetCellStyle { col, row, .. } if rect.contains(*col, *row) => {
                Some((*col, *row))
            }
            _ => None,
        })
        .collect()
}

/// A solid PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgba = vec![200u8; (width * height * 4) as usize];
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&rgba).unwrap();
    }
    out
}

/// Read one part of an XLSX package
pub fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut s = String::new();
    file.read_to_string(&mut s).unwrap();
    s
}

/// Names of every part in an XLSX package
pub fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(|s| s.to_string()).collect()
}

/// Values of `attr` on every element named `tag`
pub fn attribute_values(xml: &str, tag: &str, attr: &str) -> Vec<String> {
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
