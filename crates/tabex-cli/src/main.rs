//! tabex CLI - export layout snapshots to spreadsheets

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tabex::{ExportConfig, ExportSession, FormatVariant, GridLayout, RecordingWriter};
use tabex_core::WriterCommand;

#[derive(Parser)]
#[command(name = "tabex")]
#[command(author, version, about = "Export positioned layouts to spreadsheets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a layout snapshot to an .xlsx file
    Export {
        /// Layout snapshot (one layout object or an array of them)
        input: PathBuf,

        /// Output workbook
        #[arg(short, long)]
        output: PathBuf,

        /// Target variant: legacy or extended
        #[arg(long)]
        variant: Option<FormatVariant>,

        #[command(flatten)]
        settings: Settings,
    },

    /// Dry-run an export and print what the writer would receive
    Inspect {
        /// Layout snapshot (one layout object or an array of them)
        input: PathBuf,

        /// Target variant: legacy or extended
        #[arg(long)]
        variant: Option<FormatVariant>,

        #[command(flatten)]
        settings: Settings,
    },
}

#[derive(clap::Args)]
struct Settings {
    /// Export settings file (.json, or key=value lines)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override one setting, e.g. --set style-limit=hard:4000
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            variant,
            settings,
        } => {
            let config = load_config(&settings, variant)?;
            export(&input, &output, config)
        }
        Commands::Inspect {
            input,
            variant,
            settings,
        } => {
            let config = load_config(&settings, variant)?;
            inspect(&input, config)
        }
    }
}

fn export(input: &Path, output: &Path, config: ExportConfig) -> Result<()> {
    let layouts = load_layouts(input)?;
    let report = tabex::export_xlsx_file(&layouts, config, output)
        .with_context(|| format!("Failed to export to '{}'", output.display()))?;

    eprintln!("Wrote '{}': {}", output.display(), report);
    Ok(())
}

fn inspect(input: &Path, config: ExportConfig) -> Result<()> {
    let layouts = load_layouts(input)?;
    let variant = config.variant;

    let mut writer = RecordingWriter::new();
    let mut session = ExportSession::new(&mut writer, config);
    for layout in &layouts {
        session
            .export_sheet(layout)
            .with_context(|| format!("Failed to export '{}'", input.display()))?;
    }
    let report = session
        .finish(&mut std::io::sink())
        .context("Failed to finish the dry run")?;

    println!("File: {}", input.display());
    println!("Variant: {:?}", variant);
    for name in &report.sheets {
        println!("  Sheet \"{}\"", name);
    }

    println!();
    println!("Writer commands:");
    for (name, count) in command_counts(writer.commands()) {
        println!("  {:<24}{}", name, count);
    }

    println!();
    println!(
        "Styles: {} ({} fonts, {} number formats, {} cache hits, {} refused)",
        report.styles.styles,
        report.styles.fonts,
        report.styles.formats,
        report.styles.hits,
        report.styles.refusals
    );
    if let Some(slots) = report.palette_slots {
        println!("Palette slots rewritten: {}", slots);
    }

    if report.is_clean() {
        println!("Degradations: none");
    } else {
        println!("Degradations:");
        for (kind, count) in &report.degradations {
            println!("  {:<24}{}", kind, count);
        }
    }
    Ok(())
}

fn command_counts(commands: &[WriterCommand]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for command in commands {
        let name = match command {
            WriterCommand::CreateSheet(_) => "create-sheet",
            WriterCommand::SetColumnWidth { .. } => "set-column-width",
            WriterCommand::CreateRow { .. } => "create-row",
            WriterCommand::SetCellValue { .. } => "set-cell-value",
            WriterCommand::SetCellStyle { .. } => "set-cell-style",
            WriterCommand::AddMergedRegion(_) => "add-merged-region",
            WriterCommand::RegisterFont(_) => "register-font",
            WriterCommand::RegisterNumberFormat { .. } => "register-number-format",
            WriterCommand::CreateStyle(_) => "create-style",
            WriterCommand::RegisterPicture { .. } => "register-picture",
            WriterCommand::CreateAnchoredPicture { .. } => "create-anchored-picture",
            WriterCommand::SetHeaderFooter { .. } => "set-header-footer",
            WriterCommand::SetPrintSetup(_) => "set-print-setup",
            WriterCommand::FreezePanes { .. } => "freeze-panes",
            WriterCommand::SetPalette(_) => "set-palette",
            WriterCommand::CloseSheet => "close-sheet",
        };
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

/// Read a snapshot holding either one layout or an array of layouts
fn load_layouts(path: &Path) -> Result<Vec<GridLayout>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    let layouts = if text.trim_start().starts_with('[') {
        serde_json::from_str(&text)
    } else {
        GridLayout::from_json(&text).map(|layout| vec![layout])
    }
    .with_context(|| format!("Invalid layout snapshot '{}'", path.display()))?;

    if layouts.is_empty() {
        bail!("'{}' contains no layouts", path.display());
    }
    Ok(layouts)
}

/// Defaults, then the settings file, then `--set` overrides, then `--variant`
fn load_config(settings: &Settings, variant: Option<FormatVariant>) -> Result<ExportConfig> {
    let mut config = match &settings.config {
        Some(path) => read_config_file(path)?,
        None => ExportConfig::default(),
    };

    for entry in &settings.overrides {
        let (key, value) = split_property(entry)
            .with_context(|| format!("Expected KEY=VALUE, got '{}'", entry))?;
        config
            .set(key, value)
            .with_context(|| format!("Invalid override '{}'", entry))?;
    }

    if let Some(variant) = variant {
        config.variant = variant;
    }
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ExportConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(&text)
            .with_context(|| format!("Invalid settings file '{}'", path.display()));
    }

    let mut properties = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let property = split_property(line)
            .with_context(|| format!("{}:{}: expected key=value", path.display(), number + 1))?;
        properties.push(property);
    }
    ExportConfig::from_properties(properties)
        .with_context(|| format!("Invalid settings file '{}'", path.display()))
}

fn split_property(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(['=', ':'])?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabex::StyleLimit;

    const LAYOUT: &str = r#"{
        "name": "Summary",
        "columns": [50000, 50000],
        "rows": [15000],
        "boxes": [
            {
                "bounds": {"x": 0, "y": 0, "width": 100000, "height": 15000},
                "content": {"text": [{"kind": "text", "chunks": [{"text": "Total"}]}]}
            }
        ]
    }"#;

    fn settings(config: Option<PathBuf>, overrides: &[&str]) -> Settings {
        Settings {
            config,
            overrides: overrides.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_split_property() {
        assert_eq!(split_property("a = b"), Some(("a", "b")));
        assert_eq!(split_property("style-limit=hard:10"), Some(("style-limit", "hard:10")));
        assert_eq!(split_property("paper-size: a4"), Some(("paper-size", "a4")));
        assert_eq!(split_property("novalue"), None);
        assert_eq!(split_property("=x"), None);
    }

    #[test]
    fn test_properties_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.properties");
        std::fs::write(
            &path,
            "# export settings\nformat-variant=legacy\n\nfreeze-rows = 2\nstyle-limit=soft:100\n",
        )
        .unwrap();

        let config = load_config(
            &settings(Some(path), &["style-limit=hard:10"]),
            Some(FormatVariant::Extended),
        )
        .unwrap();

        assert_eq!(config.variant, FormatVariant::Extended);
        assert_eq!(config.freeze_rows, 2);
        assert_eq!(config.style_limit, StyleLimit::Hard(10));
    }

    #[test]
    fn test_json_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"{"format-variant": "legacy", "freeze-columns": 1}"#).unwrap();

        let config = load_config(&settings(Some(path), &[]), None).unwrap();

        assert_eq!(config.variant, FormatVariant::Legacy);
        assert_eq!(config.freeze_columns, 1);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        assert!(load_config(&settings(None, &["freeze-rows"]), None).is_err());
        assert!(load_config(&settings(None, &["freeze-rows=-1"]), None).is_err());
    }

    #[test]
    fn test_export_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("layout.json");
        let output = dir.path().join("out.xlsx");
        std::fs::write(&input, LAYOUT).unwrap();

        export(&input, &output, ExportConfig::default()).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_layout_arrays_and_empty_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.json");

        std::fs::write(&path, format!("[{LAYOUT}, {LAYOUT}]")).unwrap();
        assert_eq!(load_layouts(&path).unwrap().len(), 2);

        std::fs::write(&path, "[]").unwrap();
        assert!(load_layouts(&path).is_err());
    }

    #[test]
    fn test_command_counts() {
        let commands = vec![
            WriterCommand::CreateSheet("A".into()),
            WriterCommand::CreateRow { row: 0, height: 15.0 },
            WriterCommand::CreateRow { row: 1, height: 15.0 },
            WriterCommand::CloseSheet,
        ];
        let counts = command_counts(&commands);
        assert_eq!(counts.get("create-row"), Some(&2));
        assert_eq!(counts.len(), 3);
    }
}
