//! CLI tool for xlstack - turns a screen JSON file into an XLSX workbook
//!
//! Usage:
//!   xlstack_cli screen.json                        # Write 画板数据导出.xlsx
//!   xlstack_cli screen.json -o out.xlsx            # Choose the output file
//!   xlstack_cli screen.json --template t.xlsx      # Append the sheet to a template
//!   xlstack_cli screen.json --layout-only          # Print table blocks as JSON
//!
//! Set `RUST_LOG=debug` to see where each table lands.

use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use xlstack::{export_screen, export_screen_into, Coordinate, ExportOptions, Screen, XlstackError};

#[derive(Debug, Parser)]
#[command(name = "xlstack_cli", version, about = "Stack screen components into one XLSX sheet")]
struct Args {
    /// Screen JSON: {"title": ..., "components": [...]}
    input: PathBuf,

    /// Output file (defaults to the options' file name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Existing workbook to append the sheet to
    #[arg(long)]
    template: Option<PathBuf>,

    /// Export options as JSON
    #[arg(long)]
    options: Option<PathBuf>,

    /// Header cell of the first table, e.g. B3
    #[arg(long)]
    anchor: Option<Coordinate>,

    /// Blank rows between tables
    #[arg(long)]
    gap: Option<u32>,

    /// Column every table re-anchors to (1-based)
    #[arg(long)]
    left_margin: Option<u32>,

    /// Size columns to their contents
    #[arg(long)]
    auto_width: bool,

    /// Print the computed table blocks as JSON instead of writing a workbook
    #[arg(long)]
    layout_only: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), XlstackError> {
    let screen: Screen = serde_json::from_slice(&fs::read(&args.input)?)?;

    let mut options: ExportOptions = match &args.options {
        Some(path) => serde_json::from_slice(&fs::read(path)?)?,
        None => ExportOptions::default(),
    };
    if let Some(anchor) = args.anchor {
        options.layout.anchor = anchor;
    }
    if let Some(gap) = args.gap {
        options.layout.gap = gap;
    }
    if args.left_margin.is_some() {
        options.layout.left_margin_column = args.left_margin;
    }
    options.auto_width |= args.auto_width;

    if args.layout_only {
        let blocks = options.layout.layout(&screen.components)?;
        let json = serde_json::to_string_pretty(&blocks)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        writeln!(stdout)?;
        return Ok(());
    }

    let bytes = match &args.template {
        Some(path) => export_screen_into(&fs::read(path)?, &screen, &options)?,
        None => export_screen(&screen, &options)?,
    };
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&options.file_name));
    fs::write(&output, bytes)?;
    eprintln!("Written: {}", output.display());
    Ok(())
}
