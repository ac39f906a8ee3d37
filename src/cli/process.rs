use std::io::Read;
use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::calculator::PipelineConfig;
use crate::error::{EstabError, Result};
use crate::fmt::{optional_number, strength};
use crate::models::Report;
use crate::pipeline::{process_bytes, process_upload, PipelineFailure, PipelineOutput};
use crate::reference;
use crate::settings::load_settings;
use crate::shaper::{Column, Value};
use crate::table::SourceFormat;
use crate::writer::{write_report, OutputFormat};

pub struct ProcessArgs {
    pub file: String,
    pub input_format: Option<String>,
    pub reference: Option<String>,
    pub output_dir: Option<String>,
    pub format: String,
    pub divisor: Option<f64>,
    pub shift_minutes: Option<f64>,
    pub preview: Option<usize>,
}

pub fn run(args: ProcessArgs) -> Result<()> {
    let settings = load_settings();
    let format = OutputFormat::parse(&args.format)?;
    let config = PipelineConfig::new(
        args.divisor.unwrap_or(settings.time_factor_divisor),
        args.shift_minutes.unwrap_or(settings.shift_minutes),
    )?;
    let reference_path = PathBuf::from(args.reference.unwrap_or(settings.reference_path));
    let factors = reference::global(&reference_path)?;

    let output = if args.file == "-" {
        let format = stdin_format(args.input_format.as_deref())?;
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| EstabError::MalformedInput {
                file: "stdin".to_string(),
                detail: e.to_string(),
            })?;
        process_bytes(&bytes, format, "stdin", factors, &config)
    } else {
        process_upload(Path::new(&args.file), factors, &config)
    };
    let output: PipelineOutput = output.map_err(|failure: PipelineFailure| {
        tracing::debug!(kind = %failure.kind, "upload rejected");
        EstabError::Other(failure.message)
    })?;

    if !output.missing.is_empty() {
        println!("{}", format!("Warning: {}", output.missing).yellow());
    }
    println!("{}", "Data processed successfully.".green());

    let preview_rows = args.preview.unwrap_or(settings.preview_rows);
    if preview_rows > 0 && !output.report.rows.is_empty() {
        println!("{}", preview_table(&output.report, preview_rows));
    }

    let dir = PathBuf::from(args.output_dir.unwrap_or(settings.output_dir));
    let path = write_report(&output.report, format, &dir)?;

    println!(
        "Total Establishment Strength: {}",
        strength(output.report.establishment_strength).bold()
    );
    println!("Report written to {} ({})", path.display(), format.mime_type());
    Ok(())
}

fn stdin_format(key: Option<&str>) -> Result<SourceFormat> {
    let key = key.unwrap_or("xlsx");
    SourceFormat::from_path(Path::new(&format!("stdin.{key}")))
}

pub fn preview_table(report: &Report, limit: usize) -> Table {
    let mut table = Table::new();
    table.set_header(Column::headers());
    for row in report.rows.iter().take(limit) {
        let cells: Vec<Cell> = Column::ALL
            .iter()
            .map(|c| match row.value(*c) {
                Value::Text(s) => Cell::new(s),
                Value::Number(n) => Cell::new(optional_number(n)).set_alignment(CellAlignment::Right),
            })
            .collect();
        table.add_row(cells);
    }
    table
}
