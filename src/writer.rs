use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::calculator::round2;
use crate::error::{EstabError, Result};
use crate::fmt::strength;
use crate::models::Report;
use crate::shaper::{Column, Value};

pub const SHEET_NAME: &str = "ProcessedData";
pub const SUMMARY_LABEL: &str = "Grand Total (Establishment Strength)";
pub const FILE_STEM: &str = "processed_establishment_data";

/// Summary placement, 0-based: one blank row after the data, label in
/// column D, rounded strength in column F.
pub const SUMMARY_LABEL_COL: u16 = 3;
pub const SUMMARY_VALUE_COL: u16 = 5;

pub fn summary_row_index(data_rows: usize) -> u32 {
    data_rows as u32 + 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn parse(key: &str) -> Result<Self> {
        match key.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(EstabError::UnknownFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{FILE_STEM}.{}", self.extension())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Build the complete artifact in memory.
pub fn render(report: &Report, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Xlsx => render_xlsx(report),
        OutputFormat::Csv => render_csv(report),
    }
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: Value<'_>) -> Result<()> {
    match value {
        Value::Text(s) if !s.is_empty() => {
            sheet.write_string(row, col, s)?;
        }
        Value::Number(Some(n)) => {
            sheet.write_number(row, col, n)?;
        }
        _ => {}
    }
    Ok(())
}

fn render_xlsx(report: &Report) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in Column::headers().into_iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &bold)?;
    }
    for (i, row) in report.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, column) in Column::ALL.iter().enumerate() {
            write_cell(sheet, r, col as u16, row.value(*column))?;
        }
    }

    let summary = summary_row_index(report.rows.len());
    sheet.write_string_with_format(summary, SUMMARY_LABEL_COL, SUMMARY_LABEL, &bold)?;
    sheet.write_number(summary, SUMMARY_VALUE_COL, round2(report.establishment_strength))?;
    sheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

fn render_csv(report: &Report) -> Result<Vec<u8>> {
    let width = Column::ALL.len();
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(Column::headers())?;
    for row in &report.rows {
        let fields: Vec<String> = Column::ALL
            .iter()
            .map(|c| match row.value(*c) {
                Value::Text(s) => s.to_string(),
                Value::Number(n) => n.map(|v| v.to_string()).unwrap_or_default(),
            })
            .collect();
        wtr.write_record(&fields)?;
    }
    wtr.write_record(vec![""; width])?;
    let mut summary = vec![String::new(); width];
    summary[SUMMARY_LABEL_COL as usize] = SUMMARY_LABEL.to_string();
    summary[SUMMARY_VALUE_COL as usize] = strength(report.establishment_strength);
    wtr.write_record(&summary)?;
    wtr.into_inner()
        .map_err(|e| EstabError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

// ---------------------------------------------------------------------------
// Output file
// ---------------------------------------------------------------------------

/// Render the report and place it in `dir` under the fixed file name. The
/// file only appears once it is complete.
pub fn write_report(report: &Report, format: OutputFormat, dir: &Path) -> Result<PathBuf> {
    let bytes = render(report, format)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format.file_name());
    let partial = dir.join(format!(".{}.partial", format.file_name()));
    if let Err(e) = std::fs::write(&partial, &bytes).and_then(|_| std::fs::rename(&partial, &path)) {
        let _ = std::fs::remove_file(&partial);
        return Err(e.into());
    }
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote report");
    Ok(path)
}
