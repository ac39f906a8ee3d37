use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader, Sheets};

use crate::error::{EstabError, Result};

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form of the cell. Integral numbers drop the fractional part so a
    /// code typed as `1001` reads the same whether Excel stored it as text or
    /// as a number.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => number_to_text(*n),
            Self::Bool(b) => b.to_string(),
        }
    }
}

fn number_to_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub fn excel_serial_to_date(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    let date = base + chrono::Duration::days(serial as i64);
    date.format("%Y-%m-%d").to_string()
}

fn from_calamine(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Text(excel_serial_to_date(dt.as_f64())),
        Data::DateTimeIso(s) => CellValue::Text(s.chars().take(10).collect()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A parsed sheet: the header row plus data rows, blank rows removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Header lookup, trimmed and case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    fn push_row(&mut self, row: Vec<CellValue>) -> bool {
        if row.iter().all(CellValue::is_empty) {
            return false;
        }
        self.rows.push(row);
        true
    }
}

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "csv" => Ok(Self::Csv),
            other => Err(EstabError::UnknownFormat(other.to_string())),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}

const UNREADABLE: &str = "the file could not be read as a spreadsheet";

pub fn read_table(path: &Path) -> Result<Table> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| {
        tracing::debug!(path = %path.display(), "cannot open upload: {e}");
        let detail = match e.kind() {
            std::io::ErrorKind::NotFound => "file not found",
            std::io::ErrorKind::PermissionDenied => "permission denied",
            _ => "the file could not be opened",
        };
        EstabError::MalformedInput {
            file: display_name(path),
            detail: detail.to_string(),
        }
    })?;
    read_table_from_bytes(&bytes, format, &display_name(path))
}

pub fn read_table_from_bytes(bytes: &[u8], format: SourceFormat, name: &str) -> Result<Table> {
    let result = match format {
        SourceFormat::Csv => read_csv(bytes),
        SourceFormat::Xlsx | SourceFormat::Xls => read_sheet(Cursor::new(bytes)),
    };
    let table = result.map_err(|e| match e {
        EstabError::Csv(_) | EstabError::Workbook(_) => {
            tracing::debug!(file = name, "unreadable table: {e}");
            EstabError::MalformedInput {
                file: name.to_string(),
                detail: UNREADABLE.to_string(),
            }
        }
        EstabError::MalformedInput { detail, .. } => EstabError::MalformedInput {
            file: name.to_string(),
            detail,
        },
        other => other,
    })?;
    tracing::debug!(file = name, rows = table.rows.len(), "parsed table");
    Ok(table)
}

fn read_sheet<RS: Read + Seek + Clone>(reader: RS) -> Result<Table> {
    let mut workbook: Sheets<RS> = calamine::open_workbook_auto_from_rs(reader)?;
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(EstabError::MalformedInput {
            file: String::new(),
            detail: "workbook has no sheets".to_string(),
        });
    };
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(|c| from_calamine(c).as_text()).collect(),
        None => return Ok(Table::default()),
    };
    let mut table = Table::new(headers);
    let mut skipped = 0usize;
    for row in rows {
        if !table.push_row(row.iter().map(from_calamine).collect()) {
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, sheet = %sheet_name, "skipped blank rows");
    }
    Ok(table)
}

fn read_csv(bytes: &[u8]) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut table = Table::new(headers);
    for result in rdr.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.XLSX")).unwrap(), SourceFormat::Xlsx);
        assert_eq!(SourceFormat::from_path(Path::new("a.xls")).unwrap(), SourceFormat::Xls);
        assert_eq!(SourceFormat::from_path(Path::new("a.csv")).unwrap(), SourceFormat::Csv);
        assert!(matches!(
            SourceFormat::from_path(Path::new("a.pdf")),
            Err(EstabError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_number_cells_render_without_trailing_zero() {
        assert_eq!(CellValue::Number(1001.0).as_text(), "1001");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Text("  B12 ".into()).as_text(), "B12");
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), "2025-01-10");
    }

    #[test]
    fn test_read_csv_skips_blank_rows() {
        let content = "transaction_code,item_value\n1001,10\n,\n1002,5\n";
        let table = read_table_from_bytes(content.as_bytes(), SourceFormat::Csv, "t.csv").unwrap();
        assert_eq!(table.headers, vec!["transaction_code", "item_value"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(1, 0).as_text(), "1002");
    }

    #[test]
    fn test_column_index_is_case_insensitive() {
        let table = Table::new(vec![" Transaction_Code ".into(), "item_value".into()]);
        assert_eq!(table.column_index("transaction_code"), Some(0));
        assert_eq!(table.column_index("avg_time_factor"), None);
    }

    #[test]
    fn test_garbage_spreadsheet_is_malformed_input() {
        let err = read_table_from_bytes(b"not a workbook", SourceFormat::Xlsx, "bad.xlsx").unwrap_err();
        assert!(matches!(err, EstabError::MalformedInput { .. }));
        assert_eq!(
            err.user_message(),
            "Error reading 'bad.xlsx': the file could not be read as a spreadsheet"
        );
    }

    #[test]
    fn test_missing_file_message() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table(&dir.path().join("gone.csv")).unwrap_err();
        assert_eq!(err.user_message(), "Error reading 'gone.csv': file not found");
    }

    #[test]
    fn test_read_xlsx_first_sheet() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "transaction_code").unwrap();
        sheet.write_string(0, 1, "item_value").unwrap();
        sheet.write_number(1, 0, 1001.0).unwrap();
        sheet.write_number(1, 1, 12.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = read_table_from_bytes(&bytes, SourceFormat::Xlsx, "t.xlsx").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 0).as_text(), "1001");
        assert_eq!(table.cell(0, 1), &CellValue::Number(12.0));
    }
}
