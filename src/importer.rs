use crate::error::{EstabError, Result};
use crate::models::{TimeFactorEntry, TransactionRecord};
use crate::table::{CellValue, Table};

pub const TRANSACTION_CODE: &str = "transaction_code";
pub const ITEM_DESCRIPTION: &str = "item_description";
pub const FROM_DATE: &str = "from_date";
pub const TRANSACTION_DESCRIPTION: &str = "transaction_description";
pub const ITEM_VALUE: &str = "item_value";
pub const AVG_TIME_FACTOR: &str = "avg_time_factor";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse().ok().filter(|v: &f64| v.is_finite())
}

fn required_column(table: &Table, name: &str) -> Result<usize> {
    table.column_index(name).ok_or_else(|| EstabError::MissingColumn {
        column: name.to_string(),
    })
}

/// Row numbers as the user sees them in the spreadsheet (header is row 1).
fn sheet_row(index: usize) -> usize {
    index + 2
}

/// Numeric cell, or text that reads as a number. Blank yields `Ok(None)`.
fn numeric_cell(cell: &CellValue, column: &str, row: usize) -> Result<Option<f64>> {
    match cell {
        c if c.is_empty() => Ok(None),
        CellValue::Number(n) if n.is_finite() => Ok(Some(*n)),
        other => {
            let text = other.as_text();
            parse_number(&text).map(Some).ok_or_else(|| EstabError::InvalidNumber {
                row: sheet_row(row),
                column: column.to_string(),
                value: text,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Uploaded transaction records
// ---------------------------------------------------------------------------

pub fn records_from_table(table: &Table) -> Result<Vec<TransactionRecord>> {
    let idx_code = required_column(table, TRANSACTION_CODE)?;
    let idx_value = required_column(table, ITEM_VALUE)?;
    let idx_item_desc = table.column_index(ITEM_DESCRIPTION);
    let idx_date = table.column_index(FROM_DATE);
    let idx_txn_desc = table.column_index(TRANSACTION_DESCRIPTION);

    for (name, idx) in [
        (ITEM_DESCRIPTION, idx_item_desc),
        (FROM_DATE, idx_date),
        (TRANSACTION_DESCRIPTION, idx_txn_desc),
    ] {
        if idx.is_none() {
            tracing::warn!(column = name, "upload has no such column, leaving it blank");
        }
    }

    let text_at = |row: usize, idx: Option<usize>| {
        idx.map(|i| table.cell(row, i).as_text()).unwrap_or_default()
    };

    let mut records = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let item_value = numeric_cell(table.cell(row, idx_value), ITEM_VALUE, row)?;
        records.push(TransactionRecord {
            transaction_code: table.cell(row, idx_code).as_text(),
            item_description: text_at(row, idx_item_desc),
            from_date: text_at(row, idx_date),
            transaction_description: text_at(row, idx_txn_desc),
            item_value,
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Reference time factors
// ---------------------------------------------------------------------------

pub fn reference_from_table(table: &Table) -> Result<Vec<TimeFactorEntry>> {
    let idx_code = required_column(table, TRANSACTION_CODE)
        .map_err(|e| EstabError::Reference(e.to_string()))?;
    let idx_factor = required_column(table, AVG_TIME_FACTOR)
        .map_err(|e| EstabError::Reference(e.to_string()))?;

    let mut entries = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let code = table.cell(row, idx_code).as_text();
        if code.is_empty() {
            continue;
        }
        let factor = numeric_cell(table.cell(row, idx_factor), AVG_TIME_FACTOR, row)
            .map_err(|e| EstabError::Reference(e.user_message()))?
            .ok_or_else(|| {
                EstabError::Reference(format!(
                    "row {}: code {code} has no {AVG_TIME_FACTOR}",
                    sheet_row(row)
                ))
            })?;
        entries.push(TimeFactorEntry {
            transaction_code: code,
            avg_time_factor: factor,
        });
    }
    Ok(entries)
}
