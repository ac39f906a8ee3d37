/// One row of an uploaded transaction workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub transaction_code: String,
    pub item_description: String,
    pub from_date: String,
    pub transaction_description: String,
    /// `None` when the cell was blank.
    pub item_value: Option<f64>,
}

/// One row of the time-factor reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFactorEntry {
    pub transaction_code: String,
    pub avg_time_factor: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: TransactionRecord,
    pub avg_time_factor: Option<f64>,
    pub derived_time: Option<f64>,
}

impl EnrichedRecord {
    pub fn new(record: TransactionRecord, avg_time_factor: Option<f64>) -> Self {
        Self {
            record,
            avg_time_factor,
            derived_time: None,
        }
    }
}

/// Projection of an enriched record onto the report columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub transaction_code: String,
    pub item_description: String,
    pub from_date: String,
    pub transaction_description: String,
    pub item_value: Option<f64>,
    pub avg_time_factor: Option<f64>,
    pub derived_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    /// Unrounded; round only when displaying or serializing.
    pub establishment_strength: f64,
}
