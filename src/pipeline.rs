use std::fmt;
use std::path::Path;

use crate::calculator::{apply_derived_time, establishment_strength, round2, PipelineConfig};
use crate::enrich::{join_and_enrich, MissingFactors};
use crate::error::{ErrorKind, EstabError};
use crate::importer::records_from_table;
use crate::models::{Report, TransactionRecord};
use crate::reference::TimeFactorTable;
use crate::shaper::shape;
use crate::table::{read_table, read_table_from_bytes, SourceFormat, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub report: Report,
    /// Non-fatal: empty when every code had a time factor.
    pub missing: MissingFactors,
}

/// A fatal pipeline error reduced to what the user is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<EstabError> for PipelineFailure {
    fn from(e: EstabError) -> Self {
        tracing::debug!("pipeline failed: {e}");
        Self {
            kind: e.kind(),
            message: e.user_message(),
        }
    }
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PipelineFailure {}

/// Join, compute, aggregate and shape one upload. Pure: the same inputs
/// always give the same output.
pub fn run(
    records: &[TransactionRecord],
    reference: &TimeFactorTable,
    config: &PipelineConfig,
) -> PipelineOutput {
    let mut enrichment = join_and_enrich(records, reference);
    apply_derived_time(&mut enrichment.records, config);
    let strength = establishment_strength(&enrichment.records, config.shift_minutes);
    tracing::info!(
        records = records.len(),
        unmatched = enrichment.missing.codes().len(),
        strength = round2(strength),
        "computed establishment strength"
    );
    PipelineOutput {
        report: Report {
            rows: shape(&enrichment.records),
            establishment_strength: strength,
        },
        missing: enrichment.missing,
    }
}

pub fn process_table(
    table: &Table,
    reference: &TimeFactorTable,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineFailure> {
    let records = records_from_table(table)?;
    Ok(run(&records, reference, config))
}

pub fn process_upload(
    path: &Path,
    reference: &TimeFactorTable,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineFailure> {
    let table = read_table(path)?;
    process_table(&table, reference, config)
}

pub fn process_bytes(
    bytes: &[u8],
    format: SourceFormat,
    name: &str,
    reference: &TimeFactorTable,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineFailure> {
    let table = read_table_from_bytes(bytes, format, name)?;
    process_table(&table, reference, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeFactorEntry;

    fn reference() -> TimeFactorTable {
        TimeFactorTable::from_entries(vec![
            TimeFactorEntry { transaction_code: "1001".into(), avg_time_factor: 3.0 },
            TimeFactorEntry { transaction_code: "1002".into(), avg_time_factor: 2.0 },
        ])
    }

    fn raw_config() -> PipelineConfig {
        PipelineConfig::new(1.0, 240.0).unwrap()
    }

    const UPLOAD: &str = "\
transaction_code,item_description,from_date,transaction_description,item_value
1002,Parcels,2024-04-01,Booking,50
1001,Letters,2024-04-01,Booking,100
";

    #[test]
    fn test_fixture_strength() {
        let out = process_bytes(UPLOAD.as_bytes(), SourceFormat::Csv, "up.csv", &reference(), &raw_config()).unwrap();
        assert_eq!(out.report.rows.len(), 2);
        assert_eq!(out.report.rows[0].transaction_code, "1001");
        assert_eq!(out.report.rows[0].derived_time, Some(300.0));
        assert_eq!(out.report.rows[1].derived_time, Some(100.0));
        assert_eq!(round2(out.report.establishment_strength), 1.67);
        assert!(out.missing.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let a = process_bytes(UPLOAD.as_bytes(), SourceFormat::Csv, "up.csv", &reference(), &raw_config()).unwrap();
        let b = process_bytes(UPLOAD.as_bytes(), SourceFormat::Csv, "up.csv", &reference(), &raw_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unmatched_code_stays_in_report() {
        let upload = "transaction_code,item_value\n1001,80\n5555,10\n5555,20\n";
        let out = process_bytes(upload.as_bytes(), SourceFormat::Csv, "up.csv", &reference(), &raw_config()).unwrap();
        assert_eq!(out.report.rows.len(), 3);
        assert_eq!(out.missing.codes(), &["5555".to_string()]);
        assert_eq!(out.report.establishment_strength, 1.0);
        assert_eq!(out.report.rows[2].derived_time, None);
    }

    #[test]
    fn test_empty_upload() {
        let upload = "transaction_code,item_value\n";
        let out = process_bytes(upload.as_bytes(), SourceFormat::Csv, "up.csv", &reference(), &raw_config()).unwrap();
        assert!(out.report.rows.is_empty());
        assert_eq!(out.report.establishment_strength, 0.0);
        assert!(out.missing.is_empty());
    }

    #[test]
    fn test_cardinality_preserved() {
        for n in [0usize, 1, 7, 40] {
            let records: Vec<TransactionRecord> = (0..n)
                .map(|i| TransactionRecord {
                    transaction_code: if i % 3 == 0 { "9".into() } else { "1001".into() },
                    item_description: String::new(),
                    from_date: String::new(),
                    transaction_description: String::new(),
                    item_value: Some(i as f64),
                })
                .collect();
            let out = run(&records, &reference(), &PipelineConfig::default());
            assert_eq!(out.report.rows.len(), n);
        }
    }

    #[test]
    fn test_missing_column_is_failure() {
        let upload = "transaction_code,item_description\n1001,Letters\n";
        let err = process_bytes(upload.as_bytes(), SourceFormat::Csv, "up.csv", &reference(), &raw_config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingColumn);
        assert_eq!(err.message, "The uploaded file has no 'item_value' column.");
    }

    #[test]
    fn test_unreadable_upload_is_failure() {
        let err = process_bytes(b"\x00\x01garbage", SourceFormat::Xls, "up.xls", &reference(), &raw_config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
    }

    #[test]
    fn test_failure_message_has_no_library_text() {
        let err = process_bytes(b"garbage", SourceFormat::Xlsx, "up.xlsx", &reference(), &raw_config()).unwrap_err();
        assert_eq!(err.message, "Error reading 'up.xlsx': the file could not be read as a spreadsheet");
        assert!(!err.message.contains("Cannot detect"));

        let dir = tempfile::tempdir().unwrap();
        let err = process_upload(&dir.path().join("u.csv"), &reference(), &raw_config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
        assert_eq!(err.message, "Error reading 'u.csv': file not found");
        assert!(!err.message.contains("os error"));
    }

    #[test]
    fn test_nan_item_value_is_rejected() {
        let upload = "transaction_code,item_value\n1001,10\n1001,NaN\n";
        let err = process_bytes(upload.as_bytes(), SourceFormat::Csv, "up.csv", &reference(), &raw_config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
        assert_eq!(err.message, "Row 3: 'NaN' in column 'item_value' is not a number.");
    }

    #[test]
    fn test_process_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        std::fs::write(&path, UPLOAD).unwrap();
        let out = process_upload(&path, &reference(), &raw_config()).unwrap();
        assert_eq!(out.report.rows.len(), 2);

        let err = process_upload(&dir.path().join("upload.txt"), &reference(), &raw_config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
    }
}
