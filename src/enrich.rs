use std::collections::HashSet;
use std::fmt;

use crate::models::{EnrichedRecord, TransactionRecord};
use crate::reference::TimeFactorTable;

/// Distinct transaction codes with no reference entry, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingFactors {
    codes: Vec<String>,
}

impl MissingFactors {
    fn insert(&mut self, seen: &mut HashSet<String>, code: &str) {
        if seen.insert(code.to_string()) {
            self.codes.push(code.to_string());
        }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl fmt::Display for MissingFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing factors for transaction codes: {}", self.codes.join(", "))
    }
}

pub struct Enrichment {
    pub records: Vec<EnrichedRecord>,
    pub missing: MissingFactors,
}

/// Left join on `transaction_code`: every input record comes back exactly
/// once, in input order, with the factor filled in when the code is known.
pub fn join_and_enrich(records: &[TransactionRecord], factors: &TimeFactorTable) -> Enrichment {
    let mut missing = MissingFactors::default();
    let mut seen = HashSet::new();
    let enriched = records
        .iter()
        .map(|record| {
            let factor = factors.get(&record.transaction_code);
            if factor.is_none() {
                missing.insert(&mut seen, &record.transaction_code);
            }
            EnrichedRecord::new(record.clone(), factor)
        })
        .collect();

    if !missing.is_empty() {
        tracing::warn!(codes = ?missing.codes(), "no time factor for some transaction codes");
    }
    Enrichment {
        records: enriched,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeFactorEntry;

    fn record(code: &str, value: f64) -> TransactionRecord {
        TransactionRecord {
            transaction_code: code.to_string(),
            item_description: String::new(),
            from_date: String::new(),
            transaction_description: String::new(),
            item_value: Some(value),
        }
    }

    fn factors() -> TimeFactorTable {
        TimeFactorTable::from_entries(vec![
            TimeFactorEntry { transaction_code: "1001".into(), avg_time_factor: 3.0 },
            TimeFactorEntry { transaction_code: "1002".into(), avg_time_factor: 2.0 },
        ])
    }

    #[test]
    fn test_left_join_keeps_every_record_in_order() {
        let input = vec![record("1002", 1.0), record("7777", 2.0), record("1001", 3.0)];
        let out = join_and_enrich(&input, &factors());
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0].avg_time_factor, Some(2.0));
        assert_eq!(out.records[1].avg_time_factor, None);
        assert_eq!(out.records[2].record.transaction_code, "1001");
    }

    #[test]
    fn test_missing_codes_are_distinct() {
        let input = vec![
            record("7777", 1.0),
            record("8888", 1.0),
            record("7777", 5.0),
            record("1001", 1.0),
        ];
        let out = join_and_enrich(&input, &factors());
        assert_eq!(out.missing.codes(), &["7777".to_string(), "8888".to_string()]);
        assert_eq!(
            out.missing.to_string(),
            "Missing factors for transaction codes: 7777, 8888"
        );
    }

    #[test]
    fn test_empty_input() {
        let out = join_and_enrich(&[], &factors());
        assert!(out.records.is_empty());
        assert!(out.missing.is_empty());
    }
}
