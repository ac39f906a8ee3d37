use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::OnceCell;

use crate::error::{EstabError, Result};
use crate::importer::reference_from_table;
use crate::models::TimeFactorEntry;
use crate::table::read_table;

/// Read-only lookup from transaction code to average time factor.
///
/// Duplicate codes keep the first occurrence; later rows are counted in
/// `duplicates` and otherwise ignored.
#[derive(Debug, Clone, Default)]
pub struct TimeFactorTable {
    entries: Vec<TimeFactorEntry>,
    index: HashMap<String, usize>,
    duplicates: usize,
}

impl TimeFactorTable {
    pub fn from_entries(rows: Vec<TimeFactorEntry>) -> Self {
        let mut table = Self::default();
        for entry in rows {
            if table.index.contains_key(&entry.transaction_code) {
                tracing::warn!(
                    code = %entry.transaction_code,
                    factor = entry.avg_time_factor,
                    "duplicate reference code ignored, first occurrence wins"
                );
                table.duplicates += 1;
                continue;
            }
            table
                .index
                .insert(entry.transaction_code.clone(), table.entries.len());
            table.entries.push(entry);
        }
        table
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.index
            .get(code)
            .map(|&i| self.entries[i].avg_time_factor)
    }

    pub fn entries(&self) -> &[TimeFactorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

pub fn load_reference(path: &Path) -> Result<TimeFactorTable> {
    let table = read_table(path).map_err(|e| match e {
        EstabError::Reference(_) => e,
        other => EstabError::Reference(format!("{}: {}", path.display(), other.user_message())),
    })?;
    let table = TimeFactorTable::from_entries(reference_from_table(&table)?);
    tracing::info!(
        path = %path.display(),
        entries = table.len(),
        duplicates = table.duplicates(),
        "loaded time factor table"
    );
    Ok(table)
}

static GLOBAL: OnceCell<TimeFactorTable> = OnceCell::new();

/// Process-wide reference table. The first call loads `path`; every later
/// call returns the same table without touching the filesystem.
pub fn global(path: &Path) -> Result<&'static TimeFactorTable> {
    GLOBAL.get_or_try_init(|| load_reference(path))
}
