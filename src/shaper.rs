use std::cmp::Ordering;

use crate::importer::{
    AVG_TIME_FACTOR, FROM_DATE, ITEM_DESCRIPTION, ITEM_VALUE, TRANSACTION_CODE,
    TRANSACTION_DESCRIPTION,
};
use crate::models::{EnrichedRecord, ReportRow};

pub const DERIVED_TIME_HEADER: &str = "Daily Time Taken in minutes";

/// Report columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    TransactionCode,
    ItemDescription,
    FromDate,
    TransactionDescription,
    ItemValue,
    AvgTimeFactor,
    DerivedTime,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::TransactionCode,
        Column::ItemDescription,
        Column::FromDate,
        Column::TransactionDescription,
        Column::ItemValue,
        Column::AvgTimeFactor,
        Column::DerivedTime,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::TransactionCode => TRANSACTION_CODE,
            Self::ItemDescription => ITEM_DESCRIPTION,
            Self::FromDate => FROM_DATE,
            Self::TransactionDescription => TRANSACTION_DESCRIPTION,
            Self::ItemValue => ITEM_VALUE,
            Self::AvgTimeFactor => AVG_TIME_FACTOR,
            Self::DerivedTime => DERIVED_TIME_HEADER,
        }
    }

    pub fn headers() -> Vec<&'static str> {
        Self::ALL.iter().map(Column::header).collect()
    }
}

/// A report cell before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

impl ReportRow {
    pub fn value(&self, column: Column) -> Value<'_> {
        match column {
            Column::TransactionCode => Value::Text(&self.transaction_code),
            Column::ItemDescription => Value::Text(&self.item_description),
            Column::FromDate => Value::Text(&self.from_date),
            Column::TransactionDescription => Value::Text(&self.transaction_description),
            Column::ItemValue => Value::Number(self.item_value),
            Column::AvgTimeFactor => Value::Number(self.avg_time_factor),
            Column::DerivedTime => Value::Number(self.derived_time),
        }
    }
}

fn project(r: &EnrichedRecord) -> ReportRow {
    ReportRow {
        transaction_code: r.record.transaction_code.clone(),
        item_description: r.record.item_description.clone(),
        from_date: r.record.from_date.clone(),
        transaction_description: r.record.transaction_description.clone(),
        item_value: r.record.item_value,
        avg_time_factor: r.avg_time_factor,
        derived_time: r.derived_time,
    }
}

/// Largest derived time first; rows without one go last.
fn by_derived_time_desc(a: &ReportRow, b: &ReportRow) -> Ordering {
    match (a.derived_time, b.derived_time) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn shape(records: &[EnrichedRecord]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = records.iter().map(project).collect();
    // sort_by is stable, so ties keep upload order
    rows.sort_by(by_derived_time_desc);
    rows
}
