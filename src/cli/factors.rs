use std::path::PathBuf;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::reference::load_reference;
use crate::settings::load_settings;

pub fn list(reference: Option<String>) -> Result<()> {
    let path = PathBuf::from(reference.unwrap_or_else(|| load_settings().reference_path));
    let factors = load_reference(&path)?;

    if factors.is_empty() {
        println!("No time factors in {}", path.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Transaction Code", "Avg Time Factor"]);
    for entry in factors.entries() {
        table.add_row(vec![
            Cell::new(&entry.transaction_code),
            Cell::new(entry.avg_time_factor),
        ]);
    }
    println!("Time Factors ({})\n{table}", path.display());
    if factors.duplicates() > 0 {
        println!(
            "{} duplicate code(s) ignored; the first occurrence of each code is used.",
            factors.duplicates()
        );
    }
    Ok(())
}
