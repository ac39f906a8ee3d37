pub mod config;
pub mod factors;
pub mod process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "estab",
    version,
    about = "Compute establishment strength from postal transaction workbooks."
)]
pub struct Cli {
    /// Log debug detail to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process an uploaded workbook and write the establishment report.
    Process {
        /// Path to the filled .xls, .xlsx or .csv file, or - for stdin
        file: String,
        /// Format of stdin input: xlsx, xls or csv
        #[arg(long = "input-format")]
        input_format: Option<String>,
        /// Time factor reference table (default: from settings)
        #[arg(long)]
        reference: Option<String>,
        /// Directory for processed_establishment_data.<ext>
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        /// Report format: xlsx or csv
        #[arg(long, default_value = "xlsx")]
        format: String,
        /// Divisor applied to item_value * avg_time_factor
        #[arg(long)]
        divisor: Option<f64>,
        /// Minutes in one staff working day
        #[arg(long = "shift-minutes")]
        shift_minutes: Option<f64>,
        /// Number of rows to preview on screen
        #[arg(long)]
        preview: Option<usize>,
    },
    /// List the time factor reference table.
    Factors {
        /// Time factor reference table (default: from settings)
        #[arg(long)]
        reference: Option<String>,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print current settings.
    Show,
    /// Set a single setting.
    Set {
        /// One of: reference_path, time_factor_divisor, shift_minutes, output_dir, preview_rows
        key: String,
        value: String,
    },
}
