use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstabError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Could not read '{file}': {detail}")]
    MalformedInput { file: String, detail: String },

    #[error("Row {row}: '{value}' in column '{column}' is not a number")]
    InvalidNumber { row: usize, column: String, value: String },

    #[error("Required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("Reference table error: {0}")]
    Reference(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EstabError>;

/// Fatal error classes surfaced at the pipeline boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    MissingColumn,
    Reference,
    Output,
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MalformedInput => "malformed input",
            Self::MissingColumn => "missing column",
            Self::Reference => "reference table",
            Self::Output => "report output",
            Self::Configuration => "configuration",
        };
        f.write_str(label)
    }
}

impl EstabError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Csv(_)
            | Self::Workbook(_)
            | Self::MalformedInput { .. }
            | Self::InvalidNumber { .. }
            | Self::UnknownFormat(_) => ErrorKind::MalformedInput,
            Self::MissingColumn { .. } => ErrorKind::MissingColumn,
            Self::Reference(_) => ErrorKind::Reference,
            Self::Io(_) | Self::Xlsx(_) => ErrorKind::Output,
            Self::Settings(_) | Self::Other(_) => ErrorKind::Configuration,
        }
    }

    /// Message safe to show to the person who uploaded the file. Library
    /// error text stays out of it.
    pub fn user_message(&self) -> String {
        match self {
            Self::Csv(_) | Self::Workbook(_) => {
                "The uploaded file could not be read as a spreadsheet.".to_string()
            }
            Self::MalformedInput { file, detail } => format!("Error reading '{file}': {detail}"),
            Self::InvalidNumber { row, column, value } => {
                format!("Row {row}: '{value}' in column '{column}' is not a number.")
            }
            Self::MissingColumn { column } => {
                format!("The uploaded file has no '{column}' column.")
            }
            Self::UnknownFormat(ext) => {
                format!("Unsupported file type '{ext}'. Upload an .xls, .xlsx or .csv file.")
            }
            Self::Reference(detail) => format!("Time factor table unavailable: {detail}"),
            Self::Io(_) | Self::Xlsx(_) => "The report could not be produced.".to_string(),
            Self::Settings(detail) => format!("Invalid settings: {detail}"),
            Self::Other(msg) => msg.clone(),
        }
    }
}
