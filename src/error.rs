use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Missing sheet: {0}")]
    MissingSheet(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed input at row {row}, column {column}: {reason}")]
    MalformedInput {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Records out of order at index {index}: {later} follows {earlier} (expected newest first)")]
    UnorderedRecords {
        index: usize,
        earlier: String,
        later: String,
    },

    #[error("History file error: {0}")]
    History(String),

    #[error("Invalid month: {0} (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
