use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("refusing to overwrite existing file: {0}")]
    AlreadyExists(String),
}

/// Errors raised while reading or coercing fixture data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("no header row in the file for table {0}")]
    EmptyFile(String),

    #[error("unknown column {column} for table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("{table}.{column} line {line}: cannot read {raw:?} as {expected}")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        line: u64,
        raw: String,
        expected: &'static str,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Data(DataError::Csv(err))
    }
}
