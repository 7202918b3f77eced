use std::io;

use thiserror::Error;


/**
 * Everything that can abort a conversion. Recoverable conditions (incomplete
 * snapshots, unknown mode or command names) are logged instead and never show
 * up here.
 */
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unable to open {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unable to serialize feature: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no handler registered for {0} records")]
    UnhandledType(String),

    #[error("{type_name} record is missing field {field}")]
    MissingField { type_name: String, field: String },

    #[error("{type_name}.{field} is not numeric")]
    WrongFieldType { type_name: String, field: String },

    #[error("bad condition at offset {offset}: {message}")]
    Condition { offset: usize, message: String },

    #[error("{0}")]
    Usage(String),
}


pub type Result<T> = std::result::Result<T, ConvertError>;
