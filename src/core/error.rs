use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Record not found: {table} {id}")]
    RecordNotFound { table: String, id: String },

    #[error("Missing field {field} on {record}")]
    MissingField { record: String, field: &'static str },

    #[error("Action {0} has no hit or bullet part, startup is undefined")]
    MissingStartup(String),

    #[error("Invalid label pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl ExportError {
    pub fn missing(record: impl std::fmt::Display, field: &'static str) -> Self {
        ExportError::MissingField {
            record: record.to_string(),
            field,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
