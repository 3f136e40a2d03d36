//! Shared error types for the promotion system

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SharedError {
    #[error("Catalog entry is missing an ASIN")]
    MissingAsin,

    #[error("Invalid field value: {field} = {value}")]
    InvalidField { field: String, value: String },

    #[error("Unknown subscription tier: {input}")]
    UnknownTier { input: String },

    #[error("Unknown platform: {input}")]
    UnknownPlatform { input: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },
}

impl SharedError {
    pub fn invalid_field(field: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
