use crate::provider::error::ProviderError;
use crate::flattener::ParseError;
use chrono::NaiveDate;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WwoError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown weather attribute(s): {}", attributes.join(", "))]
    UnknownAttribute { attributes: Vec<String> },

    #[error("Provider rejected the API key: {message}")]
    Auth { message: String },

    #[error("Provider is throttling requests: {message}")]
    RateLimit { message: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Failed building the dataset frame")]
    DataFrame(#[from] PolarsError),
}

impl WwoError {
    pub(crate) fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export directory '{0}'")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to create temporary export file in '{0}'")]
    TempFile(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV export '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to move CSV export into place at '{0}'")]
    Persist(PathBuf, #[source] std::io::Error),

    #[error("Failed to read CSV export '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Unexpected content in CSV export '{path}': {message}")]
    CsvContent { path: PathBuf, message: String },
}
