// src/utils/error.rs

use crate::services::core::ingestion::geojson::IngestError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AtlasResult<T> = Result<T, AtlasError>;

/// Main error type for the portal analytics crate.
///
/// Only boundary code (ingestion, the metrics client) produces these; the
/// analytics computation itself is total over its typed input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasError {
    pub message: String,
    pub status: Option<u16>,
    pub error_code: Option<String>,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[default]
    UnknownError,
    ApiError,
    NetworkError,
    ValidationError,
    ConfigurationError,
    SerializationError,
    DeserializationError,
    NotFoundError,
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AtlasError {}

impl AtlasError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            error_code: None,
            kind,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    // Convenience constructors for common error types
    pub fn api_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ApiError, message)
            .with_status(502)
            .with_code("API_ERROR")
    }

    pub fn network_error<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::NetworkError, message)
            .with_status(503)
            .with_code("NETWORK_ERROR")
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
            .with_status(400)
            .with_code("VALIDATION_ERROR")
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeserializationError, message)
            .with_status(400)
            .with_code("PARSE_ERROR")
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationError, message)
            .with_status(500)
            .with_code("CONFIG_ERROR")
    }

    pub fn not_found<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::NotFoundError, message)
            .with_status(404)
            .with_code("NOT_FOUND")
    }

    pub fn serialization_error<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::SerializationError, message)
            .with_status(400)
            .with_code("SERIALIZATION_ERROR")
    }
}

// From conversions for errors crossing the crate boundary
impl From<serde_json::Error> for AtlasError {
    fn from(err: serde_json::Error) -> Self {
        AtlasError::parse_error(format!("JSON parsing error: {}", err))
    }
}

impl From<url::ParseError> for AtlasError {
    fn from(err: url::ParseError) -> Self {
        AtlasError::validation_error(format!("URL parse error: {}", err))
    }
}

impl From<reqwest::Error> for AtlasError {
    fn from(err: reqwest::Error) -> Self {
        AtlasError::network_error(format!("HTTP transport error: {}", err))
    }
}

impl From<IngestError> for AtlasError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::NotAFeatureCollection(_) => AtlasError::validation_error(err.to_string()),
            IngestError::MissingFeatures => AtlasError::parse_error(err.to_string()),
        }
    }
}
