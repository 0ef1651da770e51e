use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Error taxonomy for the introspection/CRUD core.
///
/// Each variant carries an HTTP-style status code so callers embedding this
/// library behind a web framework can translate failures uniformly.
#[derive(Error, Debug)]
pub enum BackplaneError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        details: Option<String>,
    },

    #[error("Database error: {message}")]
    Database {
        message: String,
        details: Option<String>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackplaneError {
    pub fn connection(message: impl Into<String>) -> Self {
        BackplaneError::Connection {
            message: message.into(),
            details: None,
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        BackplaneError::Database {
            message: message.into(),
            details: None,
        }
    }

    /// Machine-readable code used in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            BackplaneError::Validation(_) => "VALIDATION_ERROR",
            BackplaneError::NotFound(_) => "NOT_FOUND",
            BackplaneError::Unauthorized(_) => "UNAUTHORIZED",
            BackplaneError::Connection { .. } => "CONNECTION_ERROR",
            BackplaneError::Database { .. } => "DATABASE_ERROR",
            BackplaneError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            BackplaneError::Validation(_) => 400,
            BackplaneError::NotFound(_) => 404,
            BackplaneError::Unauthorized(_) => 401,
            BackplaneError::Connection { .. }
            | BackplaneError::Database { .. }
            | BackplaneError::Internal(_) => 500,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            BackplaneError::Connection { details, .. }
            | BackplaneError::Database { details, .. } => details.as_deref(),
            _ => None,
        }
    }

    /// Build the uniform response envelope for this error.
    ///
    /// `include_details` should be off in production so raw driver messages
    /// never reach clients.
    pub fn to_envelope(&self, include_details: bool) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorBody {
                message: self.to_string(),
                code: self.code(),
                status_code: self.status_code(),
                details: if include_details {
                    self.details().map(str::to_string)
                } else {
                    None
                },
                timestamp: Utc::now(),
            },
        }
    }
}

/// Uniform error envelope: `{"error": {message, code, statusCode, details?, timestamp}}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}
