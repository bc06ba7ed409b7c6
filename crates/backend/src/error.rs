//! Error handling for the backend client

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Error document returned by PostgREST, auth and storage on failure
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorDetails {
    /// Backend error code, e.g. `42501` or `PGRST116`
    #[serde(default, alias = "error_code", alias = "statusCode")]
    pub code: Option<String>,

    /// Human readable message
    #[serde(default, alias = "msg", alias = "error_description")]
    pub message: Option<String>,

    #[serde(default)]
    pub details: Option<String>,

    #[serde(default)]
    pub hint: Option<String>,
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Unified error type for the backend client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT decoding errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Session file errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend answered with a structured error document
    #[error("API error: {details} (Status: {status})")]
    Api {
        status: reqwest::StatusCode,
        details: ApiErrorDetails,
    },

    /// The backend answered with an error body that could not be parsed
    #[error("API error (unparsed): {message} (Status: {status})")]
    UnparsedApi {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The error code reported by the backend, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { details, .. } => details.code.as_deref(),
            _ => None,
        }
    }

    /// The HTTP status reported by the backend, if any
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Error::Api { status, .. } | Error::UnparsedApi { status, .. } => Some(*status),
            Error::Http(err) => err.status(),
            _ => None,
        }
    }

    /// The backend's own message, if any
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Error::Api { details, .. } => details.message.as_deref(),
            Error::UnparsedApi { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Build the error for a failed response body
    pub(crate) fn from_response(status: reqwest::StatusCode, body: String) -> Self {
        match serde_json::from_str::<ApiErrorDetails>(&body) {
            Ok(details) if details.code.is_some() || details.message.is_some() => {
                Error::Api { status, details }
            }
            _ => Error::UnparsedApi {
                status,
                message: body,
            },
        }
    }
}
