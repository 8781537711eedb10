//! Metadata client error types.

use thiserror::Error;

/// Result type for metadata service operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors returned by a [`MetadataService`](super::MetadataService).
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Endpoint, subdomain or admin secret is not configured.
    #[error("missing configuration: {0}")]
    ConfigurationMissing(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (connect, timeout, TLS).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("metadata service returned {status}: {message}")]
    Status {
        status: u16,
        /// Hasura error code such as `already-tracked` or `postgres-error`.
        code: Option<String>,
        message: String,
    },

    /// A GraphQL response carried `errors`.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response body could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl MetadataError {
    /// Create a status error.
    pub fn status(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            code,
            message: message.into(),
        }
    }

    /// Whether the service reported that the object already exists.
    ///
    /// Tracking an already-tracked table and re-creating an existing
    /// relationship both count as success.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::Status { code, message, .. } => {
                matches!(code.as_deref(), Some("already-tracked" | "already-exists"))
                    || message.contains("already tracked")
                    || message.contains("already exists")
            }
            _ => false,
        }
    }

    /// Whether this error must not be retried with another request shape.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigurationMissing(_) | Self::Client(_))
    }
}

/// Parse a Hasura error body: `{"error": "...", "code": "...", "internal": ...}`.
pub(crate) fn status_error(status: u16, body: &str) -> MetadataError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|v| v.get("code"))
        .and_then(|c| c.as_str())
        .map(str::to_string);
    let message = parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/internal/error/message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(500).collect());
    MetadataError::status(status, code, message)
}
