//! Error taxonomy for schema reconciliation.
//!
//! Every public operation of the engine returns [`SyncResult`]. Lower-level
//! client failures ([`MetadataError`]) convert into [`SyncError::Upstream`] or
//! [`SyncError::ConfigurationMissing`] at the engine boundary.

use thiserror::Error;

use crate::metadata::MetadataError;

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the registry, the DDL generator and the reconciler.
#[derive(Error, Debug)]
pub enum SyncError {
    /// An untrusted table or column name failed the identifier pattern check.
    #[error("invalid identifier {0:?}: only letters, digits and underscores are allowed")]
    InvalidIdentifier(String),

    /// A model or column list is structurally invalid.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Required service address or admin secret is absent.
    #[error("missing configuration: {0}")]
    ConfigurationMissing(String),

    /// The table (or model) does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The metadata service rejected a request or returned an error payload.
    #[error("metadata service error: {0}")]
    Upstream(String),

    /// Some corrective actions succeeded and others did not.
    #[error("{summary}")]
    PartialFailure {
        /// Human-readable summary.
        summary: String,
        /// Targets of the actions that were applied.
        succeeded: Vec<String>,
        /// Targets of the actions that failed.
        failed: Vec<String>,
    },

    /// Another reconciliation holds the table lock.
    #[error("table {0} is being reconciled by another request")]
    Busy(String),
}

impl SyncError {
    /// Create a not-found error for a table.
    pub fn table_not_found(name: &str) -> Self {
        Self::NotFound(format!("table \"{name}\""))
    }

    /// Create a not-found error for a registered model.
    pub fn model_not_found(name: &str) -> Self {
        Self::NotFound(format!("model \"{name}\""))
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Identifier and configuration errors are fatal.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::Busy(_))
    }
}

impl From<MetadataError> for SyncError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::ConfigurationMissing(what) => Self::ConfigurationMissing(what),
            other => Self::Upstream(other.to_string()),
        }
    }
}
