//! Error types for the cloudvfs library.

use thiserror::Error;

/// Main error type for cloudvfs operations.
///
/// Store adapters translate transport and API failures into these variants at their
/// boundary, so callers only ever match on this taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// Malformed path, key or file name supplied by the caller.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The addressed object or folder record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A folder record already exists at this path.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Transport or backend fault.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Upload payload exceeds the configured maximum.
    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Missing or invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VfsError {
    /// Check if this error means "the target is absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound(_))
    }
}

impl From<reqwest::Error> for VfsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VfsError::StoreUnavailable("request timed out".to_string())
        } else {
            VfsError::StoreUnavailable(format!("request error: {}", err))
        }
    }
}

impl From<serde_json::Error> for VfsError {
    fn from(err: serde_json::Error) -> Self {
        VfsError::StoreUnavailable(format!("malformed response: {}", err))
    }
}

/// Result type alias for cloudvfs operations.
pub type Result<T> = std::result::Result<T, VfsError>;
