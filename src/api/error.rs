//! Classification of store API failures.

use serde_json::Value;

use crate::error::VfsError;

/// Failure classes of the store API, keyed by HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Malformed request (400)
    BadRequest,
    /// Bad credentials (401)
    Unauthorized,
    /// Not permitted (403)
    Forbidden,
    /// Resource does not exist (404)
    NotFound,
    /// Resource already exists (409)
    Conflict,
    /// Payload over the plan limit (413)
    TooLarge,
    /// Rate limit exceeded (420, 429)
    RateLimited,
    /// Server-side failure (5xx)
    Server,
    /// Anything else
    Unknown,
}

impl From<u16> for StatusClass {
    fn from(status: u16) -> Self {
        match status {
            400 => StatusClass::BadRequest,
            401 => StatusClass::Unauthorized,
            403 => StatusClass::Forbidden,
            404 => StatusClass::NotFound,
            409 => StatusClass::Conflict,
            413 => StatusClass::TooLarge,
            420 | 429 => StatusClass::RateLimited,
            500..=599 => StatusClass::Server,
            _ => StatusClass::Unknown,
        }
    }
}

impl StatusClass {
    /// Get human-readable description of the class.
    pub fn description(&self) -> &'static str {
        match self {
            StatusClass::BadRequest => "Bad request",
            StatusClass::Unauthorized => "Invalid credentials",
            StatusClass::Forbidden => "Access denied",
            StatusClass::NotFound => "Resource does not exist",
            StatusClass::Conflict => "Resource already exists",
            StatusClass::TooLarge => "Payload too large",
            StatusClass::RateLimited => "Rate limit exceeded",
            StatusClass::Server => "Server error",
            StatusClass::Unknown => "Unknown error",
        }
    }
}

/// Extract `error.message` from a store error body.
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Translate a failed response into the crate's error taxonomy.
///
/// `context` names the addressed resource for the error message.
pub fn classify_failure(status: u16, body: &str, context: &str) -> VfsError {
    let class = StatusClass::from(status);
    let message = error_message(body).unwrap_or_else(|| class.description().to_string());

    match class {
        StatusClass::NotFound => VfsError::NotFound(context.to_string()),
        StatusClass::Conflict => VfsError::AlreadyExists(context.to_string()),
        StatusClass::BadRequest if message.to_ascii_lowercase().contains("already exists") => {
            VfsError::AlreadyExists(context.to_string())
        }
        StatusClass::BadRequest if message.to_ascii_lowercase().contains("file size too large") => {
            VfsError::PayloadTooLarge { size: 0, limit: 0 }
        }
        StatusClass::TooLarge => VfsError::PayloadTooLarge { size: 0, limit: 0 },
        _ => VfsError::StoreUnavailable(format!("{} ({}): {}", context, status, message)),
    }
}
