use thiserror::Error;

/// Result type used by the storage, logic and api layers.
pub type Result<T> = std::result::Result<T, DevfileError>;

/// Domain errors surfaced by the data access objects and managers.
///
/// Every failure reaches the caller as one of these variants; nothing below
/// the REST layer decides on an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DevfileError {
    /// A required argument was absent (empty id, missing body, ...).
    #[error("{0} required")]
    NullArgument(&'static str),

    /// Input failed validation before any store access.
    #[error("{0}")]
    Validation(String),

    /// Malformed request at the REST edge.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Natural-key collision or dangling owner reference.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    /// Any other persistence failure. Fatal for the request only.
    #[error("{0}")]
    Storage(String),
}

impl DevfileError {
    pub fn not_found_by_id(id: &str) -> Self {
        Self::NotFound(format!("Devfile with id '{}' doesn't exist", id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for DevfileError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DevfileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("Failed to (de)serialize devfile content: {}", err))
    }
}

/// Fails with [`DevfileError::NullArgument`] when `value` is empty.
pub fn require_non_empty(value: &str, subject: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DevfileError::NullArgument(subject));
    }
    Ok(())
}
