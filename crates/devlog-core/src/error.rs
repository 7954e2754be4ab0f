//! Domain-level and store-level error types.

use thiserror::Error;

/// Domain errors - business logic failures surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid credentials or token")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Integrity fault: {0}")]
    Integrity(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    /// Safe to retry by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Store-level errors. The store itself distinguishes the outcomes the
/// services need: a violated unique index, a missing document, and
/// transient I/O failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write violated the unique index on the named field. This is the
    /// conflict-detection backstop for slug and name uniqueness.
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(&'static str),

    #[error("document not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => {
                DomainError::Conflict(format!("duplicate value for {field}"))
            }
            StoreError::NotFound => DomainError::NotFound { entity: "document" },
            StoreError::Unavailable(msg) => DomainError::Transient(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_maps_to_conflict() {
        let err: DomainError = StoreError::Duplicate("slug").into();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn unavailable_is_retryable() {
        let err: DomainError = StoreError::Unavailable("timeout".into()).into();
        assert!(err.is_retryable());
    }
}
