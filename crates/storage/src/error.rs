use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Malformed input. The caller has to correct it; retrying is pointless.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requester does not own the record they tried to change.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A concurrent write won the race at the storage boundary.
    #[error("State conflict: {0}")]
    StateConflict(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::StateConflict(msg.into())
    }

    /// Whether the whole operation may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::StateConflict(_))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(StorageError::conflict("tier moved").is_retryable());
        assert!(!StorageError::validation("bad count").is_retryable());
        assert!(!StorageError::NotFound.is_retryable());
        assert!(!StorageError::forbidden("not yours").is_retryable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            StorageError::validation("duplicate candidate").to_string(),
            "Validation error: duplicate candidate"
        );
        assert_eq!(StorageError::NotFound.to_string(), "Not found");
    }
}
