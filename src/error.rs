use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database errors
    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Business logic errors
    #[error("Business logic error: {0}")]
    BusinessLogic(String),

    /// A transaction source could not be read
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a database connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            AppError::Database(DatabaseError::PoolCreation(_))
                | AppError::Database(DatabaseError::ConnectionTimeout)
        )
    }

    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Process exit code used by the binary
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::Validation(_) => 2,
            AppError::Database(_) | AppError::Sqlx(_) => 3,
            AppError::SourceUnavailable(_) => 4,
            _ => 1,
        }
    }
}

/// Errors raised by the source readers
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found")]
    NotFound(String),

    /// Invalid input (e.g. an inverted date window)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backing store could not be reached
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::InvalidInput(msg) => AppError::Validation(msg),
            RepositoryError::Unavailable(msg) => AppError::SourceUnavailable(msg),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            _ => RepositoryError::Query(err),
        }
    }
}

/// Convenience function to convert Option<T> to Result<T, AppError>
pub fn option_to_result<T>(opt: Option<T>, error_msg: &str) -> AppResult<T> {
    opt.ok_or_else(|| AppError::NotFound(error_msg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let err: AppError = RepositoryError::Unavailable("timeout".to_string()).into();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
        assert_eq!(err.exit_code(), 4);

        let err: AppError = RepositoryError::InvalidInput("window".to_string()).into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_pool_errors_map_to_unavailable() {
        let err: RepositoryError = SqlxError::PoolClosed.into();
        assert!(matches!(err, RepositoryError::Unavailable(_)));

        let err: RepositoryError = SqlxError::RowNotFound.into();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[test]
    fn test_option_to_result() {
        let missing: Option<u8> = None;
        let err = option_to_result(missing, "alert low_balance").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("low_balance"));
    }
}
