/// Error types for query building and transaction management
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller misuse detected before any statement was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error from SQLx (acquire, begin, execute, commit or rollback)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Transaction has already been consumed (committed or rolled back)
    #[error("Transaction has already been consumed")]
    AlreadyConsumed,

    /// Invalid database configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Returns `true` if this error was raised before anything reached the database.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result type alias for query building and transaction operations
pub type Result<T> = std::result::Result<T, Error>;
