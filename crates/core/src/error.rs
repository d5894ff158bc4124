/// Errors raised by core services.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("share link has expired")]
    Expired,
    #[error("share link has reached maximum access count")]
    AccessExhausted,
    #[error("downloads are not allowed for this share link")]
    DownloadNotAllowed,
    #[error("invalid record type: {0}")]
    InvalidScope(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid text: {0}")]
    Text(#[from] medvault_types::TextError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("failed to serialize record ids: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to hash password: {0}")]
    PasswordHash(argon2::password_hash::Error),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

impl RecordError {
    /// Maps a unique-constraint violation on insert to [`RecordError::Conflict`].
    ///
    /// Any other database error is passed through unchanged.
    pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RecordError::Conflict(what.to_owned())
            }
            _ => RecordError::Database(err),
        }
    }
}
