use thiserror::Error;

/// Errors returned by every data-access operation
///
/// An empty result is never an error: missing rows come back as `None`
/// or an empty `Vec`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Unknown owner: {0}")]
    UnknownOwner(i32),

    #[error("Nightly cost out of range: {0}")]
    CostOutOfRange(f64),

    #[error("No identifiers left in {0}")]
    IdOverflow(&'static str),

    #[error("Fixture parse error: {0}")]
    FixtureError(#[from] serde_json::Error),

    #[error("Fixture read error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StoreError {
    /// Log input rejected before any query runs and wrap it
    pub(crate) fn rejected(errors: validator::ValidationErrors, operation: &str) -> Self {
        tracing::warn!("Rejected {} input: {}", operation, errors);
        Self::InvalidInput(errors)
    }

    /// Map a violation of the unique email constraint to `DuplicateEmail`
    pub(crate) fn from_insert_user(err: sqlx::Error, email: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                return Self::DuplicateEmail(email.to_string());
            }
        }
        Self::SqlxError(err)
    }

    /// Map a violation of the owner foreign key to `UnknownOwner`
    pub(crate) fn from_insert_listing(err: sqlx::Error, owner_id: i32) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return Self::UnknownOwner(owner_id);
            }
        }
        Self::SqlxError(err)
    }
}
