use thiserror::Error;

/// Every failure a ledger operation can end with.
///
/// Storage code produces `NotFound`, `AccountNotFound`, `Conflict` and
/// `Storage`; services add the validation kinds and forward the rest as-is.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Ledger account not found: {0}")]
    AccountNotFound(String),

    #[error("Account {0} still has ledger entries")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// True when the database refused a statement because of a foreign key.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_foreign_key_violation()
                // SQLITE_CONSTRAINT_FOREIGNKEY / postgres foreign_key_violation
                || matches!(db_err.code().as_deref(), Some("787") | Some("23503"))
        }
        _ => false,
    }
}
