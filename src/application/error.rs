use thiserror::Error;

use crate::domain::LedgerError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Invalid savings data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors caused by the caller's input rather than the environment.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Ledger(LedgerError::CapacityExceeded { .. })
                | AppError::Ledger(LedgerError::Validation(_))
                | AppError::MemberNotFound(_)
        )
    }
}
