//! Transfer Error Types
//!
//! Error taxonomy for the transfer core. Validation and not-found errors
//! surface to the caller; ledger and store failures are absorbed by the
//! circuit-breaker fallback and never leave the orchestrator raw.

use thiserror::Error;

/// Transfer error types
#[derive(Error, Debug, Clone)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Source and target account ids are required")]
    MissingAccount,

    #[error("Invalid batch size: nothing to process")]
    EmptyBatch,

    #[error("Batch size {0} exceeds the allowed maximum of {1}")]
    BatchTooLarge(usize, usize),

    // === Lookup Errors ===
    #[error("Transfer not found: {0}")]
    NotFound(String),

    // === Dependency Errors (absorbed by the breaker fallback) ===
    #[error("Ledger call failed: {0}")]
    Ledger(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Version conflict updating transfer: {0}")]
    VersionConflict(String),
}

impl TransferError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::MissingAccount => "MISSING_ACCOUNT",
            TransferError::EmptyBatch => "EMPTY_BATCH",
            TransferError::BatchTooLarge(_, _) => "BATCH_TOO_LARGE",
            TransferError::NotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::Ledger(_) => "LEDGER_ERROR",
            TransferError::Store(_) => "STORE_ERROR",
            TransferError::VersionConflict(_) => "VERSION_CONFLICT",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::InvalidAmount
            | TransferError::MissingAccount
            | TransferError::EmptyBatch
            | TransferError::BatchTooLarge(_, _) => 400,
            TransferError::NotFound(_) => 404,
            TransferError::Ledger(_)
            | TransferError::Store(_)
            | TransferError::VersionConflict(_) => 500,
        }
    }

    /// Dependency failures count against the circuit breaker; validation and
    /// lookup errors do not (the dependency answered correctly).
    #[inline]
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            TransferError::Ledger(_) | TransferError::Store(_) | TransferError::VersionConflict(_)
        )
    }
}

impl From<sqlx::Error> for TransferError {
    fn from(e: sqlx::Error) -> Self {
        TransferError::Store(e.to_string())
    }
}

impl From<crate::ledger::LedgerError> for TransferError {
    fn from(e: crate::ledger::LedgerError) -> Self {
        TransferError::Ledger(e.to_string())
    }
}
