//! Ledger Client
//!
//! Outbound call abstraction for the external ledger authority. The ledger
//! performs the actual debit/credit and is the source of truth for the
//! outcome; this client performs exactly one attempt per invocation - failure
//! isolation and fallbacks live with the circuit breaker, not here.

pub mod http;

pub use http::HttpLedgerClient;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::transfer::types::TransferId;

/// Instruction submitted to the ledger
///
/// Wire shape matches the ledger API: camelCase JSON body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerInstruction {
    pub transfer_id: TransferId,
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: Decimal,
}

/// Ledger client errors (transport-level; never shown to API callers raw)
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("Ledger transport error: {0}")]
    Transport(String),

    #[error("Ledger returned HTTP {0}")]
    Status(u16),

    #[error("Ledger response unreadable: {0}")]
    Body(String),
}

/// Synchronous outbound call to the ledger authority
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a transfer instruction; returns the ledger's status token.
    ///
    /// One attempt only. Any retry policy belongs to the caller.
    async fn submit(&self, instruction: &LedgerInstruction) -> Result<String, LedgerError>;
}


#[cfg(test)]
pub use mock::MockLedgerClient;
