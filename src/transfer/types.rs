//! Transfer Core Types
//!
//! Type definitions for the transfer orchestration core.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::TransferError;

/// Transfer identifier - UUID-based unique identifier
///
/// Doubles as the idempotency key: re-submission with the same id must not
/// cause a duplicate ledger submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(String);

impl TransferId {
    /// Generate a fresh unique TransferId
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap a caller-supplied id
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for TransferId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Transfer lifecycle status
///
/// A row is inserted as PENDING before the ledger call and moved exactly once
/// to the status the ledger (or the fallback) returns. The ledger may answer
/// with a token outside the known set; such tokens are carried verbatim as
/// `Other` and treated as terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    /// Outcome not known (also the status-read fallback)
    Unknown,
    /// Recorded locally, ledger outcome not yet received
    Pending,
    /// Terminal: ledger executed the debit/credit
    Success,
    /// Terminal: ledger rejected, or the create fallback fired
    Failed,
    /// Terminal: a ledger-defined token outside the known set
    Other(String),
}

impl TransferStatus {
    /// Parse a ledger status token. Never fails: unrecognized tokens are
    /// carried verbatim as `Other`.
    pub fn parse(token: &str) -> Self {
        match token {
            "UNKNOWN" => TransferStatus::Unknown,
            "PENDING" => TransferStatus::Pending,
            "SUCCESS" => TransferStatus::Success,
            "FAILED" => TransferStatus::Failed,
            other => TransferStatus::Other(other.to_string()),
        }
    }

    /// Status token as stored and returned to callers
    pub fn as_str(&self) -> &str {
        match self {
            TransferStatus::Unknown => "UNKNOWN",
            TransferStatus::Pending => "PENDING",
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Failed => "FAILED",
            TransferStatus::Other(token) => token,
        }
    }

    /// Check if this is a terminal status (no further transition expected)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Success | TransferStatus::Failed | TransferStatus::Other(_)
        )
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transfer request from the API layer
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Caller-supplied transfer id (idempotency key); generated when absent
    pub transfer_id: Option<TransferId>,
    /// Account to debit
    pub from_account_id: String,
    /// Account to credit
    pub to_account_id: String,
    /// Exact decimal amount, must be > 0
    pub amount: Decimal,
}

impl TransferRequest {
    pub fn new(from_account_id: &str, to_account_id: &str, amount: Decimal) -> Self {
        Self {
            transfer_id: None,
            from_account_id: from_account_id.to_string(),
            to_account_id: to_account_id.to_string(),
            amount,
        }
    }

    pub fn with_id(mut self, id: TransferId) -> Self {
        self.transfer_id = Some(id);
        self
    }

    /// Validate the request before any store or ledger interaction
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount);
        }
        if self.from_account_id.is_empty() || self.to_account_id.is_empty() {
            return Err(TransferError::MissingAccount);
        }
        Ok(())
    }
}

/// Transfer record as persisted in the store
#[derive(Debug, Clone)]
pub struct TransferRecord {
    /// Unique transfer id (also the store primary key)
    pub id: TransferId,
    /// Account debited
    pub from_account_id: String,
    /// Account credited
    pub to_account_id: String,
    /// Exact decimal amount
    pub amount: Decimal,
    /// Current lifecycle status
    pub status: TransferStatus,
    /// Optimistic-concurrency counter, bumped on every mutation
    pub version: i64,
    /// Insert timestamp, retention key
    pub created_at: DateTime<Utc>,
}

impl TransferRecord {
    /// Create a new record in PENDING state
    pub fn new(id: TransferId, req: &TransferRequest) -> Self {
        Self {
            id,
            from_account_id: req.from_account_id.clone(),
            to_account_id: req.to_account_id.clone(),
            amount: req.amount,
            status: TransferStatus::Pending,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} -> {} amount={} status={} v{}",
            self.id, self.from_account_id, self.to_account_id, self.amount, self.status, self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_token_roundtrip() {
        for token in ["UNKNOWN", "PENDING", "SUCCESS", "FAILED"] {
            assert_eq!(TransferStatus::parse(token).as_str(), token);
        }
    }

    #[test]
    fn test_status_other_carried_verbatim() {
        let status = TransferStatus::parse("ON_HOLD");
        assert_eq!(status, TransferStatus::Other("ON_HOLD".to_string()));
        assert_eq!(status.as_str(), "ON_HOLD");
        assert!(status.is_terminal());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(TransferStatus::Success.is_terminal());
        assert!(TransferStatus::Failed.is_terminal());
        assert!(!TransferStatus::Pending.is_terminal());
        assert!(!TransferStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_transfer_id_unique() {
        assert_ne!(TransferId::generate(), TransferId::generate());
    }

    #[test]
    fn test_request_validation() {
        let req = TransferRequest::new("1", "2", dec!(100.00));
        assert!(req.validate().is_ok());

        let req = TransferRequest::new("1", "2", dec!(0));
        assert!(matches!(req.validate(), Err(TransferError::InvalidAmount)));

        let req = TransferRequest::new("1", "2", dec!(-5));
        assert!(matches!(req.validate(), Err(TransferError::InvalidAmount)));

        let req = TransferRequest::new("", "2", dec!(1));
        assert!(matches!(req.validate(), Err(TransferError::MissingAccount)));
    }

    #[test]
    fn test_record_new_is_pending() {
        let req = TransferRequest::new("1", "2", dec!(100.00));
        let record = TransferRecord::new(TransferId::generate(), &req);

        assert_eq!(record.status, TransferStatus::Pending);
        assert_eq!(record.version, 0);
        assert_eq!(record.amount, dec!(100.00));
    }
}
