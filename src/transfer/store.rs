//! Transfer Store Contract
//!
//! Keyed repository the orchestrator depends on. `save`-style writes are
//! split into `insert` (new row, primary-key conflict is a distinct outcome)
//! and `update_status` (optimistic CAS on the version counter) so the
//! idempotency and lost-update guarantees are explicit at the seam.
//!
//! Every write must be atomic per row and visible to `find_by_id` calls
//! issued after it returns (read-your-writes) - the duplicate-create
//! short-circuit depends on this.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::TransferError;
use super::types::{TransferId, TransferRecord, TransferStatus};

/// Outcome of an insert attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row inserted; this caller owns the ledger submission
    Inserted,
    /// Primary key already present; a concurrent or earlier create won
    Conflict,
}

/// Transfer repository operations the core depends on
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Look up a transfer by id
    async fn find_by_id(&self, id: &TransferId) -> Result<Option<TransferRecord>, TransferError>;

    /// Insert a new transfer row
    ///
    /// A duplicate primary key reports `Conflict` instead of failing, so two
    /// racing first-time creates with the same id degrade to the
    /// idempotent-read path.
    async fn insert(&self, record: &TransferRecord) -> Result<InsertOutcome, TransferError>;

    /// Update the status of a row, guarded by the version counter
    ///
    /// Returns `Ok(true)` and bumps the version when `expected_version`
    /// matches; `Ok(false)` when another writer got there first.
    async fn update_status(
        &self,
        id: &TransferId,
        expected_version: i64,
        status: &TransferStatus,
    ) -> Result<bool, TransferError>;

    /// Delete all transfers created before the cutoff, regardless of status.
    /// Returns the number of rows removed.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, TransferError>;
}
