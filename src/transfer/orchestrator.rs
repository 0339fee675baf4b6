//! Transfer Orchestrator
//!
//! The core create/status logic. Public methods are thin dispatch wrappers:
//! they validate, ask the circuit breaker for admission, delegate to the pure
//! orchestration inner functions, and map dependency failures onto the
//! fallback statuses. Batch workers always enter through the wrappers so the
//! breaker applies from every path.
//!
//! Ordering invariant inside one create: the pending row is inserted and
//! visible *before* the ledger call, and finalized to the returned status
//! *after* it - this is what makes the "already exists" check safe to
//! short-circuit duplicate creates with at most one ledger submission per id.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::breaker::CircuitBreaker;
use crate::ledger::{LedgerClient, LedgerInstruction};

use super::error::TransferError;
use super::store::{InsertOutcome, TransferStore};
use super::types::{TransferId, TransferRecord, TransferRequest, TransferStatus};

/// Fallback for a create that could not reach the ledger: the transfer is
/// reported FAILED. Pure and infallible.
pub fn fallback_create_transfer(_req: &TransferRequest) -> TransferStatus {
    TransferStatus::Failed
}

/// Fallback for a status read with a degraded store: UNKNOWN rather than
/// blocking or surfacing the outage. Pure and infallible.
pub fn fallback_get_status(_id: &TransferId) -> TransferStatus {
    TransferStatus::Unknown
}

/// Transfer Orchestrator - owns the store, the ledger client and the breaker
pub struct TransferOrchestrator {
    store: Arc<dyn TransferStore>,
    ledger: Arc<dyn LedgerClient>,
    breaker: Arc<CircuitBreaker>,
}

impl TransferOrchestrator {
    pub fn new(
        store: Arc<dyn TransferStore>,
        ledger: Arc<dyn LedgerClient>,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            store,
            ledger,
            breaker,
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Create a transfer (idempotent per id) and return its status.
    ///
    /// Validation failures surface as errors; ledger/store failures never do -
    /// they are absorbed into the FAILED fallback after being counted against
    /// the breaker.
    pub async fn create_transfer(
        &self,
        req: TransferRequest,
    ) -> Result<TransferStatus, TransferError> {
        req.validate()?;

        let id = req
            .transfer_id
            .clone()
            .unwrap_or_else(TransferId::generate);

        if !self.breaker.acquire().await {
            warn!(transfer_id = %id, "Circuit open - transfer short-circuited to fallback");
            return Ok(fallback_create_transfer(&req));
        }

        match self.create_transfer_inner(&id, &req).await {
            Ok(status) => {
                self.breaker.record_success().await;
                Ok(status)
            }
            Err(e) if e.is_dependency_failure() => {
                self.breaker.record_failure().await;
                error!(transfer_id = %id, error = %e, "Create transfer degraded to fallback");
                Ok(fallback_create_transfer(&req))
            }
            Err(e) => Err(e),
        }
    }

    /// Pure orchestration: lookup, pending insert, ledger submit, finalize.
    async fn create_transfer_inner(
        &self,
        id: &TransferId,
        req: &TransferRequest,
    ) -> Result<TransferStatus, TransferError> {
        // Idempotency check: a row exists iff creation was already attempted
        if let Some(existing) = self.store.find_by_id(id).await? {
            warn!(transfer_id = %id, status = %existing.status, "Transfer already exists");
            return Ok(existing.status);
        }

        // Durability anchor: the pending row commits before the ledger call
        let record = TransferRecord::new(id.clone(), req);
        if self.store.insert(&record).await? == InsertOutcome::Conflict {
            // Racing duplicate create - the key constraint caught it; degrade
            // to the idempotent read
            warn!(transfer_id = %id, "Insert conflict - returning stored status");
            return match self.store.find_by_id(id).await? {
                Some(row) => Ok(row.status),
                None => Err(TransferError::Store(format!(
                    "Row for {} vanished after insert conflict",
                    id
                ))),
            };
        }

        let instruction = LedgerInstruction {
            transfer_id: id.clone(),
            from_account_id: req.from_account_id.clone(),
            to_account_id: req.to_account_id.clone(),
            amount: req.amount,
        };

        let token = match self.ledger.submit(&instruction).await {
            Ok(token) => token,
            Err(e) => {
                // The row must not stay pending: finalize to FAILED before
                // surfacing the failure for breaker accounting
                self.finalize_best_effort(&record, &TransferStatus::Failed)
                    .await;
                return Err(e.into());
            }
        };

        let status = TransferStatus::parse(&token);
        info!(transfer_id = %id, status = %status, "Ledger outcome received");

        self.finalize(&record, &status).await
    }

    /// CAS-finalize the row to the given status. A version mismatch means
    /// another writer finalized first - retryable, resolved by re-reading.
    async fn finalize(
        &self,
        record: &TransferRecord,
        status: &TransferStatus,
    ) -> Result<TransferStatus, TransferError> {
        let updated = self
            .store
            .update_status(&record.id, record.version, status)
            .await?;
        if updated {
            return Ok(status.clone());
        }

        warn!(transfer_id = %record.id, "Version conflict finalizing - re-reading stored status");
        match self.store.find_by_id(&record.id).await? {
            Some(row) => Ok(row.status),
            None => Err(TransferError::VersionConflict(record.id.to_string())),
        }
    }

    async fn finalize_best_effort(&self, record: &TransferRecord, status: &TransferStatus) {
        if let Err(e) = self.finalize(record, status).await {
            error!(transfer_id = %record.id, error = %e, "Failed to finalize transfer row");
        }
    }

    /// Get the stored status for a transfer id.
    ///
    /// A pure local read, still breaker-guarded: the lookup path is part of
    /// the dependency surface and falls back to UNKNOWN when degraded.
    /// An unknown id surfaces NotFound - the store answered, so it counts as
    /// a breaker success.
    pub async fn get_status(&self, id: &TransferId) -> Result<TransferStatus, TransferError> {
        if !self.breaker.acquire().await {
            warn!(transfer_id = %id, "Circuit open - status read short-circuited to fallback");
            return Ok(fallback_get_status(id));
        }

        match self.get_status_inner(id).await {
            Ok(status) => {
                self.breaker.record_success().await;
                Ok(status)
            }
            Err(e @ TransferError::NotFound(_)) => {
                self.breaker.record_success().await;
                Err(e)
            }
            Err(e) if e.is_dependency_failure() => {
                self.breaker.record_failure().await;
                error!(transfer_id = %id, error = %e, "Status read degraded to fallback");
                Ok(fallback_get_status(id))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_status_inner(&self, id: &TransferId) -> Result<TransferStatus, TransferError> {
        self.store
            .find_by_id(id)
            .await?
            .map(|row| row.status)
            .ok_or_else(|| {
                TransferError::NotFound(format!(
                    "Failed to find transfer using transfer id: {}",
                    id
                ))
            })
    }
}
