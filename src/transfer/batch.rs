//! Batch Coordinator
//!
//! Fans a batch of transfer requests out across a bounded worker pool and
//! collects per-item outcomes in input order. The pool is sized independently
//! of request handling so batch fan-out cannot starve single-transfer traffic
//! or burst the ledger. One item's failure never aborts the rest - every
//! error degrades to a FAILED status for that item only.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use super::error::TransferError;
use super::orchestrator::TransferOrchestrator;
use super::types::{TransferRequest, TransferStatus};

/// Configuration for batch processing
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct BatchConfig {
    /// Maximum accepted batch size; caps worst-case fan-out and remote burst
    pub max_size: usize,
    /// Concurrent worker permits for batch items
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: 20,
            workers: 8,
        }
    }
}

/// Batch Coordinator - bounded fan-out over the orchestrator's create path
pub struct BatchCoordinator {
    orchestrator: Arc<TransferOrchestrator>,
    permits: Arc<Semaphore>,
    config: BatchConfig,
}

impl BatchCoordinator {
    pub fn new(orchestrator: Arc<TransferOrchestrator>, config: BatchConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.workers.max(1)));
        Self {
            orchestrator,
            permits,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(orchestrator: Arc<TransferOrchestrator>) -> Self {
        Self::new(orchestrator, BatchConfig::default())
    }

    /// Process a batch of transfer requests.
    ///
    /// Size bounds are enforced before any store or ledger interaction. The
    /// returned list has the same length and order as the input; execution
    /// order across workers is unspecified.
    pub async fn create_batch(
        &self,
        requests: Vec<TransferRequest>,
    ) -> Result<Vec<TransferStatus>, TransferError> {
        if requests.is_empty() {
            error!("Invalid batch size: nothing to process");
            return Err(TransferError::EmptyBatch);
        }
        if requests.len() > self.config.max_size {
            error!(
                size = requests.len(),
                max = self.config.max_size,
                "Transfer batch size exceeds allowed maximum"
            );
            return Err(TransferError::BatchTooLarge(
                requests.len(),
                self.config.max_size,
            ));
        }

        info!(size = requests.len(), "Processing transfer batch");

        // Each item goes through the breaker-applying wrapper, never the bare
        // orchestration logic, so cross-cutting behavior holds on worker tasks.
        let handles: Vec<_> = requests
            .into_iter()
            .map(|req| {
                let orchestrator = self.orchestrator.clone();
                let permits = self.permits.clone();
                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|_| TransferError::Store("worker pool closed".to_string()))?;
                    orchestrator.create_transfer(req).await
                })
            })
            .collect();

        // Handles are awaited in submission order, preserving input order in
        // the result regardless of completion order.
        let mut results = Vec::with_capacity(handles.len());
        for outcome in futures::future::join_all(handles).await {
            let status = match outcome {
                Ok(Ok(status)) => status,
                Ok(Err(e)) => {
                    error!(error = %e, "Batch item failed - mapped to FAILED");
                    TransferStatus::Failed
                }
                Err(e) => {
                    error!(error = %e, "Batch worker panicked - mapped to FAILED");
                    TransferStatus::Failed
                }
            };
            results.push(status);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::CircuitBreaker;
    use crate::ledger::MockLedgerClient;
    use crate::transfer::store::memory::MemoryTransferStore;
    use crate::transfer::store::TransferStore;
    use crate::transfer::types::{TransferId, TransferRecord};
    use rust_decimal_macros::dec;

    struct TestHarness {
        batch: BatchCoordinator,
        store: Arc<MemoryTransferStore>,
        ledger: Arc<MockLedgerClient>,
    }

    impl TestHarness {
        fn new(config: BatchConfig) -> Self {
            let store = Arc::new(MemoryTransferStore::new());
            let ledger = Arc::new(MockLedgerClient::returning("SUCCESS"));
            let orchestrator = Arc::new(TransferOrchestrator::new(
                store.clone(),
                ledger.clone(),
                Arc::new(CircuitBreaker::with_defaults()),
            ));
            Self {
                batch: BatchCoordinator::new(orchestrator, config),
                store,
                ledger,
            }
        }
    }

    fn request(n: u32) -> TransferRequest {
        TransferRequest::new(&format!("from-{n}"), &format!("to-{n}"), dec!(10))
    }

    #[tokio::test]
    async fn test_batch_all_success_in_order() {
        let harness = TestHarness::new(BatchConfig::default());

        let results = harness
            .batch
            .create_batch(vec![request(1), request(2)])
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![TransferStatus::Success, TransferStatus::Success]
        );
        assert_eq!(harness.ledger.submit_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let harness = TestHarness::new(BatchConfig::default());

        let result = harness.batch.create_batch(vec![]).await;
        assert!(matches!(result, Err(TransferError::EmptyBatch)));
        assert_eq!(harness.ledger.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected_before_any_remote_call() {
        let harness = TestHarness::new(BatchConfig::default());

        let requests: Vec<_> = (0..21).map(request).collect();
        let result = harness.batch.create_batch(requests).await;

        assert!(matches!(result, Err(TransferError::BatchTooLarge(21, 20))));
        assert_eq!(harness.ledger.submit_count(), 0);
        assert_eq!(harness.store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_item_failure_is_isolated() {
        let harness = TestHarness::new(BatchConfig::default());

        // middle item is invalid; its failure must not abort the others
        let requests = vec![
            request(1),
            TransferRequest::new("from-2", "to-2", dec!(0)),
            request(3),
        ];
        let results = harness.batch.create_batch(requests).await.unwrap();

        assert_eq!(
            results,
            vec![
                TransferStatus::Success,
                TransferStatus::Failed,
                TransferStatus::Success,
            ]
        );
        // only the two valid items reached the ledger
        assert_eq!(harness.ledger.submit_count(), 2);
    }

    #[tokio::test]
    async fn test_order_preserved_with_mixed_outcomes() {
        let harness = TestHarness::new(BatchConfig::default());

        // second item already exists with a distinct terminal status
        let existing_id = TransferId::from("existing");
        let seeded = TransferRequest::new("from-2", "to-2", dec!(10));
        let mut row = TransferRecord::new(existing_id.clone(), &seeded);
        row.status = TransferStatus::Other("ON_HOLD".to_string());
        harness.store.insert(&row).await.unwrap();

        let requests = vec![request(1), seeded.with_id(existing_id), request(3)];
        let results = harness.batch.create_batch(requests).await.unwrap();

        assert_eq!(
            results,
            vec![
                TransferStatus::Success,
                TransferStatus::Other("ON_HOLD".to_string()),
                TransferStatus::Success,
            ]
        );
    }

    #[tokio::test]
    async fn test_single_worker_drains_full_batch() {
        let harness = TestHarness::new(BatchConfig {
            max_size: 20,
            workers: 1,
        });

        let requests: Vec<_> = (0..5).map(request).collect();
        let results = harness.batch.create_batch(requests).await.unwrap();

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|s| *s == TransferStatus::Success));
        assert_eq!(harness.store.row_count(), 5);
    }
}
