//! Transfer Orchestration
//!
//! Moves funds between two accounts by delegating the actual debit/credit to
//! an external ledger authority and durably recording the outcome.
//!
//! # Lifecycle
//!
//! ```text
//! PENDING ──ledger──▶ SUCCESS | FAILED | <ledger-defined token>
//!    │
//!    └──fallback────▶ FAILED
//! ```
//!
//! # Invariants
//!
//! 1. **Insert-Before-Call**: the pending row commits before the ledger call,
//!    so an id's row exists iff creation was attempted at least once
//! 2. **At-Most-One-Submission**: a found row short-circuits duplicate
//!    creates; the primary-key constraint closes the remaining race
//! 3. **Single-Mutation**: status moves exactly once, from PENDING to the
//!    terminal value; the version CAS rejects lost updates
//! 4. **Bounded Fan-Out**: batch items run on a dedicated bounded pool and a
//!    single item's failure never aborts the batch

pub mod batch;
pub mod db;
pub mod error;
pub mod orchestrator;
pub mod retention;
pub mod store;
pub mod types;


// Re-exports for convenience
pub use batch::{BatchConfig, BatchCoordinator};
pub use db::PgTransferStore;
pub use error::TransferError;
pub use orchestrator::{TransferOrchestrator, fallback_create_transfer, fallback_get_status};
pub use retention::{RetentionConfig, RetentionWorker};
pub use store::{InsertOutcome, TransferStore};
pub use types::{TransferId, TransferRecord, TransferRequest, TransferStatus};
