//! Transfer Gateway
//!
//! Funds transfer orchestration: idempotent transfer creation delegated to an
//! external ledger authority, with circuit breaking, fallbacks and bounded
//! batch fan-out.
//!
//! # Modules
//!
//! - [`transfer`] - core orchestration (store, orchestrator, batch, retention)
//! - [`ledger`] - outbound ledger client
//! - [`breaker`] - circuit breaker guarding the dependency surface
//! - [`gateway`] - HTTP API (axum + Swagger UI)
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing setup with rolling file output

pub mod breaker;
pub mod config;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod transfer;

// Convenient re-exports at crate root
pub use breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use ledger::{HttpLedgerClient, LedgerClient, LedgerError, LedgerInstruction};
pub use transfer::{
    BatchConfig, BatchCoordinator, PgTransferStore, RetentionConfig, RetentionWorker,
    TransferError, TransferId, TransferOrchestrator, TransferRecord, TransferRequest,
    TransferStatus, TransferStore,
};
