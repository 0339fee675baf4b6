//! Retention Worker
//!
//! Background worker that deletes transfers older than the retention window.
//! Best-effort: a failed sweep is logged and retried on the next cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use super::error::TransferError;
use super::store::TransferStore;

/// Configuration for the retention worker
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct RetentionConfig {
    /// How often to run the sweep
    pub sweep_interval_secs: u64,
    /// Transfers older than this are deleted, regardless of status
    pub max_age_hours: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 3600,
            max_age_hours: 24,
        }
    }
}

/// Retention Worker
///
/// Periodically deletes all transfers whose creation timestamp is older than
/// the retention window. Deletion is unconditional - status does not matter;
/// this sweep is the only thing that ever removes a transfer row.
pub struct RetentionWorker {
    store: Arc<dyn TransferStore>,
    config: RetentionConfig,
}

impl RetentionWorker {
    pub fn new(store: Arc<dyn TransferStore>, config: RetentionConfig) -> Self {
        Self { store, config }
    }

    /// Create with default configuration (hourly sweep, 24 h window)
    pub fn with_defaults(store: Arc<dyn TransferStore>) -> Self {
        Self::new(store, RetentionConfig::default())
    }

    /// Run the retention loop forever
    pub async fn run(&self) -> ! {
        info!(
            sweep_interval_secs = self.config.sweep_interval_secs,
            max_age_hours = self.config.max_age_hours,
            "Starting retention worker"
        );

        loop {
            tokio::time::sleep(Duration::from_secs(self.config.sweep_interval_secs)).await;

            if let Err(e) = self.sweep_once().await {
                error!(error = %e, "Retention sweep failed");
            }
        }
    }

    /// Run a single sweep cycle
    pub async fn sweep_once(&self) -> Result<u64, TransferError> {
        let cutoff = Utc::now() - chrono::Duration::hours(self.config.max_age_hours);
        info!(cutoff = %cutoff, "Cleaning up transfers older than cutoff");

        let removed = self.store.delete_older_than(cutoff).await?;

        if removed > 0 {
            info!(count = removed, "Removed expired transfers");
        } else {
            debug!("No expired transfers found");
        }

        Ok(removed)
    }
}
