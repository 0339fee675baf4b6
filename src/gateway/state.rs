//! Shared gateway state

use std::sync::Arc;

use crate::transfer::{BatchCoordinator, TransferOrchestrator};

/// Shared application state handed to every handler
pub struct AppState {
    pub orchestrator: Arc<TransferOrchestrator>,
    pub batch: Arc<BatchCoordinator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<TransferOrchestrator>, batch: Arc<BatchCoordinator>) -> Self {
        Self {
            orchestrator,
            batch,
        }
    }
}
