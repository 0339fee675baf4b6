//! Transfer Gateway entry point
//!
//! Wires the transfer store, ledger client, circuit breaker, orchestrator and
//! batch coordinator together, spawns the retention worker and serves the
//! HTTP API.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use transfer_gateway::breaker::CircuitBreaker;
use transfer_gateway::config::AppConfig;
use transfer_gateway::gateway::state::AppState;
use transfer_gateway::ledger::HttpLedgerClient;
use transfer_gateway::transfer::{
    BatchCoordinator, PgTransferStore, RetentionWorker, TransferOrchestrator,
};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _log_guard = transfer_gateway::logging::init_logging(&config);

    tracing::info!("Starting transfer gateway in {} mode", env);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.postgres_url)
        .await?;
    let store = Arc::new(PgTransferStore::new(pool));

    let ledger = Arc::new(HttpLedgerClient::new(&config.ledger)?);
    tracing::info!(url = %config.ledger.url(), "Ledger endpoint configured");

    let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));

    let orchestrator = Arc::new(TransferOrchestrator::new(
        store.clone(),
        ledger,
        breaker,
    ));
    let batch = Arc::new(BatchCoordinator::new(
        orchestrator.clone(),
        config.batch.clone(),
    ));

    // Retention sweep runs for the life of the process
    let retention = RetentionWorker::new(store, config.retention.clone());
    tokio::spawn(async move {
        retention.run().await;
    });

    let state = Arc::new(AppState::new(orchestrator, batch));
    let port = get_port_override().unwrap_or(config.gateway.port);
    transfer_gateway::gateway::run_server(&config.gateway.host, port, state).await;

    Ok(())
}
