//! HTTP Gateway
//!
//! axum router exposing the transfer API plus Swagger UI. The transport layer
//! stays thin: validation, envelope mapping and delegation to the
//! orchestrator / batch coordinator.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

/// Build the transfer API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/transfers", post(handlers::create_transfer))
        .route("/transfers/batch", post(handlers::create_batch))
        .route("/transfers/{id}", get(handlers::get_transfer))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) {
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("FATAL: Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("🚀 Gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::breaker::CircuitBreaker;
    use crate::ledger::MockLedgerClient;
    use crate::transfer::store::memory::MemoryTransferStore;
    use crate::transfer::{BatchConfig, BatchCoordinator, TransferOrchestrator};

    fn test_router() -> Router {
        let store = Arc::new(MemoryTransferStore::new());
        let ledger = Arc::new(MockLedgerClient::returning("SUCCESS"));
        let orchestrator = Arc::new(TransferOrchestrator::new(
            store,
            ledger,
            Arc::new(CircuitBreaker::with_defaults()),
        ));
        let batch = Arc::new(BatchCoordinator::new(
            orchestrator.clone(),
            BatchConfig::default(),
        ));
        router(Arc::new(AppState::new(orchestrator, batch)))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrip() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(post_json(
                "/transfers",
                r#"{"transferId":"t-1","fromAccountId":"1","toAccountId":"2","amount":"100.00"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"], "SUCCESS");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/transfers/t-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"], "SUCCESS");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_404() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/transfers/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], types::error_codes::TRANSFER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_batch_returns_ordered_statuses() {
        let app = test_router();

        let response = app
            .oneshot(post_json(
                "/transfers/batch",
                r#"[
                    {"fromAccountId":"A1","toAccountId":"B1","amount":"100.0"},
                    {"fromAccountId":"A2","toAccountId":"B2","amount":"200.0"}
                ]"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"], serde_json::json!(["SUCCESS", "SUCCESS"]));
    }

    #[tokio::test]
    async fn test_invalid_amount_rejected_with_400() {
        let app = test_router();

        let response = app
            .oneshot(post_json(
                "/transfers",
                r#"{"fromAccountId":"1","toAccountId":"2","amount":"0"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], types::error_codes::INVALID_PARAMETER);
    }

    #[tokio::test]
    async fn test_empty_account_rejected_by_dto_validation() {
        let app = test_router();

        let response = app
            .oneshot(post_json(
                "/transfers",
                r#"{"fromAccountId":"","toAccountId":"2","amount":"10"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
