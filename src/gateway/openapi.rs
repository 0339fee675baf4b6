//! OpenAPI document assembly

use utoipa::OpenApi;

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_transfer,
        handlers::create_batch,
        handlers::get_transfer,
    ),
    components(schemas(handlers::CreateTransferDto)),
    tags(
        (name = "Transfer", description = "Handles single and batch transfers")
    ),
    info(
        title = "Transfer Gateway API",
        description = "Funds transfer orchestration against an external ledger"
    )
)]
pub struct ApiDoc;
