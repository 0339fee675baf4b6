//! Transfer API handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::transfer::{TransferId, TransferRequest};

use super::state::AppState;
use super::types::{ApiError, ApiResult, ok};

/// Request body for single and batch transfer creation
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferDto {
    /// Unique id for the transfer; generated when absent
    #[schema(example = "a1b2c3d4-e5f6-7890-abcd-1234567890ef")]
    pub transfer_id: Option<String>,
    /// Account from which funds will be debited
    #[schema(example = "1")]
    #[validate(length(min = 1, message = "Transfer from account ID cannot be empty"))]
    pub from_account_id: String,
    /// Account to which funds will be credited
    #[schema(example = "2")]
    #[validate(length(min = 1, message = "Transfer to account ID cannot be empty"))]
    pub to_account_id: String,
    /// Amount to transfer, must be greater than zero
    #[schema(value_type = String, example = "150.75")]
    pub amount: Decimal,
}

impl CreateTransferDto {
    fn into_request(self) -> TransferRequest {
        TransferRequest {
            transfer_id: self.transfer_id.map(TransferId::from_string),
            from_account_id: self.from_account_id,
            to_account_id: self.to_account_id,
            amount: self.amount,
        }
    }
}

/// Create a single transfer
///
/// POST /transfers
#[utoipa::path(
    post,
    path = "/transfers",
    request_body = CreateTransferDto,
    responses(
        (status = 200, description = "Transfer created, status string returned"),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<CreateTransferDto>,
) -> ApiResult<String> {
    info!(from = %dto.from_account_id, to = %dto.to_account_id, "Received transfer request");

    dto.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let status = state.orchestrator.create_transfer(dto.into_request()).await?;
    info!(status = %status, "Transfer status");
    ok(status.as_str().to_string())
}

/// Create a batch of transfers
///
/// POST /transfers/batch
#[utoipa::path(
    post,
    path = "/transfers/batch",
    request_body = Vec<CreateTransferDto>,
    responses(
        (status = 200, description = "Batch processed, ordered status list returned"),
        (status = 400, description = "Invalid input or batch size"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Transfer"
)]
pub async fn create_batch(
    State(state): State<Arc<AppState>>,
    Json(dtos): Json<Vec<CreateTransferDto>>,
) -> ApiResult<Vec<String>> {
    info!(size = dtos.len(), "Received batch transfer request");

    for dto in &dtos {
        dto.validate()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
    }

    let requests = dtos.into_iter().map(CreateTransferDto::into_request).collect();
    let statuses = state.batch.create_batch(requests).await?;
    ok(statuses
        .into_iter()
        .map(|s| s.as_str().to_string())
        .collect())
}

/// Get transfer status by id
///
/// GET /transfers/{id}
#[utoipa::path(
    get,
    path = "/transfers/{id}",
    params(
        ("id" = String, Path, description = "Transfer id")
    ),
    responses(
        (status = 200, description = "Status fetched successfully"),
        (status = 404, description = "Transfer not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Transfer"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    info!(transfer_id = %id, "Get transfer status");

    let status = state
        .orchestrator
        .get_status(&TransferId::from_string(id))
        .await?;
    ok(status.as_str().to_string())
}
