//! HTTP handlers for the transaction ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::{RecordTransactionInput, TransactionRecord};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::TransactionService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub item_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectInput {
    pub reason: Option<String>,
}

fn service(state: AppState) -> TransactionService {
    TransactionService::new(state.store, state.config.approval_policy())
}

/// Record a stock transaction
pub async fn record_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<RecordTransactionInput>,
) -> AppResult<(StatusCode, Json<TransactionRecord>)> {
    let record = service(state).record_transaction(&current_user.0, input)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Approve a pending transaction
pub async fn approve_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<TransactionRecord>> {
    let record = service(state).approve_transaction(&current_user.0, transaction_id)?;
    Ok(Json(record))
}

/// Reject a pending transaction
pub async fn reject_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
    input: Option<AppJson<RejectInput>>,
) -> AppResult<Json<TransactionRecord>> {
    let reason = input.and_then(|AppJson(i)| i.reason);
    let record = service(state).reject_transaction(&current_user.0, transaction_id, reason)?;
    Ok(Json(record))
}

/// Get a single ledger record
pub async fn get_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<TransactionRecord>> {
    let record = service(state).get_transaction(&current_user.0, transaction_id)?;
    Ok(Json(record))
}

/// List ledger records in append order
pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<TransactionFilter>,
) -> AppResult<Json<Vec<TransactionRecord>>> {
    let records = service(state).list_transactions(&current_user.0, filter.item_id)?;
    Ok(Json(records))
}

/// Transactions awaiting approval
pub async fn pending_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<TransactionRecord>>> {
    let records = service(state).pending_transactions(&current_user.0)?;
    Ok(Json(records))
}
