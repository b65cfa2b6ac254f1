//! HTTP handlers for adjustment requests

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::{AdjustmentRequest, CreateAdjustmentInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::AdjustmentService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DecisionInput {
    pub note: Option<String>,
}

fn service(state: AppState) -> AdjustmentService {
    AdjustmentService::new(state.store, state.config.approval_policy())
}

/// File an adjustment request
pub async fn create_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<CreateAdjustmentInput>,
) -> AppResult<(StatusCode, Json<AdjustmentRequest>)> {
    let request = service(state).create_request(&current_user.0, input)?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Raise a request from an audit discrepancy
pub async fn raise_from_discrepancy(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(discrepancy_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<AdjustmentRequest>)> {
    let request = service(state).raise_from_discrepancy(&current_user.0, discrepancy_id)?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn get_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<AdjustmentRequest>> {
    let request = service(state).get_request(&current_user.0, request_id)?;
    Ok(Json(request))
}

pub async fn list_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<AdjustmentRequest>>> {
    let requests = service(state).list_requests(&current_user.0)?;
    Ok(Json(requests))
}

pub async fn approve_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    input: Option<AppJson<DecisionInput>>,
) -> AppResult<Json<AdjustmentRequest>> {
    let note = input.and_then(|AppJson(i)| i.note);
    let request = service(state).approve_request(&current_user.0, request_id, note)?;
    Ok(Json(request))
}

pub async fn reject_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    input: Option<AppJson<DecisionInput>>,
) -> AppResult<Json<AdjustmentRequest>> {
    let note = input.and_then(|AppJson(i)| i.note);
    let request = service(state).reject_request(&current_user.0, request_id, note)?;
    Ok(Json(request))
}
