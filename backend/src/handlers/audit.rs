//! HTTP handlers for audits and discrepancies

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::{AuditRecord, CreateAuditInput, Discrepancy, RecordCountInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::AuditService;
use crate::AppState;

/// Body of a resolve request. The resolver is always the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveInput {
    pub resolution: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewInput {
    pub reason: Option<String>,
}

fn service(state: AppState) -> AuditService {
    AuditService::new(state.store, state.config.audit.review_score_floor)
}

/// Open an audit
pub async fn create_audit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<CreateAuditInput>,
) -> AppResult<(StatusCode, Json<AuditRecord>)> {
    let audit = service(state).create_audit(&current_user.0, input)?;
    Ok((StatusCode::CREATED, Json(audit)))
}

pub async fn get_audit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(audit_id): Path<Uuid>,
) -> AppResult<Json<AuditRecord>> {
    let audit = service(state).get_audit(&current_user.0, audit_id)?;
    Ok(Json(audit))
}

pub async fn list_audits(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<AuditRecord>>> {
    let audits = service(state).list_audits(&current_user.0)?;
    Ok(Json(audits))
}

/// Record a count; responds with the discrepancy or `null`
pub async fn record_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(audit_id): Path<Uuid>,
    AppJson(input): AppJson<RecordCountInput>,
) -> AppResult<Json<Option<Discrepancy>>> {
    let discrepancy = service(state).record_count(&current_user.0, audit_id, input)?;
    Ok(Json(discrepancy))
}

pub async fn complete_audit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(audit_id): Path<Uuid>,
) -> AppResult<Json<AuditRecord>> {
    let audit = service(state).complete_audit(&current_user.0, audit_id)?;
    Ok(Json(audit))
}

pub async fn approve_audit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(audit_id): Path<Uuid>,
) -> AppResult<Json<AuditRecord>> {
    let audit = service(state).approve_audit(&current_user.0, audit_id)?;
    Ok(Json(audit))
}

pub async fn flag_for_review(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(audit_id): Path<Uuid>,
    input: Option<AppJson<ReviewInput>>,
) -> AppResult<Json<AuditRecord>> {
    let reason = input.and_then(|AppJson(i)| i.reason);
    let audit = service(state).flag_for_review(&current_user.0, audit_id, reason)?;
    Ok(Json(audit))
}

/// Resolve a discrepancy
pub async fn resolve_discrepancy(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(discrepancy_id): Path<Uuid>,
    AppJson(input): AppJson<ResolveInput>,
) -> AppResult<Json<Discrepancy>> {
    let discrepancy =
        service(state).resolve_discrepancy(&current_user.0, discrepancy_id, input.resolution)?;
    Ok(Json(discrepancy))
}
