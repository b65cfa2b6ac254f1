//! HTTP handlers for reports and exports

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;

/// Download the transaction ledger as CSV
pub async fn export_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.store);
    let csv = service.export_ledger_csv(&current_user.0)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    ))
}
