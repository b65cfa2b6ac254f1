//! Request body extraction

use axum::{
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// `Json` whose rejections come back as `VALIDATION_ERROR` bodies.
///
/// Unknown enum values (a transaction `type` of `"transfer"`, say) fail
/// here, before any handler runs.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
