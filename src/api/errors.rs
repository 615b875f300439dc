use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::application::AppError;

pub fn error_to_response(err: AppError) -> Response {
    match err {
        AppError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        AppError::InvalidEntry(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_entry", msg),
        AppError::NotFound(_) | AppError::AccountNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "account not found")
        }
        AppError::Conflict(_) => json_error(
            StatusCode::CONFLICT,
            "conflict",
            "account has ledger entries; cannot delete",
        ),
        AppError::Storage(e) => {
            tracing::error!("storage failure: {e:#}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal error")
        }
    }
}

pub fn rejection_to_response(rejection: JsonRejection) -> Response {
    tracing::debug!(%rejection, "invalid request body");
    json_error(StatusCode::BAD_REQUEST, "invalid_body", "invalid request body")
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
