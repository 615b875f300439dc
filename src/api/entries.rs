use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::accounts::ListParams;
use super::errors::{error_to_response, rejection_to_response};
use super::{AppServices, parse_limit};

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub direction: String,
    pub amount: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/accounts/:id/entries",
            get(list_entries).post(create_entry),
        )
        .route("/accounts/:id/balance", get(get_balance))
}

pub async fn create_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_id): Path<String>,
    body: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_to_response(rejection),
    };

    let result = services
        .ledger
        .create_entry(
            &account_id,
            &body.direction,
            &body.amount,
            body.category,
            body.description,
            body.occurred_at,
        )
        .await;

    match result {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => error_to_response(e),
    }
}

pub async fn list_entries(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    let limit = parse_limit(params.limit.as_deref());
    match services.ledger.list_entries(&account_id, limit).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => error_to_response(e),
    }
}

pub async fn get_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_id): Path<String>,
) -> Response {
    match services.ledger.get_balance(&account_id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "account_id": account_id,
                "balance": balance.to_string(),
            })),
        )
            .into_response(),
        Err(e) => error_to_response(e),
    }
}
