//! HTTP adapter: maps JSON requests onto the services and their outcomes
//! onto status codes.

mod accounts;
mod entries;
mod errors;
mod system;

use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router, routing::get};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::{AccountService, LedgerService};
use crate::storage::{AccountRegistry, Database, LedgerJournal};

pub use errors::{error_to_response, json_error};

/// Everything a handler may call into.
pub struct AppServices {
    pub accounts: AccountService,
    pub ledger: LedgerService,
    pub db: Database,
}

impl AppServices {
    /// Wire services to their persistence components, each with its own
    /// handle on the shared pool.
    pub fn new(db: Database) -> Self {
        Self {
            accounts: AccountService::new(AccountRegistry::new(db.clone())),
            ledger: LedgerService::new(LedgerJournal::new(db.clone())),
            db,
        }
    }
}

/// Build the full application router.
///
/// Requests that exceed `request_timeout` are answered with 408 and their
/// in-flight database work is dropped.
pub fn build_app(services: Arc<AppServices>, request_timeout: Duration) -> Router {
    let v1 = Router::new()
        .merge(accounts::router())
        .merge(entries::router());

    Router::new()
        .route("/healthz", get(system::health))
        .route("/readyz", get(system::ready))
        .nest("/v1", v1)
        .layer(Extension(services))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Parse an optional `limit` query value; anything unparseable means "default".
fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(0)
}
