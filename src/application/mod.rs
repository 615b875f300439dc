// Application layer - validation and orchestration on top of storage.
// Services are the only entry point for clients (HTTP, CLI, tests).

mod account_service;
mod ledger_service;

pub use account_service::*;
pub use ledger_service::*;

pub use crate::error::AppError;
