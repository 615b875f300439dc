pub mod api;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod telemetry;

pub use domain::*;
pub use error::AppError;
pub use storage::Database;
