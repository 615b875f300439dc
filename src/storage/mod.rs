mod accounts;
mod database;
mod journal;

pub use accounts::*;
pub use database::*;
pub use journal::*;

/// SQL migration for the initial schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Page size used when the caller asks for nothing sensible.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Largest page a list query will return.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Normalize a caller-supplied page size: anything outside `1..=200` becomes 50.
pub fn normalize_limit(limit: i64) -> i64 {
    if limit <= 0 || limit > MAX_LIST_LIMIT {
        DEFAULT_LIST_LIMIT
    } else {
        limit
    }
}

/// Timestamps written by the application use the same fixed-width layout as
/// the database defaults, so text ordering matches time ordering.
pub(crate) fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(
    raw: &str,
    column: &str,
) -> anyhow::Result<chrono::DateTime<chrono::Utc>> {
    use anyhow::Context;

    Ok(chrono::DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid {column} timestamp: {raw}"))?
        .with_timezone(&chrono::Utc))
}
