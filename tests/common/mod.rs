// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use mini_ledger::application::{AccountService, LedgerService};
use mini_ledger::config::DatabaseConfig;
use mini_ledger::domain::Account;
use mini_ledger::storage::{AccountRegistry, Database, LedgerJournal};
use tempfile::TempDir;

/// Services wired to a throwaway database.
pub struct TestLedger {
    pub db: Database,
    pub accounts: AccountService,
    pub ledger: LedgerService,
    pub registry: AccountRegistry,
    pub journal: LedgerJournal,
}

impl TestLedger {
    /// Create a checking account named `name`.
    pub async fn checking(&self, name: &str) -> Result<Account> {
        Ok(self.accounts.create(name, "checking", "USD").await?)
    }

    /// Record a credit or debit with no optional fields.
    pub async fn record(&self, account_id: &str, direction: &str, amount: &str) -> Result<()> {
        self.ledger
            .create_entry(account_id, direction, amount, None, None, None)
            .await?;
        Ok(())
    }

    /// Number of rows in the journal, bypassing the services.
    pub async fn journal_rows(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}

/// Helper to create test services with a temporary database
pub async fn test_ledger() -> Result<(TestLedger, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db = Database::init(&DatabaseConfig::sqlite_file(db_path.to_str().unwrap())).await?;

    let registry = AccountRegistry::new(db.clone());
    let journal = LedgerJournal::new(db.clone());
    let ledger = TestLedger {
        accounts: AccountService::new(registry.clone()),
        ledger: LedgerService::new(journal.clone()),
        registry,
        journal,
        db,
    };
    Ok((ledger, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}
