use chrono::{DateTime, SubsecRound, Utc};

use crate::domain::{Amount, Direction, LedgerEntry, NewEntry, parse_amount};
use crate::storage::LedgerJournal;

use super::AppError;

/// Application service for recording and reading ledger entries.
#[derive(Clone, Debug)]
pub struct LedgerService {
    journal: LedgerJournal,
}

impl LedgerService {
    /// Create a new ledger service on top of the given journal.
    pub fn new(journal: LedgerJournal) -> Self {
        Self { journal }
    }

    /// Record a new entry against an existing account.
    ///
    /// `occurred_at` defaults to now. Fails with `AccountNotFound` without
    /// writing anything when the account does not exist.
    pub async fn create_entry(
        &self,
        account_id: &str,
        direction: &str,
        amount: &str,
        category: Option<String>,
        description: Option<String>,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Result<LedgerEntry, AppError> {
        let account_id = account_id.trim();
        if account_id.is_empty() {
            return Err(rejected("account id is required".into()));
        }

        let direction = Direction::from_str(direction)
            .ok_or_else(|| rejected(format!("unknown direction '{direction}'")))?;

        let amount = parse_amount(amount).map_err(|e| rejected(e.to_string()))?;

        // Stored with microsecond precision; truncate so the returned entry
        // matches what a later read gives back.
        let occurred_at = occurred_at.unwrap_or_else(Utc::now).trunc_subsecs(6);

        // The journal checks the account and inserts in a single statement,
        // so a concurrent delete still ends in AccountNotFound.
        let entry = NewEntry::new(account_id.to_string(), direction, amount, occurred_at)
            .with_category(category)
            .with_description(description);
        let entry = self.journal.create(&entry).await?;

        tracing::info!(
            entry_id = %entry.id,
            account_id = %entry.account_id,
            direction = %entry.direction,
            amount = %entry.amount,
            "ledger entry recorded"
        );
        Ok(entry)
    }

    /// List entries for an account, most recent first.
    pub async fn list_entries(
        &self,
        account_id: &str,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        self.journal.list_by_account(account_id, limit).await
    }

    /// Current balance of an account: credits minus debits.
    pub async fn get_balance(&self, account_id: &str) -> Result<Amount, AppError> {
        if !self.journal.account_exists(account_id).await? {
            return Err(AppError::AccountNotFound(account_id.to_string()));
        }
        self.journal.get_balance(account_id).await
    }
}

fn rejected(reason: String) -> AppError {
    tracing::debug!(%reason, "ledger entry rejected");
    AppError::InvalidEntry(reason)
}
