use std::str::FromStr;

use anyhow::{Context, anyhow};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use crate::domain::{Amount, Direction, LedgerEntry, NewEntry, fold_balance};
use crate::error::{AppError, is_foreign_key_violation};

use super::{Database, account_exists, format_timestamp, normalize_limit, parse_timestamp};

/// Persistence for the append-only journal of ledger entries.
#[derive(Clone, Debug)]
pub struct LedgerJournal {
    db: Database,
}

impl LedgerJournal {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append an entry.
    ///
    /// The account check and the insert are one statement: if the account is
    /// missing (or deleted concurrently) nothing is written and the call fails
    /// with `AccountNotFound`.
    #[instrument(skip(self, entry), fields(entry_id = %entry.id, account_id = %entry.account_id), err)]
    pub async fn create(&self, entry: &NewEntry) -> Result<LedgerEntry, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, account_id, direction, amount, category, description, occurred_at)
            SELECT ?, ?, ?, ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM accounts WHERE id = ?)
            RETURNING created_at
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.account_id)
        .bind(entry.direction.as_str())
        .bind(entry.amount.to_string())
        .bind(&entry.category)
        .bind(&entry.description)
        .bind(format_timestamp(&entry.occurred_at))
        .bind(&entry.account_id)
        .fetch_optional(self.db.pool())
        .await;

        let row = match result {
            Ok(Some(row)) => row,
            Ok(None) => return Err(AppError::AccountNotFound(entry.account_id.clone())),
            Err(err) if is_foreign_key_violation(&err) => {
                return Err(AppError::AccountNotFound(entry.account_id.clone()));
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context("Failed to save ledger entry")
                    .into());
            }
        };

        let created_at_str: String = row.get("created_at");
        Ok(LedgerEntry {
            id: entry.id.clone(),
            account_id: entry.account_id.clone(),
            direction: entry.direction,
            amount: entry.amount,
            category: entry.category.clone(),
            description: entry.description.clone(),
            occurred_at: entry.occurred_at,
            created_at: parse_timestamp(&created_at_str, "created_at")?,
        })
    }

    /// List entries for an account, most recent `occurred_at` first.
    #[instrument(skip(self), err)]
    pub async fn list_by_account(
        &self,
        account_id: &str,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, direction, amount, category, description, occurred_at, created_at
            FROM ledger_entries
            WHERE account_id = ?
            ORDER BY occurred_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(account_id)
        .bind(normalize_limit(limit))
        .fetch_all(self.db.pool())
        .await
        .context("Failed to list ledger entries")?;

        Ok(rows
            .iter()
            .map(Self::row_to_entry)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    /// Credits minus debits over every entry of the account.
    ///
    /// Amounts are summed here as `Decimal`; SQLite's SUM would go through
    /// floating point. A total outside the `Decimal` range is a storage error.
    #[instrument(skip(self), err)]
    pub async fn get_balance(&self, account_id: &str) -> Result<Amount, AppError> {
        let rows = sqlx::query("SELECT direction, amount FROM ledger_entries WHERE account_id = ?")
            .bind(account_id)
            .fetch_all(self.db.pool())
            .await
            .context("Failed to load ledger amounts")?;

        let movements = rows
            .iter()
            .map(|row| {
                let direction = Self::direction_from_row(row)?;
                let amount = Self::amount_from_row(row)?;
                Ok::<_, anyhow::Error>((direction.is_credit(), amount))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let balance = fold_balance(movements)
            .ok_or_else(|| anyhow!("Balance overflow for account {account_id}"))?;
        Ok(balance)
    }

    /// Check whether the referenced account exists.
    pub async fn account_exists(&self, account_id: &str) -> Result<bool, AppError> {
        account_exists(&self.db, account_id).await
    }

    fn direction_from_row(row: &SqliteRow) -> anyhow::Result<Direction> {
        let direction_str: String = row.get("direction");
        Direction::from_str(&direction_str)
            .ok_or_else(|| anyhow!("Invalid direction: {}", direction_str))
    }

    fn amount_from_row(row: &SqliteRow) -> anyhow::Result<Amount> {
        let amount_str: String = row.get("amount");
        Decimal::from_str(&amount_str).with_context(|| format!("Invalid amount: {amount_str}"))
    }

    fn row_to_entry(row: &SqliteRow) -> anyhow::Result<LedgerEntry> {
        let occurred_at_str: String = row.get("occurred_at");
        let created_at_str: String = row.get("created_at");

        Ok(LedgerEntry {
            id: row.get("id"),
            account_id: row.get("account_id"),
            direction: Self::direction_from_row(row)?,
            amount: Self::amount_from_row(row)?,
            category: row.get("category"),
            description: row.get("description"),
            occurred_at: parse_timestamp(&occurred_at_str, "occurred_at")?,
            created_at: parse_timestamp(&created_at_str, "created_at")?,
        })
    }
}
