use anyhow::{Context, anyhow};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::instrument;

use crate::domain::{Account, AccountType, Currency, NewAccount};
use crate::error::{AppError, is_foreign_key_violation};

use super::{Database, normalize_limit, parse_timestamp};

const ACCOUNT_COLUMNS: &str = "id, name, type, currency, created_at, updated_at";

/// Persistence for account rows.
#[derive(Clone, Debug)]
pub struct AccountRegistry {
    db: Database,
}

impl AccountRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new account. The database assigns both timestamps.
    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    pub async fn create(&self, account: &NewAccount) -> Result<Account, AppError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (id, name, type, currency)
            VALUES (?, ?, ?, ?)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(&account.id)
        .bind(&account.name)
        .bind(account.account_type.as_str())
        .bind(account.currency.as_str())
        .fetch_one(self.db.pool())
        .await
        .context("Failed to save account")?;

        Ok(Self::row_to_account(&row)?)
    }

    /// Get an account by ID.
    #[instrument(skip(self), err)]
    pub async fn get_by_id(&self, id: &str) -> Result<Account, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await
        .context("Failed to fetch account")?;

        match row {
            Some(row) => Ok(Self::row_to_account(&row)?),
            None => Err(AppError::NotFound(id.to_string())),
        }
    }

    /// List accounts, newest first.
    #[instrument(skip(self), err)]
    pub async fn list(&self, limit: i64) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#
        ))
        .bind(normalize_limit(limit))
        .fetch_all(self.db.pool())
        .await
        .context("Failed to list accounts")?;

        Ok(rows
            .iter()
            .map(Self::row_to_account)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    /// Rename an account and return the refreshed row.
    #[instrument(skip(self), err)]
    pub async fn update_name(&self, id: &str, name: &str) -> Result<Account, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE accounts
            SET name = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await
        .context("Failed to rename account")?;

        match row {
            Some(row) => Ok(Self::row_to_account(&row)?),
            None => Err(AppError::NotFound(id.to_string())),
        }
    }

    /// Delete an account. Refused while ledger entries still reference it.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(AppError::NotFound(id.to_string())),
            Ok(_) => Ok(()),
            Err(err) if is_foreign_key_violation(&err) => Err(AppError::Conflict(id.to_string())),
            Err(err) => Err(anyhow::Error::new(err)
                .context("Failed to delete account")
                .into()),
        }
    }

    /// Check whether an account with this id exists.
    pub async fn exists(&self, id: &str) -> Result<bool, AppError> {
        account_exists(&self.db, id).await
    }

    fn row_to_account(row: &SqliteRow) -> anyhow::Result<Account> {
        let type_str: String = row.get("type");
        let currency_str: String = row.get("currency");
        let created_at_str: String = row.get("created_at");
        let updated_at_str: String = row.get("updated_at");

        Ok(Account {
            id: row.get("id"),
            name: row.get("name"),
            account_type: AccountType::from_str(&type_str)
                .ok_or_else(|| anyhow!("Invalid account type: {}", type_str))?,
            currency: Currency::from_str(&currency_str)
                .ok_or_else(|| anyhow!("Invalid currency: {}", currency_str))?,
            created_at: parse_timestamp(&created_at_str, "created_at")?,
            updated_at: parse_timestamp(&updated_at_str, "updated_at")?,
        })
    }
}

/// Existence probe shared by the registry and the journal.
pub(crate) async fn account_exists(db: &Database, id: &str) -> Result<bool, AppError> {
    let row = sqlx::query("SELECT 1 FROM accounts WHERE id = ?")
        .bind(id)
        .fetch_optional(db.pool())
        .await
        .context("Failed to check account existence")?;
    Ok(row.is_some())
}
