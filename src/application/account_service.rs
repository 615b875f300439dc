use crate::domain::{Account, AccountType, Currency, NewAccount, normalize_account_name};
use crate::storage::AccountRegistry;

use super::AppError;

/// Account lifecycle: create, rename, delete.
#[derive(Clone, Debug)]
pub struct AccountService {
    registry: AccountRegistry,
}

impl AccountService {
    pub fn new(registry: AccountRegistry) -> Self {
        Self { registry }
    }

    /// Create a new account.
    ///
    /// All validation happens before the database is touched.
    pub async fn create(
        &self,
        name: &str,
        account_type: &str,
        currency: &str,
    ) -> Result<Account, AppError> {
        let name = validate_name(name)?;
        let account_type = AccountType::from_str(account_type).ok_or_else(|| {
            rejected(format!("unknown account type '{account_type}'"))
        })?;
        let currency = Currency::from_str(currency)
            .ok_or_else(|| rejected(format!("unsupported currency '{currency}'")))?;

        let account = self
            .registry
            .create(&NewAccount::new(name, account_type, currency))
            .await?;

        tracing::info!(account_id = %account.id, account_type = %account.account_type, "account created");
        Ok(account)
    }

    pub async fn get(&self, id: &str) -> Result<Account, AppError> {
        self.registry.get_by_id(id).await
    }

    /// List accounts, newest first. See [`crate::storage::normalize_limit`].
    pub async fn list(&self, limit: i64) -> Result<Vec<Account>, AppError> {
        self.registry.list(limit).await
    }

    /// Rename an account. The name rules are the same as for creation.
    pub async fn update_name(&self, id: &str, name: &str) -> Result<Account, AppError> {
        let name = validate_name(name)?;
        let account = self.registry.update_name(id, &name).await?;

        tracing::info!(account_id = %account.id, "account renamed");
        Ok(account)
    }

    /// Delete an account that has no ledger entries.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        match self.registry.delete(id).await {
            Ok(()) => {
                tracing::info!(account_id = %id, "account deleted");
                Ok(())
            }
            Err(err @ AppError::Conflict(_)) => {
                tracing::warn!(account_id = %id, "refusing to delete account with ledger entries");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}

fn validate_name(raw: &str) -> Result<String, AppError> {
    normalize_account_name(raw).ok_or_else(|| rejected("name must be 1-80 characters".into()))
}

fn rejected(reason: String) -> AppError {
    tracing::debug!(%reason, "account input rejected");
    AppError::InvalidInput(reason)
}
