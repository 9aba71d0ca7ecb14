use chrono::Utc;
use uuid::Uuid;

use super::{store_failed, Ledger};
use crate::error::{Entity, LedgerError, Result, StoreError};
use crate::models::Month;
use crate::repository::DeleteOutcome;
use crate::validation::{self, RawNumber};

impl Ledger {
    /// Returns the live month for (year, month), creating it with a zero
    /// starting balance on first access. Concurrent callers converge on one row.
    pub async fn get_or_create_month(&self, year: i64, month: i64) -> Result<Month> {
        let user_id = self.user()?;
        let key = validation::validate_month_key(year, month)?;

        if let Some(existing) = self
            .repo
            .find_month(user_id, key.year, key.month)
            .await
            .map_err(store_failed)?
        {
            return Ok(existing);
        }

        let created = Month::new(user_id, key.year, key.month);
        match self.repo.insert_month(&created).await {
            Ok(()) => {
                tracing::info!(month = %key, month_id = %created.id, "Created month");
                Ok(created)
            }
            Err(StoreError::UniqueViolation(detail)) => {
                tracing::warn!(month = %key, "Month created concurrently, re-reading");
                self.repo
                    .find_month(user_id, key.year, key.month)
                    .await
                    .map_err(store_failed)?
                    .ok_or_else(|| store_failed(StoreError::UniqueViolation(detail)))
            }
            Err(e) => Err(store_failed(e)),
        }
    }

    pub async fn update_starting_balance(
        &self,
        month_id: Uuid,
        starting_balance: &RawNumber,
    ) -> Result<Month> {
        let user_id = self.user()?;
        let balance = validation::validate_starting_balance(starting_balance)?;
        let month = self
            .repo
            .update_starting_balance(user_id, month_id, balance)
            .await
            .map_err(store_failed)?
            .ok_or(LedgerError::NotFound(Entity::Month))?;
        tracing::debug!(month_id = %month_id, balance = %balance, "Updated starting balance");
        Ok(month)
    }

    /// Marks the month deleted. Its transactions and budgets stay in storage
    /// but are unreachable through the ledger afterwards.
    pub async fn soft_delete_month(&self, month_id: Uuid) -> Result<()> {
        let user_id = self.user()?;
        let outcome = self
            .repo
            .mark_month_deleted(user_id, month_id, Utc::now())
            .await
            .map_err(store_failed)?;
        match outcome {
            DeleteOutcome::Deleted => {
                tracing::info!(month_id = %month_id, "Deleted month");
                Ok(())
            }
            DeleteOutcome::AlreadyDeleted => Ok(()),
            DeleteOutcome::Missing => Err(LedgerError::NotFound(Entity::Month)),
        }
    }

    /// Live months, newest period first.
    pub async fn list_months(&self) -> Result<Vec<Month>> {
        let user_id = self.user()?;
        self.repo.list_months(user_id).await.map_err(store_failed)
    }
}
