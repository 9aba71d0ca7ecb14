use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{store_failed, Ledger};
use crate::aggregate::{self, CategoryTotal};
use crate::error::{Entity, LedgerError, Result};
use crate::models::{NewTransaction, Transaction, TransactionKind};
use crate::repository::DeleteOutcome;
use crate::validation::{
    self, RawExpense, RawExpenseUpdate, RawIncome, RawIncomeUpdate, TransactionPatch,
};

impl Ledger {
    // ── Writes ────────────────────────────────────────────────

    pub async fn create_expense(&self, raw: &RawExpense) -> Result<Transaction> {
        let user_id = self.user()?;
        let input = validation::validate_expense(raw)?;
        self.create(user_id, input).await
    }

    pub async fn create_income(&self, raw: &RawIncome) -> Result<Transaction> {
        let user_id = self.user()?;
        let input = validation::validate_income(raw)?;
        self.create(user_id, input).await
    }

    async fn create(&self, user_id: Uuid, input: NewTransaction) -> Result<Transaction> {
        self.owned_month(user_id, input.month_id).await?;
        let txn = Transaction::new(user_id, input);
        self.repo
            .insert_transaction(&txn)
            .await
            .map_err(store_failed)?;
        tracing::debug!(
            kind = %txn.kind(),
            id = %txn.id,
            month_id = %txn.month_id,
            "Created transaction"
        );
        Ok(txn)
    }

    pub async fn update_expense(&self, raw: &RawExpenseUpdate) -> Result<Transaction> {
        let user_id = self.user()?;
        let patch = validation::validate_expense_update(raw)?;
        self.update(user_id, TransactionKind::Expense, patch).await
    }

    pub async fn update_income(&self, raw: &RawIncomeUpdate) -> Result<Transaction> {
        let user_id = self.user()?;
        let patch = validation::validate_income_update(raw)?;
        self.update(user_id, TransactionKind::Income, patch).await
    }

    async fn update(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        patch: TransactionPatch,
    ) -> Result<Transaction> {
        let mut txn = self
            .repo
            .find_transaction(user_id, kind, patch.id)
            .await
            .map_err(store_failed)?
            .ok_or(LedgerError::NotFound(Entity::Transaction))?;
        self.owned_month(user_id, txn.month_id).await?;

        patch.apply_to(&mut txn)?;

        let updated = self
            .repo
            .update_transaction(&txn)
            .await
            .map_err(store_failed)?;
        if !updated {
            return Err(LedgerError::NotFound(Entity::Transaction));
        }
        tracing::debug!(kind = %kind, id = %txn.id, "Updated transaction");
        Ok(txn)
    }

    /// Idempotent: deleting an already-deleted row succeeds without touching
    /// its original timestamp.
    pub async fn soft_delete_transaction(&self, kind: TransactionKind, id: Uuid) -> Result<()> {
        let user_id = self.user()?;
        let outcome = self
            .repo
            .mark_transaction_deleted(user_id, kind, id, Utc::now())
            .await
            .map_err(store_failed)?;
        match outcome {
            DeleteOutcome::Deleted => {
                tracing::debug!(kind = %kind, id = %id, "Deleted transaction");
                Ok(())
            }
            DeleteOutcome::AlreadyDeleted => Ok(()),
            DeleteOutcome::Missing => Err(LedgerError::NotFound(Entity::Transaction)),
        }
    }

    // ── Reads ─────────────────────────────────────────────────

    /// Live transactions of `kind` in a live month, newest date first and
    /// most recently entered first within a day.
    pub async fn list_by_month(
        &self,
        kind: TransactionKind,
        month_id: Uuid,
    ) -> Result<Vec<Transaction>> {
        let user_id = self.user()?;
        self.owned_month(user_id, month_id).await?;
        self.repo
            .list_transactions(user_id, kind, month_id)
            .await
            .map_err(store_failed)
    }

    pub async fn total_for_month(&self, kind: TransactionKind, month_id: Uuid) -> Result<Decimal> {
        let txns = self.list_by_month(kind, month_id).await?;
        Ok(aggregate::total_of(&txns))
    }

    pub async fn expenses_by_category(&self, month_id: Uuid) -> Result<Vec<CategoryTotal>> {
        let expenses = self.list_by_month(TransactionKind::Expense, month_id).await?;
        Ok(aggregate::group_by_category(&expenses))
    }
}
