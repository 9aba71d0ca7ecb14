mod budgets;
mod months;
mod transactions;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::{self, BudgetComparison, CategoryTotal};
use crate::error::{Entity, LedgerError, Result, StoreError};
use crate::identity::IdentityProvider;
use crate::models::{Month, TransactionKind};
use crate::repository::LedgerRepository;

/// Everything a month view shows, computed from live rows only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: Month,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub by_category: Vec<CategoryTotal>,
    pub budgets: Vec<BudgetComparison>,
}

/// Owner-scoped operations. Each call resolves the acting user before it
/// validates or touches the store.
pub struct Ledger {
    repo: Arc<dyn LedgerRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl Ledger {
    pub fn new(repo: Arc<dyn LedgerRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { repo, identity }
    }

    fn user(&self) -> Result<Uuid> {
        self.identity
            .current_user_id()
            .ok_or(LedgerError::Unauthorized)
    }

    /// The live month `month_id` when it belongs to `user_id`.
    async fn owned_month(&self, user_id: Uuid, month_id: Uuid) -> Result<Month> {
        self.repo
            .find_month_by_id(user_id, month_id)
            .await
            .map_err(store_failed)?
            .ok_or(LedgerError::NotFound(Entity::Month))
    }

    pub async fn month_summary(&self, month_id: Uuid) -> Result<MonthSummary> {
        let user_id = self.user()?;
        let month = self.owned_month(user_id, month_id).await?;

        let income = self
            .repo
            .list_transactions(user_id, TransactionKind::Income, month_id)
            .await
            .map_err(store_failed)?;
        let expenses = self
            .repo
            .list_transactions(user_id, TransactionKind::Expense, month_id)
            .await
            .map_err(store_failed)?;
        let budgets = self
            .repo
            .list_budgets(user_id, month_id)
            .await
            .map_err(store_failed)?;

        let total_income = aggregate::total_of(&income);
        let total_expenses = aggregate::total_of(&expenses);
        let by_category = aggregate::group_by_category(&expenses);
        let comparison = aggregate::budget_vs_actual(&budgets, &by_category);

        Ok(MonthSummary {
            balance: aggregate::compute_balance(
                month.starting_balance,
                total_income,
                total_expenses,
            ),
            month,
            total_income,
            total_expenses,
            by_category,
            budgets: comparison,
        })
    }
}

fn store_failed(e: StoreError) -> LedgerError {
    tracing::warn!(error = %e, "Store operation failed");
    LedgerError::Store(e)
}
