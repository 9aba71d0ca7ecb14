use rust_decimal::Decimal;
use uuid::Uuid;

use super::{store_failed, Ledger};
use crate::error::{LedgerError, Result};
use crate::models::Budget;
use crate::validation::{self, BudgetEntry, RawBudgetEntry};

impl Ledger {
    /// Upserts every positive entry keyed by (month, category). Zero or blank
    /// amounts are dropped and categories left out of `entries` are untouched.
    /// A category listed twice keeps its last amount.
    pub async fn set_budgets_for_month(
        &self,
        month_id: Uuid,
        entries: &[RawBudgetEntry],
    ) -> Result<Vec<Budget>> {
        let user_id = self.user()?;
        let validated = validation::validate_budget_entries(entries)?;

        let mut wanted: Vec<BudgetEntry> = Vec::new();
        for entry in validated {
            wanted.retain(|w| w.category != entry.category);
            if entry.budget_amount > Decimal::ZERO {
                wanted.push(entry);
            }
        }
        if wanted.is_empty() {
            return Err(LedgerError::EmptyBudgetSet);
        }

        self.owned_month(user_id, month_id).await?;

        let mut stored = Vec::with_capacity(wanted.len());
        for entry in wanted {
            let budget = Budget::new(user_id, month_id, entry.category, entry.budget_amount);
            let saved = self
                .repo
                .upsert_budget(&budget)
                .await
                .map_err(store_failed)?;
            tracing::debug!(
                month_id = %month_id,
                category = %saved.category,
                amount = %saved.budget_amount,
                "Saved budget"
            );
            stored.push(saved);
        }
        Ok(stored)
    }

    /// Budget rows of a live month in canonical category order.
    pub async fn budgets_for_month(&self, month_id: Uuid) -> Result<Vec<Budget>> {
        let user_id = self.user()?;
        self.owned_month(user_id, month_id).await?;
        let mut budgets = self
            .repo
            .list_budgets(user_id, month_id)
            .await
            .map_err(store_failed)?;
        budgets.sort_by_key(|b| b.category.ordinal());
        Ok(budgets)
    }
}
