use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Budget, ExpenseCategory, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetComparison {
    pub category: ExpenseCategory,
    pub budgeted: Decimal,
    pub actual: Decimal,
    /// Negative when spending exceeds the budget.
    pub remaining: Decimal,
}

/// Sum of `amount` across the collection, zero when empty.
pub fn total_of(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(|t| t.amount).sum()
}

/// Expense totals per category in order of first appearance. Income rows are
/// skipped.
pub fn group_by_category(expenses: &[Transaction]) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();
    for (category, amount) in expenses
        .iter()
        .filter_map(|t| t.category().map(|c| (c, t.amount)))
    {
        match groups.iter_mut().find(|g| g.category == category) {
            Some(group) => {
                group.total += amount;
                group.count += 1;
            }
            None => groups.push(CategoryTotal {
                category,
                total: amount,
                count: 1,
            }),
        }
    }
    groups
}

pub fn compute_balance(
    starting_balance: Decimal,
    total_income: Decimal,
    total_expenses: Decimal,
) -> Decimal {
    starting_balance + total_income - total_expenses
}

/// One row per category that has a budget or any spending, in the canonical
/// category order.
pub fn budget_vs_actual(budgets: &[Budget], actual: &[CategoryTotal]) -> Vec<BudgetComparison> {
    ExpenseCategory::ALL
        .iter()
        .filter_map(|&category| {
            let budgeted = budgets
                .iter()
                .rev()
                .find(|b| b.category == category)
                .map(|b| b.budget_amount);
            let spent = actual
                .iter()
                .filter(|t| t.category == category)
                .map(|t| t.total)
                .reduce(|a, b| a + b);
            if budgeted.is_none() && spent.is_none() {
                return None;
            }
            let budgeted = budgeted.unwrap_or(Decimal::ZERO);
            let actual = spent.unwrap_or(Decimal::ZERO);
            Some(BudgetComparison {
                category,
                budgeted,
                actual,
                remaining: budgeted - actual,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
