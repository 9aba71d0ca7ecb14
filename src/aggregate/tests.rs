#![allow(clippy::unwrap_used)]

use super::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::models::{IncomeSource, NewTransaction, TransactionDetails};

fn expense(category: ExpenseCategory, amount: Decimal) -> Transaction {
    Transaction::new(
        Uuid::nil(),
        NewTransaction {
            month_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            amount,
            notes: None,
            details: TransactionDetails::Expense {
                item_name: "item".into(),
                category,
            },
        },
    )
}

fn income(amount: Decimal) -> Transaction {
    Transaction::new(
        Uuid::nil(),
        NewTransaction {
            month_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            amount,
            notes: None,
            details: TransactionDetails::Income {
                source: IncomeSource::Salary,
            },
        },
    )
}

fn budget(category: ExpenseCategory, amount: Decimal) -> Budget {
    Budget::new(Uuid::nil(), Uuid::nil(), category, amount)
}

// ── total_of ──────────────────────────────────────────────────

#[test]
fn test_total_of_empty_is_zero() {
    assert_eq!(total_of(&[]), Decimal::ZERO);
}

#[test]
fn test_total_of_is_exact() {
    let txns: Vec<Transaction> = (0..10)
        .map(|_| expense(ExpenseCategory::Extra, dec!(0.10)))
        .collect();
    assert_eq!(total_of(&txns), dec!(1.00));
}

// ── compute_balance ───────────────────────────────────────────

#[test]
fn test_compute_balance() {
    assert_eq!(compute_balance(dec!(1000), dec!(500), dec!(200)), dec!(1300));
    assert_eq!(compute_balance(dec!(0), dec!(0), dec!(0)), dec!(0));
}

#[test]
fn test_compute_balance_negative() {
    assert_eq!(compute_balance(dec!(-100), dec!(50), dec!(0)), dec!(-50));
    assert_eq!(compute_balance(dec!(10), dec!(0), dec!(35.25)), dec!(-25.25));
}

#[test]
fn test_compute_balance_no_drift() {
    let mut balance = Decimal::ZERO;
    for _ in 0..1000 {
        balance = compute_balance(balance, dec!(0.10), dec!(0.20));
    }
    assert_eq!(balance, dec!(-100.00));
}

// ── group_by_category ─────────────────────────────────────────

#[test]
fn test_group_by_category_first_occurrence_order() {
    let expenses = vec![
        expense(ExpenseCategory::Travel, dec!(100)),
        expense(ExpenseCategory::Travel, dec!(50)),
        expense(ExpenseCategory::Sport, dec!(20)),
    ];
    let groups = group_by_category(&expenses);
    assert_eq!(
        groups,
        vec![
            CategoryTotal {
                category: ExpenseCategory::Travel,
                total: dec!(150),
                count: 2,
            },
            CategoryTotal {
                category: ExpenseCategory::Sport,
                total: dec!(20),
                count: 1,
            },
        ]
    );
}

#[test]
fn test_group_by_category_not_sorted() {
    let expenses = vec![
        expense(ExpenseCategory::Sport, dec!(1)),
        expense(ExpenseCategory::Shopping, dec!(2)),
        expense(ExpenseCategory::Sport, dec!(3)),
    ];
    let order: Vec<ExpenseCategory> = group_by_category(&expenses)
        .iter()
        .map(|g| g.category)
        .collect();
    assert_eq!(order, vec![ExpenseCategory::Sport, ExpenseCategory::Shopping]);
}

#[test]
fn test_group_by_category_ignores_income() {
    let txns = vec![income(dec!(900)), expense(ExpenseCategory::Dining, dec!(12))];
    let groups = group_by_category(&txns);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].total, dec!(12));
}

#[test]
fn test_group_by_category_empty() {
    assert!(group_by_category(&[]).is_empty());
}

// ── budget_vs_actual ──────────────────────────────────────────

#[test]
fn test_budget_vs_actual_overspend_not_clamped() {
    let budgets = vec![budget(ExpenseCategory::Sport, dec!(500))];
    let actual = group_by_category(&[expense(ExpenseCategory::Sport, dec!(600))]);
    let rows = budget_vs_actual(&budgets, &actual);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].remaining, dec!(-100));
}

#[test]
fn test_budget_vs_actual_union_of_categories() {
    let budgets = vec![budget(ExpenseCategory::Travel, dec!(300))];
    let actual = group_by_category(&[expense(ExpenseCategory::Dining, dec!(45.50))]);
    let rows = budget_vs_actual(&budgets, &actual);

    assert_eq!(
        rows,
        vec![
            BudgetComparison {
                category: ExpenseCategory::Dining,
                budgeted: Decimal::ZERO,
                actual: dec!(45.50),
                remaining: dec!(-45.50),
            },
            BudgetComparison {
                category: ExpenseCategory::Travel,
                budgeted: dec!(300),
                actual: Decimal::ZERO,
                remaining: dec!(300),
            },
        ]
    );
}

#[test]
fn test_budget_vs_actual_omits_untouched_categories() {
    assert!(budget_vs_actual(&[], &[]).is_empty());
}
