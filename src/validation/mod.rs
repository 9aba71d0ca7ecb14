mod raw;

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{FieldErrorKind, FieldErrors};
use crate::models::{
    ExpenseCategory, IncomeSource, IncomeSourceType, NewTransaction, Transaction,
    TransactionDetails,
};

pub use raw::{
    RawBudgetEntry, RawExpense, RawExpenseUpdate, RawIncome, RawIncomeUpdate, RawNumber,
};

pub const ITEM_NAME_MAX: usize = 200;
pub const NOTES_MAX: usize = 500;
pub const CUSTOM_SOURCE_MAX: usize = 200;
pub const YEAR_MIN: i64 = 2000;
pub const YEAR_MAX: i64 = 2100;
/// Amounts are whole cents.
pub const AMOUNT_SCALE: u32 = 2;

#[allow(clippy::expect_used)]
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date pattern"));
#[allow(clippy::expect_used)]
static MONTH_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("valid month pattern"));

/// Largest amount any field accepts: 99,999,999.99
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

// ── Typed outputs ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetEntry {
    pub category: ExpenseCategory,
    pub budget_amount: Decimal,
}

/// Change to an income's source carried by an update.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePatch {
    Keep,
    Replace(IncomeSource),
    /// Only `custom_source` was sent, unchecked. It only matters, and is only
    /// validated, when the stored type is Other.
    CustomName(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsPatch {
    Expense {
        item_name: Option<String>,
        category: Option<ExpenseCategory>,
    },
    Income {
        source: SourcePatch,
    },
}

/// Validated partial update. `None` leaves a field untouched; `notes` of
/// `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPatch {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub notes: Option<Option<String>>,
    pub details: DetailsPatch,
}

impl TransactionPatch {
    /// Applies the patch to a stored row, re-checking the income source rule
    /// against the merged result.
    pub fn apply_to(&self, txn: &mut Transaction) -> Result<(), FieldErrors> {
        match (&self.details, &mut txn.details) {
            (
                DetailsPatch::Expense {
                    item_name,
                    category,
                },
                TransactionDetails::Expense {
                    item_name: stored_name,
                    category: stored_category,
                },
            ) => {
                if let Some(name) = item_name {
                    *stored_name = name.clone();
                }
                if let Some(c) = category {
                    *stored_category = *c;
                }
            }
            (DetailsPatch::Income { source }, TransactionDetails::Income { source: stored }) => {
                match source {
                    SourcePatch::Keep => {}
                    SourcePatch::Replace(new_source) => *stored = new_source.clone(),
                    SourcePatch::CustomName(name) => {
                        if stored.source_type() == IncomeSourceType::Other {
                            let mut errors = FieldErrors::new();
                            let other = IncomeSourceType::Other;
                            match resolve_source(&mut errors, other, name.as_deref()) {
                                Some(source) if errors.is_empty() => *stored = source,
                                _ => return Err(errors),
                            }
                        }
                    }
                }
            }
            _ => {
                return Err(FieldErrors::single(
                    "id",
                    FieldErrorKind::InvalidId,
                    "Entry is of a different kind",
                ))
            }
        }

        if let Some(date) = self.date {
            txn.date = date;
        }
        if let Some(amount) = self.amount {
            txn.amount = amount;
        }
        if let Some(notes) = &self.notes {
            txn.notes = notes.clone();
        }
        Ok(())
    }
}

// ── Field rules ───────────────────────────────────────────────

fn parse_decimal(raw: &RawNumber) -> Option<Decimal> {
    let text = match raw {
        RawNumber::Number(n) => n.to_string(),
        RawNumber::Text(s) => s.trim().to_string(),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn is_cents(value: Decimal) -> bool {
    value.normalize().scale() <= AMOUNT_SCALE
}

fn is_blank(raw: &RawNumber) -> bool {
    matches!(raw, RawNumber::Text(s) if s.trim().is_empty())
}

fn check_date(errors: &mut FieldErrors, value: Option<&str>) -> Option<NaiveDate> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        errors.push("date", FieldErrorKind::Required, "Date is required");
        return None;
    };
    if !DATE_RE.is_match(value) {
        errors.push(
            "date",
            FieldErrorKind::InvalidDate,
            "Invalid date format (use YYYY-MM-DD)",
        );
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("date", FieldErrorKind::InvalidDate, "Invalid date");
            None
        }
    }
}

/// Positive amounts up to `max_amount()`.
fn check_amount(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<&RawNumber>,
) -> Option<Decimal> {
    let Some(raw) = raw.filter(|r| !is_blank(r)) else {
        errors.push(field, FieldErrorKind::Required, "Amount is required");
        return None;
    };
    match parse_decimal(raw) {
        None => {
            errors.push(field, FieldErrorKind::InvalidAmount, "Amount must be a number");
            None
        }
        Some(a) if a <= Decimal::ZERO => {
            errors.push(field, FieldErrorKind::InvalidAmount, "Amount must be positive");
            None
        }
        Some(a) if a > max_amount() => {
            errors.push(field, FieldErrorKind::InvalidAmount, "Amount is too large");
            None
        }
        Some(a) if !is_cents(a) => {
            errors.push(field, FieldErrorKind::InvalidAmount, "Amount has too many decimals");
            None
        }
        Some(a) => Some(a.normalize()),
    }
}

fn check_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: usize,
    required: bool,
) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|v| !v.is_empty());
    match trimmed {
        None => {
            if required {
                errors.push(field, FieldErrorKind::Required, format!("{field} is required"));
            }
            None
        }
        Some(v) if v.chars().count() > max => {
            errors.push(
                field,
                FieldErrorKind::TooLong,
                format!("{field} must be at most {max} characters"),
            );
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

fn check_id(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<Uuid> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        errors.push(field, FieldErrorKind::Required, format!("{field} is required"));
        return None;
    };
    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(field, FieldErrorKind::InvalidId, format!("Invalid {field}"));
            None
        }
    }
}

fn check_category(errors: &mut FieldErrors, value: Option<&str>) -> Option<ExpenseCategory> {
    let Some(value) = value else {
        errors.push("category", FieldErrorKind::Required, "Category is required");
        return None;
    };
    let category = ExpenseCategory::parse(value);
    if category.is_none() {
        errors.push("category", FieldErrorKind::InvalidEnum, "Invalid category");
    }
    category
}

fn check_source_type(errors: &mut FieldErrors, value: Option<&str>) -> Option<IncomeSourceType> {
    let Some(value) = value else {
        errors.push("source_type", FieldErrorKind::Required, "Source type is required");
        return None;
    };
    let source_type = IncomeSourceType::parse(value);
    if source_type.is_none() {
        errors.push(
            "source_type",
            FieldErrorKind::InvalidEnum,
            "Invalid income source type",
        );
    }
    source_type
}

/// Resolves source type + custom name into an `IncomeSource`, reporting a
/// missing name against `custom_source`.
fn resolve_source(
    errors: &mut FieldErrors,
    source_type: IncomeSourceType,
    custom: Option<&str>,
) -> Option<IncomeSource> {
    let custom = if source_type == IncomeSourceType::Other {
        check_text(errors, "custom_source", custom, CUSTOM_SOURCE_MAX, false)
    } else {
        None
    };
    if errors.get("custom_source").is_some() {
        return None;
    }
    let source = IncomeSource::from_parts(source_type, custom.as_deref());
    if source.is_none() {
        errors.push(
            "custom_source",
            FieldErrorKind::Required,
            "Name the source when the type is Other",
        );
    }
    source
}

// ── Entities ──────────────────────────────────────────────────

pub fn validate_expense(raw: &RawExpense) -> Result<NewTransaction, FieldErrors> {
    let mut errors = FieldErrors::new();
    let month_id = check_id(&mut errors, "month_id", raw.month_id.as_deref());
    let date = check_date(&mut errors, raw.date.as_deref());
    let amount = check_amount(&mut errors, "amount", raw.amount.as_ref());
    let item_name = check_text(
        &mut errors,
        "item_name",
        raw.item_name.as_deref(),
        ITEM_NAME_MAX,
        true,
    );
    let category = check_category(&mut errors, raw.category.as_deref());
    let notes = check_text(&mut errors, "notes", raw.notes.as_deref(), NOTES_MAX, false);

    match (month_id, date, amount, item_name, category) {
        (Some(month_id), Some(date), Some(amount), Some(item_name), Some(category))
            if errors.is_empty() =>
        {
            Ok(NewTransaction {
                month_id,
                date,
                amount,
                notes,
                details: TransactionDetails::Expense {
                    item_name,
                    category,
                },
            })
        }
        _ => Err(errors),
    }
}

pub fn validate_income(raw: &RawIncome) -> Result<NewTransaction, FieldErrors> {
    let mut errors = FieldErrors::new();
    let month_id = check_id(&mut errors, "month_id", raw.month_id.as_deref());
    let date = check_date(&mut errors, raw.date.as_deref());
    let amount = check_amount(&mut errors, "amount", raw.amount.as_ref());
    let source = check_source_type(&mut errors, raw.source_type.as_deref())
        .and_then(|t| resolve_source(&mut errors, t, raw.custom_source.as_deref()));
    let notes = check_text(&mut errors, "notes", raw.notes.as_deref(), NOTES_MAX, false);

    match (month_id, date, amount, source) {
        (Some(month_id), Some(date), Some(amount), Some(source)) if errors.is_empty() => {
            Ok(NewTransaction {
                month_id,
                date,
                amount,
                notes,
                details: TransactionDetails::Income { source },
            })
        }
        _ => Err(errors),
    }
}

fn check_optional_notes(
    errors: &mut FieldErrors,
    notes: &Option<Option<String>>,
) -> Option<Option<String>> {
    notes
        .as_ref()
        .map(|n| check_text(errors, "notes", n.as_deref(), NOTES_MAX, false))
}

pub fn validate_expense_update(
    raw: &RawExpenseUpdate,
) -> Result<TransactionPatch, FieldErrors> {
    let mut errors = FieldErrors::new();
    let id = check_id(&mut errors, "id", raw.id.as_deref());
    let date = raw
        .date
        .as_deref()
        .and_then(|d| check_date(&mut errors, Some(d)));
    let amount = raw
        .amount
        .as_ref()
        .and_then(|a| check_amount(&mut errors, "amount", Some(a)));
    let item_name = raw
        .item_name
        .as_deref()
        .and_then(|n| check_text(&mut errors, "item_name", Some(n), ITEM_NAME_MAX, true));
    let category = raw
        .category
        .as_deref()
        .and_then(|c| check_category(&mut errors, Some(c)));
    let notes = check_optional_notes(&mut errors, &raw.notes);

    match id {
        Some(id) if errors.is_empty() => Ok(TransactionPatch {
            id,
            date,
            amount,
            notes,
            details: DetailsPatch::Expense {
                item_name,
                category,
            },
        }),
        _ => Err(errors),
    }
}

pub fn validate_income_update(
    raw: &RawIncomeUpdate,
) -> Result<TransactionPatch, FieldErrors> {
    let mut errors = FieldErrors::new();
    let id = check_id(&mut errors, "id", raw.id.as_deref());
    let date = raw
        .date
        .as_deref()
        .and_then(|d| check_date(&mut errors, Some(d)));
    let amount = raw
        .amount
        .as_ref()
        .and_then(|a| check_amount(&mut errors, "amount", Some(a)));
    let custom = raw.custom_source.as_ref().map(|c| c.as_deref());

    let source = match (raw.source_type.as_deref(), custom) {
        (Some(t), custom) => check_source_type(&mut errors, Some(t))
            .and_then(|t| resolve_source(&mut errors, t, custom.flatten()))
            .map(SourcePatch::Replace)
            .unwrap_or(SourcePatch::Keep),
        (None, Some(custom)) => SourcePatch::CustomName(custom.map(String::from)),
        (None, None) => SourcePatch::Keep,
    };
    let notes = check_optional_notes(&mut errors, &raw.notes);

    match id {
        Some(id) if errors.is_empty() => Ok(TransactionPatch {
            id,
            date,
            amount,
            notes,
            details: DetailsPatch::Income { source },
        }),
        _ => Err(errors),
    }
}

/// Validates each budget row. Blank amounts read as zero; negative ones fail.
pub fn validate_budget_entries(
    raw: &[RawBudgetEntry],
) -> Result<Vec<BudgetEntry>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut entries = Vec::with_capacity(raw.len());

    for (i, entry) in raw.iter().enumerate() {
        let category_field = format!("budgets[{i}].category");
        let amount_field = format!("budgets[{i}].budget_amount");

        let category = match entry.category.as_deref().map(ExpenseCategory::parse) {
            Some(Some(c)) => Some(c),
            Some(None) => {
                errors.push(
                    &category_field,
                    FieldErrorKind::InvalidEnum,
                    "Invalid category",
                );
                None
            }
            None => {
                errors.push(
                    &category_field,
                    FieldErrorKind::Required,
                    "Category is required",
                );
                None
            }
        };

        let amount = match entry.budget_amount.as_ref().filter(|r| !is_blank(r)) {
            None => Some(Decimal::ZERO),
            Some(raw) => match parse_decimal(raw) {
                Some(a) if a < Decimal::ZERO => {
                    errors.push(
                        &amount_field,
                        FieldErrorKind::InvalidAmount,
                        "Budget cannot be negative",
                    );
                    None
                }
                Some(a) if a > max_amount() => {
                    errors.push(
                        &amount_field,
                        FieldErrorKind::InvalidAmount,
                        "Budget is too large",
                    );
                    None
                }
                Some(a) if !is_cents(a) => {
                    errors.push(
                        &amount_field,
                        FieldErrorKind::InvalidAmount,
                        "Budget has too many decimals",
                    );
                    None
                }
                Some(a) => Some(a.normalize()),
                None => {
                    errors.push(
                        &amount_field,
                        FieldErrorKind::InvalidAmount,
                        "Budget must be a number",
                    );
                    None
                }
            },
        };

        if let (Some(category), Some(budget_amount)) = (category, amount) {
            entries.push(BudgetEntry {
                category,
                budget_amount,
            });
        }
    }

    errors.into_result(|| entries)
}

pub fn validate_month_key(year: i64, month: i64) -> Result<MonthKey, FieldErrors> {
    let mut errors = FieldErrors::new();
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        errors.push(
            "year",
            FieldErrorKind::OutOfRange,
            format!("Year must be between {YEAR_MIN} and {YEAR_MAX}"),
        );
    }
    if !(1..=12).contains(&month) {
        errors.push("month", FieldErrorKind::OutOfRange, "Month must be between 1 and 12");
    }
    errors.into_result(|| MonthKey {
        year: year as i32,
        month: month as u32,
    })
}

/// Parses a "YYYY-MM" parameter and checks it against the month bounds.
pub fn parse_month_param(value: &str) -> Result<MonthKey, FieldErrors> {
    let value = value.trim();
    if !MONTH_PARAM_RE.is_match(value) {
        return Err(FieldErrors::single(
            "month",
            FieldErrorKind::InvalidDate,
            "Invalid month format (use YYYY-MM)",
        ));
    }
    let (year, month) = value.split_at(4);
    let year: i64 = year.parse().unwrap_or_default();
    let month: i64 = month[1..].parse().unwrap_or_default();
    validate_month_key(year, month)
}

/// Parses an entity id supplied as text (route or command argument).
pub fn parse_id(value: &str) -> Result<Uuid, FieldErrors> {
    let mut errors = FieldErrors::new();
    let id = check_id(&mut errors, "id", Some(value));
    match id {
        Some(id) => Ok(id),
        None => Err(errors),
    }
}

/// Starting balances may be negative but share the amount magnitude cap.
pub fn validate_starting_balance(raw: &RawNumber) -> Result<Decimal, FieldErrors> {
    match parse_decimal(raw) {
        Some(b) if b.abs() <= max_amount() && is_cents(b) => Ok(b.normalize()),
        Some(b) if b.abs() <= max_amount() => Err(FieldErrors::single(
            "starting_balance",
            FieldErrorKind::InvalidAmount,
            "Starting balance has too many decimals",
        )),
        Some(_) => Err(FieldErrors::single(
            "starting_balance",
            FieldErrorKind::InvalidAmount,
            "Starting balance is too large",
        )),
        None => Err(FieldErrors::single(
            "starting_balance",
            FieldErrorKind::InvalidAmount,
            "Starting balance must be a number",
        )),
    }
}

#[cfg(test)]
mod tests;
