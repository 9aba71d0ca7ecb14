use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{ExpenseCategory, IncomeSourceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expense" => Some(Self::Expense),
            "income" => Some(Self::Income),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an income came from. A custom name exists only for `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source_type", content = "custom_source")]
pub enum IncomeSource {
    Salary,
    Transfer,
    Business,
    Other(String),
}

impl IncomeSource {
    /// Builds a source from its stored columns. `custom` is ignored unless the
    /// type is `Other`, which requires a non-blank name.
    pub fn from_parts(source_type: IncomeSourceType, custom: Option<&str>) -> Option<Self> {
        match source_type {
            IncomeSourceType::Salary => Some(Self::Salary),
            IncomeSourceType::Transfer => Some(Self::Transfer),
            IncomeSourceType::Business => Some(Self::Business),
            IncomeSourceType::Other => custom
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Self::Other(s.to_string())),
        }
    }

    pub fn source_type(&self) -> IncomeSourceType {
        match self {
            Self::Salary => IncomeSourceType::Salary,
            Self::Transfer => IncomeSourceType::Transfer,
            Self::Business => IncomeSourceType::Business,
            Self::Other(_) => IncomeSourceType::Other,
        }
    }

    pub fn custom_source(&self) -> Option<&str> {
        match self {
            Self::Other(name) => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for IncomeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(name) => write!(f, "{name}"),
            other => write!(f, "{}", other.source_type()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransactionDetails {
    Expense {
        item_name: String,
        category: ExpenseCategory,
    },
    Income {
        source: IncomeSource,
    },
}

impl TransactionDetails {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Income { .. } => TransactionKind::Income,
        }
    }
}

/// Validated input for a new transaction, before ids and timestamps are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub month_id: Uuid,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub notes: Option<String>,
    pub details: TransactionDetails,
}

/// An income or expense entry. `amount` is always positive; the kind decides
/// whether it adds to or subtracts from the balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month_id: Uuid,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub details: TransactionDetails,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(user_id: Uuid, input: NewTransaction) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            month_id: input.month_id,
            date: input.date,
            amount: input.amount,
            notes: input.notes,
            details: input.details,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.details.kind()
    }

    pub fn is_income(&self) -> bool {
        self.kind() == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind() == TransactionKind::Expense
    }

    /// Contribution to the month balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind() {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    pub fn category(&self) -> Option<ExpenseCategory> {
        match &self.details {
            TransactionDetails::Expense { category, .. } => Some(*category),
            TransactionDetails::Income { .. } => None,
        }
    }

    /// Item name for expenses, source name for income.
    pub fn label(&self) -> String {
        match &self.details {
            TransactionDetails::Expense { item_name, .. } => item_name.clone(),
            TransactionDetails::Income { source } => source.to_string(),
        }
    }
}
