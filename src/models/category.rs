use serde::{Deserialize, Serialize};

/// Closed set of spending categories an expense (and a budget) can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Shopping,
    Entertainment,
    Dining,
    Extra,
    Travel,
    #[serde(rename = "Mandatory Expense")]
    MandatoryExpense,
    Clothing,
    Sport,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        Self::Shopping,
        Self::Entertainment,
        Self::Dining,
        Self::Extra,
        Self::Travel,
        Self::MandatoryExpense,
        Self::Clothing,
        Self::Sport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Dining => "Dining",
            Self::Extra => "Extra",
            Self::Travel => "Travel",
            Self::MandatoryExpense => "Mandatory Expense",
            Self::Clothing => "Clothing",
            Self::Sport => "Sport",
        }
    }

    /// Case-insensitive lookup by display name. Unknown names are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().to_lowercase() == lower)
    }

    /// Position in the canonical display order.
    pub fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(Self::ALL.len())
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeSourceType {
    Salary,
    Transfer,
    Business,
    Other,
}

impl IncomeSourceType {
    pub const ALL: [IncomeSourceType; 4] =
        [Self::Salary, Self::Transfer, Self::Business, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "Salary",
            Self::Transfer => "Transfer",
            Self::Business => "Business",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "salary" => Some(Self::Salary),
            "transfer" => Some(Self::Transfer),
            "business" => Some(Self::Business),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for IncomeSourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
