use serde::{Deserialize, Deserializer};

/// A number as it arrives from a form or JSON body: either a JSON number or
/// text typed by the user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for RawNumber {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExpense {
    pub month_id: Option<String>,
    pub date: Option<String>,
    pub amount: Option<RawNumber>,
    pub item_name: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawIncome {
    pub month_id: Option<String>,
    pub date: Option<String>,
    pub amount: Option<RawNumber>,
    pub source_type: Option<String>,
    pub custom_source: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExpenseUpdate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount: Option<RawNumber>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIncomeUpdate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount: Option<RawNumber>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub custom_source: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBudgetEntry {
    pub category: Option<String>,
    pub budget_amount: Option<RawNumber>,
}

impl RawBudgetEntry {
    pub fn new(category: &str, budget_amount: impl Into<RawNumber>) -> Self {
        Self {
            category: Some(category.to_string()),
            budget_amount: Some(budget_amount.into()),
        }
    }
}
