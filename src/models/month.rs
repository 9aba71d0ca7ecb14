use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A user's accounting period, keyed by (year, month).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Month {
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub starting_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Month {
    pub fn new(user_id: Uuid, year: i32, month: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            year,
            month,
            starting_balance: Decimal::ZERO,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Format: "YYYY-MM"
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
