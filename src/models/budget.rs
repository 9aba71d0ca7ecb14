use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::ExpenseCategory;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month_id: Uuid,
    pub category: ExpenseCategory,
    pub budget_amount: Decimal,
}

impl Budget {
    pub fn new(
        user_id: Uuid,
        month_id: Uuid,
        category: ExpenseCategory,
        budget_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            month_id,
            category,
            budget_amount,
        }
    }
}
