mod budget;
mod category;
mod month;
mod transaction;

pub use budget::Budget;
pub use category::{ExpenseCategory, IncomeSourceType};
pub use month::Month;
pub use transaction::{
    IncomeSource, NewTransaction, Transaction, TransactionDetails, TransactionKind,
};
