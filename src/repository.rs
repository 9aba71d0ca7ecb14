use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Budget, Month, Transaction, TransactionKind};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of setting a soft-delete marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The row was already marked; its original timestamp is kept.
    AlreadyDeleted,
    /// No row with that id belongs to the user.
    Missing,
}

/// Storage the ledger depends on. Every call is scoped by the owning user.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Live month for (user, year, month).
    async fn find_month(&self, user_id: Uuid, year: i32, month: u32)
        -> StoreResult<Option<Month>>;

    /// Live month by id.
    async fn find_month_by_id(&self, user_id: Uuid, month_id: Uuid)
        -> StoreResult<Option<Month>>;

    /// Live months, newest period first.
    async fn list_months(&self, user_id: Uuid) -> StoreResult<Vec<Month>>;

    /// Fails with `StoreError::UniqueViolation` when a live month already
    /// exists for the same (user, year, month).
    async fn insert_month(&self, month: &Month) -> StoreResult<()>;

    async fn update_starting_balance(
        &self,
        user_id: Uuid,
        month_id: Uuid,
        starting_balance: Decimal,
    ) -> StoreResult<Option<Month>>;

    async fn mark_month_deleted(
        &self,
        user_id: Uuid,
        month_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<DeleteOutcome>;

    async fn insert_transaction(&self, txn: &Transaction) -> StoreResult<()>;

    /// Live transaction of the given kind.
    async fn find_transaction(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        id: Uuid,
    ) -> StoreResult<Option<Transaction>>;

    /// Overwrites the mutable columns of a live row. Returns `false` when no
    /// live row with that id, kind and owner exists.
    async fn update_transaction(&self, txn: &Transaction) -> StoreResult<bool>;

    async fn mark_transaction_deleted(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<DeleteOutcome>;

    /// Live transactions of a month, by date then entry time, newest first.
    async fn list_transactions(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        month_id: Uuid,
    ) -> StoreResult<Vec<Transaction>>;

    async fn list_budgets(&self, user_id: Uuid, month_id: Uuid) -> StoreResult<Vec<Budget>>;

    /// Inserts or overwrites the budget keyed by (month, category) and returns
    /// the stored row.
    async fn upsert_budget(&self, budget: &Budget) -> StoreResult<Budget>;
}
