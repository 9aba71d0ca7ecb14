mod schema;

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::*;
use crate::repository::{DeleteOutcome, LedgerRepository, StoreResult};

const MONTH_COLUMNS: &str = "id, user_id, year, month, starting_balance, created_at, deleted_at";
const TXN_COLUMNS: &str = "id, user_id, month_id, kind, date, amount, item_name, category,
     source_type, custom_source, notes, created_at, deleted_at";
const BUDGET_COLUMNS: &str = "id, user_id, month_id, category, budget_amount";

/// SQLite-backed ledger store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let conn = self
            .conn
            .get_mut()
            .map_err(|_| anyhow::anyhow!("Database connection lock poisoned"))?;

        // Check if schema_version table exists
        let has_version_table: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            conn.execute_batch(schema::SCHEMA_V1)?;
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("Database connection lock poisoned".into()))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
                ErrorCode::ConstraintViolation
                    if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    StoreError::UniqueViolation(e.to_string())
                }
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    StoreError::RateLimited(e.to_string())
                }
                _ => StoreError::Backend(e.to_string()),
            },
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

// ── Row mapping ───────────────────────────────────────────────

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_error(idx, format!("bad id '{s}': {e}")))
}

fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    Decimal::from_str(&s).map_err(|e| conversion_error(idx, format!("bad amount '{s}': {e}")))
}

fn month_from_row(row: &Row<'_>) -> rusqlite::Result<Month> {
    Ok(Month {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        year: row.get(2)?,
        month: row.get(3)?,
        starting_balance: decimal_at(row, 4)?,
        created_at: row.get(5)?,
        deleted_at: row.get(6)?,
    })
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(3)?;
    let details = match TransactionKind::parse(&kind) {
        Some(TransactionKind::Expense) => {
            let category: String = row.get(7)?;
            TransactionDetails::Expense {
                item_name: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                category: ExpenseCategory::parse(&category)
                    .ok_or_else(|| conversion_error(7, format!("unknown category '{category}'")))?,
            }
        }
        Some(TransactionKind::Income) => {
            let source_type: String = row.get(8)?;
            let custom: Option<String> = row.get(9)?;
            let source = IncomeSourceType::parse(&source_type)
                .and_then(|t| IncomeSource::from_parts(t, custom.as_deref()))
                .ok_or_else(|| conversion_error(8, format!("bad income source '{source_type}'")))?;
            TransactionDetails::Income { source }
        }
        None => return Err(conversion_error(3, format!("unknown kind '{kind}'"))),
    };

    Ok(Transaction {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        month_id: uuid_at(row, 2)?,
        date: row.get::<_, NaiveDate>(4)?,
        amount: decimal_at(row, 5)?,
        notes: row.get(10)?,
        details,
        created_at: row.get(11)?,
        deleted_at: row.get(12)?,
    })
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let category: String = row.get(3)?;
    Ok(Budget {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        month_id: uuid_at(row, 2)?,
        category: ExpenseCategory::parse(&category)
            .ok_or_else(|| conversion_error(3, format!("unknown category '{category}'")))?,
        budget_amount: decimal_at(row, 4)?,
    })
}

/// Columns that differ per kind: (item_name, category, source_type, custom_source).
fn detail_columns(
    details: &TransactionDetails,
) -> (Option<&str>, Option<&str>, Option<&str>, Option<&str>) {
    match details {
        TransactionDetails::Expense {
            item_name,
            category,
        } => (Some(item_name), Some(category.as_str()), None, None),
        TransactionDetails::Income { source } => (
            None,
            None,
            Some(source.source_type().as_str()),
            source.custom_source(),
        ),
    }
}

fn select_month(conn: &Connection, user_id: Uuid, month_id: Uuid) -> rusqlite::Result<Option<Month>> {
    conn.query_row(
        &format!(
            "SELECT {MONTH_COLUMNS} FROM months
             WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL"
        ),
        params![month_id.to_string(), user_id.to_string()],
        month_from_row,
    )
    .optional()
}

/// Sets `deleted_at` on a live row of `table`, reporting whether the row was
/// live, already marked or absent.
fn mark_deleted(
    conn: &Connection,
    table: &str,
    extra_filter: &str,
    id: Uuid,
    user_id: Uuid,
    at: DateTime<Utc>,
) -> rusqlite::Result<DeleteOutcome> {
    let changed = conn.execute(
        &format!(
            "UPDATE {table} SET deleted_at = ?1
             WHERE id = ?2 AND user_id = ?3 {extra_filter} AND deleted_at IS NULL"
        ),
        params![at, id.to_string(), user_id.to_string()],
    )?;
    if changed > 0 {
        return Ok(DeleteOutcome::Deleted);
    }
    let exists: bool = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1 AND user_id = ?2 {extra_filter})"
        ),
        params![id.to_string(), user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(if exists {
        DeleteOutcome::AlreadyDeleted
    } else {
        DeleteOutcome::Missing
    })
}

#[async_trait]
impl LedgerRepository for Database {
    // ── Months ────────────────────────────────────────────────

    async fn find_month(&self, user_id: Uuid, year: i32, month: u32) -> StoreResult<Option<Month>> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                &format!(
                    "SELECT {MONTH_COLUMNS} FROM months
                     WHERE user_id = ?1 AND year = ?2 AND month = ?3 AND deleted_at IS NULL"
                ),
                params![user_id.to_string(), year, month],
                month_from_row,
            )
            .optional()?;
        Ok(found)
    }

    async fn find_month_by_id(&self, user_id: Uuid, month_id: Uuid) -> StoreResult<Option<Month>> {
        let conn = self.conn()?;
        Ok(select_month(&conn, user_id, month_id)?)
    }

    async fn list_months(&self, user_id: Uuid) -> StoreResult<Vec<Month>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MONTH_COLUMNS} FROM months
             WHERE user_id = ?1 AND deleted_at IS NULL
             ORDER BY year DESC, month DESC"
        ))?;
        let rows = stmt.query_map(params![user_id.to_string()], month_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn insert_month(&self, month: &Month) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO months (id, user_id, year, month, starting_balance, created_at, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                month.id.to_string(),
                month.user_id.to_string(),
                month.year,
                month.month,
                month.starting_balance.to_string(),
                month.created_at,
                month.deleted_at,
            ],
        )?;
        Ok(())
    }

    async fn update_starting_balance(
        &self,
        user_id: Uuid,
        month_id: Uuid,
        starting_balance: Decimal,
    ) -> StoreResult<Option<Month>> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE months SET starting_balance = ?1
             WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
            params![
                starting_balance.to_string(),
                month_id.to_string(),
                user_id.to_string()
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(select_month(&conn, user_id, month_id)?)
    }

    async fn mark_month_deleted(
        &self,
        user_id: Uuid,
        month_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<DeleteOutcome> {
        let conn = self.conn()?;
        Ok(mark_deleted(&conn, "months", "", month_id, user_id, at)?)
    }

    // ── Transactions ──────────────────────────────────────────

    async fn insert_transaction(&self, txn: &Transaction) -> StoreResult<()> {
        let conn = self.conn()?;
        let (item_name, category, source_type, custom_source) = detail_columns(&txn.details);
        conn.execute(
            "INSERT INTO transactions (id, user_id, month_id, kind, date, amount, item_name,
                 category, source_type, custom_source, notes, created_at, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                txn.id.to_string(),
                txn.user_id.to_string(),
                txn.month_id.to_string(),
                txn.kind().as_str(),
                txn.date,
                txn.amount.to_string(),
                item_name,
                category,
                source_type,
                custom_source,
                txn.notes,
                txn.created_at,
                txn.deleted_at,
            ],
        )?;
        Ok(())
    }

    async fn find_transaction(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        id: Uuid,
    ) -> StoreResult<Option<Transaction>> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                &format!(
                    "SELECT {TXN_COLUMNS} FROM transactions
                     WHERE id = ?1 AND user_id = ?2 AND kind = ?3 AND deleted_at IS NULL"
                ),
                params![id.to_string(), user_id.to_string(), kind.as_str()],
                transaction_from_row,
            )
            .optional()?;
        Ok(found)
    }

    async fn update_transaction(&self, txn: &Transaction) -> StoreResult<bool> {
        let conn = self.conn()?;
        let (item_name, category, source_type, custom_source) = detail_columns(&txn.details);
        let changed = conn.execute(
            "UPDATE transactions
             SET date = ?1, amount = ?2, item_name = ?3, category = ?4,
                 source_type = ?5, custom_source = ?6, notes = ?7
             WHERE id = ?8 AND user_id = ?9 AND kind = ?10 AND deleted_at IS NULL",
            params![
                txn.date,
                txn.amount.to_string(),
                item_name,
                category,
                source_type,
                custom_source,
                txn.notes,
                txn.id.to_string(),
                txn.user_id.to_string(),
                txn.kind().as_str(),
            ],
        )?;
        Ok(changed > 0)
    }

    async fn mark_transaction_deleted(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<DeleteOutcome> {
        let conn = self.conn()?;
        let filter = format!("AND kind = '{}'", kind.as_str());
        Ok(mark_deleted(&conn, "transactions", &filter, id, user_id, at)?)
    }

    async fn list_transactions(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        month_id: Uuid,
    ) -> StoreResult<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TXN_COLUMNS} FROM transactions
             WHERE user_id = ?1 AND month_id = ?2 AND kind = ?3 AND deleted_at IS NULL
             ORDER BY date DESC, created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(
            params![user_id.to_string(), month_id.to_string(), kind.as_str()],
            transaction_from_row,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Budgets ───────────────────────────────────────────────

    async fn list_budgets(&self, user_id: Uuid, month_id: Uuid) -> StoreResult<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = ?1 AND month_id = ?2"
        ))?;
        let rows = stmt.query_map(
            params![user_id.to_string(), month_id.to_string()],
            budget_from_row,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    async fn upsert_budget(&self, budget: &Budget) -> StoreResult<Budget> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (id, user_id, month_id, category, budget_amount)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(month_id, category) DO UPDATE SET budget_amount = excluded.budget_amount
             WHERE budgets.user_id = excluded.user_id",
            params![
                budget.id.to_string(),
                budget.user_id.to_string(),
                budget.month_id.to_string(),
                budget.category.as_str(),
                budget.budget_amount.to_string(),
            ],
        )?;
        let stored = conn.query_row(
            &format!(
                "SELECT {BUDGET_COLUMNS} FROM budgets
                 WHERE user_id = ?1 AND month_id = ?2 AND category = ?3"
            ),
            params![
                budget.user_id.to_string(),
                budget.month_id.to_string(),
                budget.category.as_str(),
            ],
            budget_from_row,
        )?;
        Ok(stored)
    }
}
