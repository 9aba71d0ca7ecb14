pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS months (
    id                TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL,
    year              INTEGER NOT NULL CHECK (year BETWEEN 2000 AND 2100),
    month             INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    starting_balance  TEXT NOT NULL DEFAULT '0',
    created_at        TEXT NOT NULL,
    deleted_at        TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_months_user_period
    ON months(user_id, year, month) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS transactions (
    id             TEXT PRIMARY KEY,
    user_id        TEXT NOT NULL,
    month_id       TEXT NOT NULL REFERENCES months(id),
    kind           TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
    date           TEXT NOT NULL,
    amount         TEXT NOT NULL,
    item_name      TEXT,
    category       TEXT,
    source_type    TEXT,
    custom_source  TEXT,
    notes          TEXT,
    created_at     TEXT NOT NULL,
    deleted_at     TEXT
);

CREATE INDEX IF NOT EXISTS idx_transactions_owner_month
    ON transactions(user_id, month_id, kind);
CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

CREATE TABLE IF NOT EXISTS budgets (
    id             TEXT PRIMARY KEY,
    user_id        TEXT NOT NULL,
    month_id       TEXT NOT NULL REFERENCES months(id),
    category       TEXT NOT NULL,
    budget_amount  TEXT NOT NULL,
    UNIQUE(month_id, category)
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
