use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::ledger::Ledger;
use crate::models::{Transaction, TransactionDetails, TransactionKind};

const HEADER: [&str; 6] = ["date", "kind", "amount", "label", "category_or_source", "notes"];

/// Writes one row per transaction, oldest date first. Returns the row count.
pub fn write_csv<W: io::Write>(out: W, transactions: &[Transaction]) -> Result<usize> {
    let mut rows: Vec<&Transaction> = transactions.iter().collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)?;
    for txn in &rows {
        let group = match &txn.details {
            TransactionDetails::Expense { category, .. } => category.to_string(),
            TransactionDetails::Income { source } => source.source_type().to_string(),
        };
        wtr.write_record([
            txn.date.format("%Y-%m-%d").to_string(),
            txn.kind().to_string(),
            txn.amount.to_string(),
            txn.label(),
            group,
            txn.notes.clone().unwrap_or_default(),
        ])
        .context("Failed to write CSV record")?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Exports every live transaction of a month to `path`.
pub async fn export_month(ledger: &Ledger, month_id: Uuid, path: &Path) -> Result<usize> {
    let mut txns = ledger
        .list_by_month(TransactionKind::Income, month_id)
        .await?;
    txns.extend(
        ledger
            .list_by_month(TransactionKind::Expense, month_id)
            .await?,
    );
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, &txns)
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
