use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use monthbook::aggregate;
use monthbook::error::Result as LedgerResult;
use monthbook::export;
use monthbook::models::{Budget, Month, Transaction, TransactionKind};
use monthbook::validation::{
    self, MonthKey, RawBudgetEntry, RawExpense, RawIncome, RawNumber,
};
use monthbook::{ActionResult, Ledger, LedgerError, MonthSummary};

use super::util::{format_amount, shellexpand, take_flag, truncate};

pub(crate) async fn as_cli(args: &[String], ledger: &Ledger) -> Result<()> {
    let json = args.iter().any(|a| a == "--json");
    let args: Vec<String> = args.iter().filter(|a| *a != "--json").cloned().collect();
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };
    let rest = &args[2..];

    match command.as_str() {
        "months" => emit(json, ledger.list_months().await, |m| print_months(m)),
        "open" => {
            let month = month_arg(rest, "open <YYYY-MM>")?;
            emit(json, open_month(ledger, month).await, print_month)
        }
        "add-expense" => emit(json, cli_add_expense(rest, ledger).await?, print_created),
        "add-income" => emit(json, cli_add_income(rest, ledger).await?, print_created),
        "list" => {
            let month = month_arg(rest, "list <YYYY-MM>")?;
            emit(json, cli_list(ledger, month).await, print_listing)
        }
        "delete-expense" => {
            let id = id_arg(rest, "delete-expense <ID>")?;
            emit(json, cli_delete(ledger, TransactionKind::Expense, id).await, |_| {
                println!("Deleted expense {id}")
            })
        }
        "delete-income" => {
            let id = id_arg(rest, "delete-income <ID>")?;
            emit(json, cli_delete(ledger, TransactionKind::Income, id).await, |_| {
                println!("Deleted income {id}")
            })
        }
        "set-budget" => {
            let month = month_arg(rest, "set-budget <YYYY-MM> CATEGORY=AMOUNT...")?;
            let entries = budget_args(&rest[1..])?;
            emit(json, cli_set_budget(ledger, month, &entries).await, |b| {
                print_budgets(b)
            })
        }
        "summary" | "s" => {
            let month = rest
                .first()
                .cloned()
                .unwrap_or_else(|| chrono::Local::now().format("%Y-%m").to_string());
            emit(json, cli_summary(ledger, &month).await, print_summary)
        }
        "balance" => {
            let month = month_arg(rest, "balance <YYYY-MM> <AMOUNT>")?;
            let Some(amount) = rest.get(1) else {
                anyhow::bail!("Usage: monthbook balance <YYYY-MM> <AMOUNT>");
            };
            emit(json, cli_balance(ledger, month, amount).await, print_month)
        }
        "export" => {
            let month = month_arg(rest, "export <YYYY-MM> [path]")?;
            cli_export(ledger, month, rest.get(1)).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("monthbook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Monthbook - monthly income, expenses and budgets");
    println!();
    println!("Usage: monthbook <command> [--json]");
    println!();
    println!("Commands:");
    println!("  months                                  List months, newest first");
    println!("  open <YYYY-MM>                          Open (or create) a month");
    println!("  add-expense <DATE> <AMOUNT> <CATEGORY> <ITEM...>");
    println!("    --notes <text>                        Attach a note");
    println!("  add-income <DATE> <AMOUNT> <SOURCE> [NAME...]");
    println!("    --notes <text>                        Attach a note");
    println!("  list <YYYY-MM>                          List a month's entries");
    println!("  delete-expense <ID>                     Delete an expense");
    println!("  delete-income <ID>                      Delete an income entry");
    println!("  set-budget <YYYY-MM> CATEGORY=AMOUNT... Set category budgets");
    println!("  summary [YYYY-MM]                       Totals, balance and budgets");
    println!("  balance <YYYY-MM> <AMOUNT>              Set the starting balance");
    println!("  export <YYYY-MM> [path]                 Export a month to CSV");
    println!("  --json                                  Print the result envelope as JSON");
    println!("  --help, -h                              Show this help");
    println!("  --version, -V                           Show version");
}

/// Prints `result` either as the JSON envelope or through `text`. In text
/// mode a ledger error becomes the command's error.
fn emit<T: Serialize>(json: bool, result: LedgerResult<T>, text: impl FnOnce(&T)) -> Result<()> {
    if json {
        let envelope = ActionResult::from(result);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }
    let data = result?;
    text(&data);
    Ok(())
}

// ── Argument parsing ──────────────────────────────────────────

fn month_arg(args: &[String], usage: &str) -> Result<MonthKey> {
    let Some(raw) = args.first() else {
        anyhow::bail!("Usage: monthbook {usage}");
    };
    Ok(validation::parse_month_param(raw).map_err(LedgerError::from)?)
}

fn id_arg(args: &[String], usage: &str) -> Result<Uuid> {
    let Some(raw) = args.first() else {
        anyhow::bail!("Usage: monthbook {usage}");
    };
    Ok(validation::parse_id(raw).map_err(LedgerError::from)?)
}

fn budget_args(args: &[String]) -> Result<Vec<RawBudgetEntry>> {
    if args.is_empty() {
        anyhow::bail!("Usage: monthbook set-budget <YYYY-MM> CATEGORY=AMOUNT...");
    }
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((category, amount)) => Ok(RawBudgetEntry::new(category, amount)),
            None => anyhow::bail!("Expected CATEGORY=AMOUNT, got: {arg}"),
        })
        .collect()
}

/// Month id for an entry dated `date`, created on demand. `None` when the
/// date has no usable YYYY-MM prefix; validation then reports the date.
async fn month_for_date(ledger: &Ledger, date: &str) -> LedgerResult<Option<String>> {
    let Some(key) = date
        .get(..7)
        .and_then(|prefix| validation::parse_month_param(prefix).ok())
    else {
        return Ok(None);
    };
    let month = ledger
        .get_or_create_month(i64::from(key.year), i64::from(key.month))
        .await?;
    Ok(Some(month.id.to_string()))
}

// ── Commands ──────────────────────────────────────────────────

async fn open_month(ledger: &Ledger, key: MonthKey) -> LedgerResult<Month> {
    ledger
        .get_or_create_month(i64::from(key.year), i64::from(key.month))
        .await
}

async fn cli_add_expense(args: &[String], ledger: &Ledger) -> Result<LedgerResult<Transaction>> {
    let (words, notes) = take_flag(args, "--notes");
    if words.len() < 4 {
        anyhow::bail!("Usage: monthbook add-expense <DATE> <AMOUNT> <CATEGORY> <ITEM...>");
    }
    let date = words[0].clone();
    let month_id = match month_for_date(ledger, &date).await {
        Ok(id) => id,
        Err(e) => return Ok(Err(e)),
    };
    let raw = RawExpense {
        month_id,
        amount: Some(RawNumber::from(words[1].as_str())),
        category: Some(words[2].clone()),
        item_name: Some(words[3..].join(" ")),
        date: Some(date),
        notes,
    };
    Ok(ledger.create_expense(&raw).await)
}

async fn cli_add_income(args: &[String], ledger: &Ledger) -> Result<LedgerResult<Transaction>> {
    let (words, notes) = take_flag(args, "--notes");
    if words.len() < 3 {
        anyhow::bail!("Usage: monthbook add-income <DATE> <AMOUNT> <SOURCE> [NAME...]");
    }
    let date = words[0].clone();
    let month_id = match month_for_date(ledger, &date).await {
        Ok(id) => id,
        Err(e) => return Ok(Err(e)),
    };
    let custom = words[3..].join(" ");
    let raw = RawIncome {
        month_id,
        amount: Some(RawNumber::from(words[1].as_str())),
        source_type: Some(words[2].clone()),
        custom_source: (!custom.is_empty()).then_some(custom),
        date: Some(date),
        notes,
    };
    Ok(ledger.create_income(&raw).await)
}

#[derive(Serialize)]
struct MonthListing {
    month: Month,
    income: Vec<Transaction>,
    expenses: Vec<Transaction>,
}

async fn cli_list(ledger: &Ledger, key: MonthKey) -> LedgerResult<MonthListing> {
    let month = open_month(ledger, key).await?;
    let income = ledger.list_by_month(TransactionKind::Income, month.id).await?;
    let expenses = ledger
        .list_by_month(TransactionKind::Expense, month.id)
        .await?;
    Ok(MonthListing {
        month,
        income,
        expenses,
    })
}

async fn cli_delete(ledger: &Ledger, kind: TransactionKind, id: Uuid) -> LedgerResult<()> {
    ledger.soft_delete_transaction(kind, id).await
}

async fn cli_set_budget(
    ledger: &Ledger,
    key: MonthKey,
    entries: &[RawBudgetEntry],
) -> LedgerResult<Vec<Budget>> {
    let month = open_month(ledger, key).await?;
    ledger.set_budgets_for_month(month.id, entries).await?;
    ledger.budgets_for_month(month.id).await
}

async fn cli_summary(ledger: &Ledger, month: &str) -> LedgerResult<MonthSummary> {
    let key = validation::parse_month_param(month)?;
    let month = open_month(ledger, key).await?;
    ledger.month_summary(month.id).await
}

async fn cli_balance(ledger: &Ledger, key: MonthKey, amount: &str) -> LedgerResult<Month> {
    let month = open_month(ledger, key).await?;
    ledger
        .update_starting_balance(month.id, &RawNumber::from(amount))
        .await
}

async fn cli_export(ledger: &Ledger, key: MonthKey, path: Option<&String>) -> Result<()> {
    let output_path = path.map(|p| shellexpand(p)).unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/monthbook-export-{key}.csv")
    });
    let month = open_month(ledger, key).await?;
    let count = export::export_month(ledger, month.id, std::path::Path::new(&output_path)).await?;
    if count == 0 {
        println!("No transactions for {key}");
    } else {
        println!("Exported {count} transactions to {output_path}");
    }
    Ok(())
}

// ── Output ────────────────────────────────────────────────────

fn print_months(months: &[Month]) {
    if months.is_empty() {
        println!("No months");
        return;
    }
    println!("{:<9} {:>16}  ID", "Month", "Start");
    println!("{}", "─".repeat(64));
    for month in months {
        println!(
            "{:<9} {:>16}  {}",
            month.key(),
            format_amount(month.starting_balance),
            month.id
        );
    }
}

fn print_month(month: &Month) {
    println!("{}  starting balance {}", month.key(), format_amount(month.starting_balance));
    println!("ID: {}", month.id);
}

fn print_created(txn: &Transaction) {
    println!(
        "Added {} {} ({}) on {}",
        txn.kind(),
        format_amount(txn.amount),
        txn.label(),
        txn.date
    );
    println!("ID: {}", txn.id);
}

fn print_transactions(title: &str, txns: &[Transaction]) {
    println!("{title}");
    if txns.is_empty() {
        println!("  (none)");
        return;
    }
    for txn in txns {
        let group = txn
            .category()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "Income".into());
        println!(
            "  {}  {:<24} {:<18} {:>16}  {}",
            txn.date,
            truncate(&txn.label(), 24),
            group,
            format_amount(txn.amount),
            txn.id
        );
    }
}

fn print_listing(listing: &MonthListing) {
    println!("Monthbook — {}", listing.month.key());
    println!("{}", "─".repeat(40));
    print_transactions("Income:", &listing.income);
    println!();
    print_transactions("Expenses:", &listing.expenses);
}

fn print_budgets(budgets: &[Budget]) {
    println!("Budgets:");
    for budget in budgets {
        println!(
            "  {:<24} {:>16}",
            budget.category,
            format_amount(budget.budget_amount)
        );
    }
}

fn print_summary(summary: &MonthSummary) {
    println!("Monthbook — {}", summary.month.key());
    println!("{}", "─".repeat(40));
    println!("  Starting:   {}", format_amount(summary.month.starting_balance));
    println!("  Income:     {}", format_amount(summary.total_income));
    println!("  Expenses:   {}", format_amount(summary.total_expenses));
    println!("  Balance:    {}", format_amount(summary.balance));

    if !summary.by_category.is_empty() {
        println!();
        println!("Spending by Category:");
        let mut rows = summary.by_category.clone();
        rows.sort_by_key(|g| g.category.ordinal());
        for group in &rows {
            println!(
                "  {:<24} {:>16}  ({} entries)",
                group.category,
                format_amount(group.total),
                group.count
            );
        }
    }

    if !summary.budgets.is_empty() {
        println!();
        println!(
            "  {:<20} {:>14} {:>14} {:>14}",
            "Budget", "Planned", "Spent", "Remaining"
        );
        for row in &summary.budgets {
            let flag = if row.remaining < Decimal::ZERO {
                "  over"
            } else {
                ""
            };
            println!(
                "  {:<20} {:>14} {:>14} {:>14}{flag}",
                row.category,
                format_amount(row.budgeted),
                format_amount(row.actual),
                format_amount(row.remaining)
            );
        }
    }

    let net = aggregate::compute_balance(
        Decimal::ZERO,
        summary.total_income,
        summary.total_expenses,
    );
    println!();
    println!("  Net this month: {}", format_amount(net));
}
