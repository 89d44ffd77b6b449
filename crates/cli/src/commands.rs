use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use household_budget_core::format::{format_jpy, signed_jpy};
use household_budget_core::models::analytics::BudgetLevel;
use household_budget_core::models::category::{builtin_categories, default_category};
use household_budget_core::models::transaction::{
    NewTransaction, TransactionPatch, TransactionType,
};
use household_budget_core::storage::traits::KeyValueStore;
use household_budget_core::HouseholdLedger;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List transactions, newest first
    List {
        /// Only show this month (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },

    /// Record a transaction
    Add {
        /// income or expense
        #[arg(long = "type", default_value = "expense")]
        transaction_type: TransactionType,

        /// Amount in yen, greater than zero
        #[arg(long, value_parser = parse_amount)]
        amount: f64,

        /// Date (YYYY-MM-DD), today by default
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Category, the type's default category if omitted
        #[arg(long)]
        category: Option<String>,

        /// Free-text memo
        #[arg(long)]
        note: Option<String>,
    },

    /// Change fields of an existing transaction
    Update {
        id: String,

        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,

        #[arg(long, value_parser = parse_amount)]
        amount: Option<f64>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,

        /// Remove the memo
        #[arg(long)]
        clear_note: bool,
    },

    /// Delete a transaction
    Delete { id: String },

    /// Monthly income/expense totals and budget progress
    Summary {
        /// Month (YYYY-MM), current month by default
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },

    /// Expense by category
    Breakdown {
        /// Month (YYYY-MM); the whole ledger if omitted
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
    },

    /// Show or set the monthly budget (0 = no budget)
    Budget {
        #[arg(value_parser = parse_budget)]
        amount: Option<f64>,
    },

    /// Write the ledger to transactions_<date>.csv
    Export {
        /// Target directory, the current directory by default
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// List the built-in categories
    Categories {
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
    },
}

/// The dates a command works with.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dates {
    /// Local calendar day: default entry date and current month
    pub today: NaiveDate,
    /// UTC calendar day: stamp in the export file name
    pub export: NaiveDate,
}

impl Dates {
    fn now() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
            export: chrono::Utc::now().date_naive(),
        }
    }
}

/// Run `command` against `ledger`, printing to stdout.
pub fn run<S: KeyValueStore>(command: Command, ledger: &mut HouseholdLedger<S>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(command, ledger, Dates::now(), &mut out)
}

pub(crate) fn execute<S: KeyValueStore, W: Write>(
    command: Command,
    ledger: &mut HouseholdLedger<S>,
    dates: Dates,
    out: &mut W,
) -> Result<()> {
    let today = dates.today;
    match command {
        Command::List { month } => list(ledger, month.as_deref(), out),
        Command::Add {
            transaction_type,
            amount,
            date,
            category,
            note,
        } => {
            let category = category.unwrap_or_else(|| default_category(transaction_type).to_string());
            let mut new = NewTransaction::new(
                transaction_type,
                amount,
                date.unwrap_or(today),
                category,
            );
            if let Some(note) = note {
                new = new.with_note(note);
            }
            let id = ledger.add(new).context("Failed to add transaction")?;
            writeln!(out, "取引を追加しました: {id}")?;
            Ok(())
        }
        Command::Update {
            id,
            transaction_type,
            amount,
            date,
            category,
            note,
            clear_note,
        } => {
            let patch = TransactionPatch {
                date,
                amount,
                transaction_type,
                category,
                note: if clear_note {
                    Some(None)
                } else {
                    note.map(|n| if n.is_empty() { None } else { Some(n) })
                },
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update: pass at least one field");
            }
            if ledger.update(&id, patch).context("Failed to update transaction")? {
                writeln!(out, "取引を更新しました: {id}")?;
            } else {
                writeln!(out, "No transaction with id {id}")?;
            }
            Ok(())
        }
        Command::Delete { id } => {
            if ledger.delete(&id).context("Failed to delete transaction")? {
                writeln!(out, "取引を削除しました: {id}")?;
            } else {
                writeln!(out, "No transaction with id {id}")?;
            }
            Ok(())
        }
        Command::Summary { month } => {
            let month = month.unwrap_or_else(|| today.format("%Y-%m").to_string());
            summary(ledger, &month, out)
        }
        Command::Breakdown { month } => breakdown(ledger, month.as_deref(), out),
        Command::Budget { amount } => {
            if let Some(amount) = amount {
                ledger
                    .update_budget(amount)
                    .context("Failed to save budget")?;
            }
            writeln!(out, "予算: {}", format_jpy(ledger.budget()))?;
            Ok(())
        }
        Command::Export { dir } => {
            let path = ledger
                .export_csv_to_dir(&dir, dates.export)
                .with_context(|| format!("Failed to write export to {}", dir.display()))?;
            writeln!(out, "Exported {} transactions to {}", ledger.len(), path.display())?;
            Ok(())
        }
        Command::Categories { transaction_type } => {
            let types = match transaction_type {
                Some(t) => vec![t],
                None => vec![TransactionType::Expense, TransactionType::Income],
            };
            for t in types {
                writeln!(out, "{}:", t.label())?;
                for category in builtin_categories(t) {
                    writeln!(out, "  {}", category.name)?;
                }
            }
            Ok(())
        }
    }
}

fn list<S: KeyValueStore, W: Write>(
    ledger: &HouseholdLedger<S>,
    month: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let transactions = match month {
        Some(m) => ledger.transactions_for_month(m),
        None => ledger.transactions().iter().collect(),
    };
    if transactions.is_empty() {
        writeln!(out, "取引データはまだありません。")?;
        return Ok(());
    }

    for t in transactions {
        let note = t.note.as_deref().map(|n| format!(" • {n}")).unwrap_or_default();
        writeln!(
            out,
            "{}  {}  {:<12} {:>14}{}  [{}]",
            t.date,
            t.transaction_type.label(),
            t.category,
            signed_jpy(t),
            note,
            t.id,
        )?;
    }
    Ok(())
}

fn summary<S: KeyValueStore, W: Write>(
    ledger: &HouseholdLedger<S>,
    month: &str,
    out: &mut W,
) -> Result<()> {
    let stats = ledger.monthly_summary(month);
    writeln!(out, "{month}")?;
    writeln!(out, "{}", "─".repeat(32))?;
    writeln!(out, "  収入: {:>16}", format_jpy(stats.total_income))?;
    writeln!(out, "  支出: {:>16}", format_jpy(stats.total_expense))?;
    writeln!(out, "  残高: {:>16}", format_jpy(stats.balance))?;

    let status = ledger.budget_status(month);
    writeln!(out)?;
    writeln!(out, "予算: {}", format_jpy(status.budget))?;
    writeln!(
        out,
        "  支出済み: {}  残り: {}",
        format_jpy(status.spent),
        format_jpy(status.remaining)
    )?;
    if status.budget > 0.0 {
        let marker = match status.level {
            BudgetLevel::Ok => "",
            BudgetLevel::Warning => "  (!)",
            BudgetLevel::Over => "  予算超過",
        };
        writeln!(
            out,
            "  [{}] {:.1}% 消化{marker}",
            progress_bar(status.percentage, 20),
            status.percentage
        )?;
    }
    Ok(())
}

fn breakdown<S: KeyValueStore, W: Write>(
    ledger: &HouseholdLedger<S>,
    month: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let totals = ledger.expense_breakdown(month);
    if totals.is_empty() {
        writeln!(out, "支出データがありません。")?;
        return Ok(());
    }

    writeln!(out, "支出の内訳")?;
    for total in totals {
        writeln!(
            out,
            "  {:<12} {:>14} {:>6.1}%",
            total.category,
            format_jpy(total.total),
            total.share
        )?;
    }
    Ok(())
}

fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

fn parse_month(s: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m").to_string())
        .map_err(|_| format!("invalid month '{s}', expected YYYY-MM"))
}

/// Form rule: a transaction amount must be a number greater than zero.
fn parse_amount(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err("有効な金額を入力してください。".to_string()),
    }
}

fn parse_budget(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!("invalid budget '{s}', expected a number >= 0")),
    }
}
