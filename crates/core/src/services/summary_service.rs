use std::collections::HashMap;

use crate::models::analytics::{BudgetLevel, BudgetStatus, CategoryTotal, MonthlyStats};
use crate::models::transaction::{Transaction, TransactionType};

/// Share of the budget above which the progress bar turns amber.
const BUDGET_WARNING_PCT: f64 = 80.0;

/// Derives read-only views from the transaction collection:
/// monthly totals, budget progress and the expense breakdown.
///
/// Everything is recomputed from scratch on each call (O(n), no caching).
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Month-prefix filter: does `transaction` fall into `month` (`YYYY-MM`)?
    pub fn in_month(transaction: &Transaction, month: &str) -> bool {
        transaction.date_starts_with(month)
    }

    /// Income and expense totals over the transactions dated in `month`.
    /// A month without transactions yields all zeros.
    pub fn monthly_summary(&self, transactions: &[Transaction], month: &str) -> MonthlyStats {
        let (income, expense) = transactions
            .iter()
            .filter(|t| Self::in_month(t, month))
            .fold((0.0, 0.0), |(income, expense), t| match t.transaction_type {
                TransactionType::Income => (income + t.amount, expense),
                TransactionType::Expense => (income, expense + t.amount),
            });

        MonthlyStats::new(income, expense)
    }

    /// Compare the month's expense against the budget ceiling.
    pub fn budget_status(
        &self,
        transactions: &[Transaction],
        month: &str,
        budget: f64,
    ) -> BudgetStatus {
        let spent = self.monthly_summary(transactions, month).total_expense;

        let percentage = if budget > 0.0 {
            (spent * 100.0 / budget).min(100.0)
        } else {
            0.0
        };
        let over_budget = budget > 0.0 && spent > budget;
        let level = if over_budget {
            BudgetLevel::Over
        } else if percentage > BUDGET_WARNING_PCT {
            BudgetLevel::Warning
        } else {
            BudgetLevel::Ok
        };

        BudgetStatus {
            budget,
            spent,
            remaining: (budget - spent).max(0.0),
            percentage,
            over_budget,
            level,
        }
    }

    /// Expense totals per category, largest first (ties by name).
    /// `month = None` covers the whole ledger.
    pub fn expense_breakdown(
        &self,
        transactions: &[Transaction],
        month: Option<&str>,
    ) -> Vec<CategoryTotal> {
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for t in transactions
            .iter()
            .filter(|t| t.is_expense())
            .filter(|t| month.map_or(true, |m| Self::in_month(t, m)))
        {
            *totals.entry(t.category.as_str()).or_insert(0.0) += t.amount;
        }

        let grand_total: f64 = totals.values().sum();
        let mut breakdown: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
                share: if grand_total > 0.0 {
                    total * 100.0 / grand_total
                } else {
                    0.0
                },
            })
            .collect();

        breakdown.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        breakdown
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
