use serde::{Deserialize, Serialize};

/// Income/expense totals for one month. Derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// Sum of income amounts in the month
    pub total_income: f64,

    /// Sum of expense amounts in the month
    pub total_expense: f64,

    /// total_income - total_expense
    pub balance: f64,
}

impl MonthlyStats {
    pub fn new(total_income: f64, total_expense: f64) -> Self {
        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}

/// Traffic-light state of the budget progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetLevel {
    /// At or below 80% of the budget, or no budget set
    Ok,
    /// More than 80% consumed
    Warning,
    /// Spending exceeds the budget
    Over,
}

/// Budget-vs-actual for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// The configured ceiling (0 = unset)
    pub budget: f64,

    /// Total expense in the month
    pub spent: f64,

    /// max(budget - spent, 0)
    pub remaining: f64,

    /// Consumed share of the budget, capped at 100. Zero when no budget is set.
    pub percentage: f64,

    /// True only when a budget is set and spending exceeds it
    pub over_budget: bool,

    pub level: BudgetLevel,
}

/// Expense total for one category, used for the breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,

    pub total: f64,

    /// This category's share of all expense in scope, in percent
    pub share: f64,
}
