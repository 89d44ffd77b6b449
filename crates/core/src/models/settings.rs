use chrono::NaiveDate;

use super::transaction::{NewTransaction, Transaction};

/// Storage key holding the JSON-encoded transaction collection.
pub const DEFAULT_TRANSACTIONS_KEY: &str = "household_budget_data";

/// Storage key holding the budget ceiling as a decimal string.
pub const DEFAULT_BUDGET_KEY: &str = "household_budget_limit";

/// Configuration of a `HouseholdLedger`: where it persists and how it seeds.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Key for the transaction collection
    pub transactions_key: String,

    /// Key for the budget ceiling
    pub budget_key: String,

    /// Collection adopted (and written back) when the store has no
    /// transactions yet. `None` starts from an empty ledger without writing.
    pub seed_if_empty: Option<Vec<Transaction>>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            transactions_key: DEFAULT_TRANSACTIONS_KEY.to_string(),
            budget_key: DEFAULT_BUDGET_KEY.to_string(),
            seed_if_empty: Some(sample_transactions()),
        }
    }
}

impl LedgerConfig {
    /// Default keys, no seeding.
    pub fn without_seed() -> Self {
        Self {
            seed_if_empty: None,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: Vec<Transaction>) -> Self {
        self.seed_if_empty = Some(seed);
        self
    }

    pub fn with_keys(mut self, transactions_key: impl Into<String>, budget_key: impl Into<String>) -> Self {
        self.transactions_key = transactions_key.into();
        self.budget_key = budget_key.into();
        self
    }
}

/// The three example entries written on first run.
pub fn sample_transactions() -> Vec<Transaction> {
    // The dates are fixed literals; from_ymd_opt cannot fail for them.
    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 12, d).unwrap_or_default();
    vec![
        Transaction::with_id(
            "1",
            NewTransaction::expense(5000.0, day(15), "食費").with_note("スーパーで買い物"),
        ),
        Transaction::with_id(
            "2",
            NewTransaction::expense(3000.0, day(20), "交通費").with_note("電車代"),
        ),
        Transaction::with_id(
            "3",
            NewTransaction::income(200_000.0, day(25), "給与").with_note("12月分給与"),
        ),
    ]
}
