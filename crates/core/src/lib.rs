pub mod errors;
pub mod format;
pub mod models;
pub mod services;
pub mod storage;

use models::{
    analytics::{BudgetStatus, CategoryTotal, MonthlyStats},
    settings::LedgerConfig,
    transaction::{NewTransaction, Transaction, TransactionPatch},
};
use services::{
    export_service::ExportService, ledger_service::LedgerService,
    summary_service::SummaryService,
};
use storage::manager::{Loaded, StorageManager};
use storage::traits::KeyValueStore;

use errors::CoreError;

/// Main entry point for the household budget core library.
///
/// Owns the ledger (newest-first), the budget ceiling and the store they are
/// persisted to. Every mutation is written through to the store before the
/// call returns.
#[must_use]
pub struct HouseholdLedger<S: KeyValueStore> {
    store: S,
    config: LedgerConfig,
    transactions: Vec<Transaction>,
    budget: f64,
    /// True until the initial load has run. Contents are not meaningful before.
    loading: bool,
    ledger_service: LedgerService,
    summary_service: SummaryService,
    export_service: ExportService,
}

impl<S: KeyValueStore> std::fmt::Debug for HouseholdLedger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HouseholdLedger")
            .field("transactions", &self.transactions.len())
            .field("budget", &self.budget)
            .field("loading", &self.loading)
            .field("config", &self.config)
            .finish()
    }
}

impl<S: KeyValueStore> HouseholdLedger<S> {
    /// Wrap `store` without reading it yet. The ledger stays in the loading
    /// state until `load()` is called.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            transactions: Vec::new(),
            budget: 0.0,
            loading: true,
            ledger_service: LedgerService::new(),
            summary_service: SummaryService::new(),
            export_service: ExportService::new(),
        }
    }

    /// Create a ledger over `store` and run the initial load.
    pub fn open(store: S, config: LedgerConfig) -> Result<Self, CoreError> {
        let mut ledger = Self::new(store, config);
        ledger.load()?;
        Ok(ledger)
    }

    /// Read the persisted state. Runs once; later calls do nothing.
    ///
    /// - Stored transactions that fail to parse are logged and replaced by an
    ///   empty ledger (the stored value is left as is until the next write).
    ///   A record that is valid JSON but does not match the schema (e.g. a
    ///   date that is not `YYYY-MM-DD`) makes the whole collection unparseable.
    /// - No stored transactions, or an empty stored value: the configured
    ///   seed is adopted and written.
    /// - The budget is read independently and defaults to 0.
    ///
    /// Only failures of the store itself are returned.
    pub fn load(&mut self) -> Result<(), CoreError> {
        if !self.loading {
            return Ok(());
        }

        let key = &self.config.transactions_key;
        match StorageManager::load_transactions(&self.store, key)? {
            Loaded::Value(transactions) => {
                tracing::debug!(count = transactions.len(), "loaded transactions");
                self.transactions = transactions;
            }
            Loaded::Unparseable(e) => {
                tracing::warn!(key = %key, error = %e, "failed to parse stored transactions, starting empty");
                self.transactions = Vec::new();
            }
            Loaded::Missing => match self.config.seed_if_empty.clone() {
                Some(seed) => {
                    tracing::info!(count = seed.len(), "no stored transactions, seeding sample data");
                    StorageManager::save_transactions(&mut self.store, key, &seed)?;
                    self.transactions = seed;
                }
                None => self.transactions = Vec::new(),
            },
        }

        let budget_key = &self.config.budget_key;
        match StorageManager::load_budget(&self.store, budget_key)? {
            Loaded::Value(budget) => self.budget = budget,
            Loaded::Unparseable(e) => {
                tracing::warn!(key = %budget_key, error = %e, "ignoring unparseable stored budget");
            }
            Loaded::Missing => {}
        }

        self.loading = false;
        Ok(())
    }

    // ── Transaction Management ──────────────────────────────────────

    /// Record a new transaction at the front of the ledger.
    /// Returns the generated id.
    pub fn add(&mut self, new: NewTransaction) -> Result<String, CoreError> {
        let id = self
            .ledger_service
            .insert_new(&mut self.transactions, new)?;
        self.persist_transactions()?;
        Ok(id)
    }

    /// Remove the transaction with `id`. Returns `false` if there was none;
    /// an unknown id is not an error. The ledger is written either way.
    pub fn delete(&mut self, id: &str) -> Result<bool, CoreError> {
        let removed = self.ledger_service.remove(&mut self.transactions, id);
        self.persist_transactions()?;
        Ok(removed)
    }

    /// Overwrite the fields named in `patch` on the transaction with `id`.
    /// Returns `false` if there was none. The ledger is written either way.
    pub fn update(&mut self, id: &str, patch: TransactionPatch) -> Result<bool, CoreError> {
        let updated = self
            .ledger_service
            .apply_patch(&mut self.transactions, id, patch)?;
        self.persist_transactions()?;
        Ok(updated)
    }

    /// All transactions, newest entry first.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Get a single transaction by its ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Transactions dated in `month` (`YYYY-MM`), in ledger order.
    #[must_use]
    pub fn transactions_for_month(&self, month: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| SummaryService::in_month(t, month))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// True until the initial load has completed.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Income, expense and balance for `month` (`YYYY-MM`).
    #[must_use]
    pub fn monthly_summary(&self, month: &str) -> MonthlyStats {
        self.summary_service
            .monthly_summary(&self.transactions, month)
    }

    /// The month's spending measured against the budget ceiling.
    #[must_use]
    pub fn budget_status(&self, month: &str) -> BudgetStatus {
        self.summary_service
            .budget_status(&self.transactions, month, self.budget)
    }

    /// Expense per category, largest first. `None` covers the whole ledger.
    #[must_use]
    pub fn expense_breakdown(&self, month: Option<&str>) -> Vec<CategoryTotal> {
        self.summary_service
            .expense_breakdown(&self.transactions, month)
    }

    // ── Budget ──────────────────────────────────────────────────────

    /// The budget ceiling; 0 means no budget is set.
    #[must_use]
    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Replace the budget ceiling and persist it under its own key.
    pub fn update_budget(&mut self, budget: f64) -> Result<(), CoreError> {
        self.ledger_service.validate_budget(budget)?;
        self.budget = budget;
        StorageManager::save_budget(&mut self.store, &self.config.budget_key, budget)
    }

    // ── Export ──────────────────────────────────────────────────────

    /// The ledger as CSV text, in ledger order.
    #[must_use]
    pub fn export_csv(&self) -> String {
        self.export_service.to_csv(&self.transactions)
    }

    /// File name for an export taken on `date`.
    #[must_use]
    pub fn export_file_name(&self, date: chrono::NaiveDate) -> String {
        self.export_service.file_name(date)
    }

    /// Write the CSV export into `dir` as `transactions_<date>.csv`
    /// (native only, not WASM). Returns the path written.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn export_csv_to_dir(
        &self,
        dir: impl AsRef<std::path::Path>,
        date: chrono::NaiveDate,
    ) -> Result<std::path::PathBuf, CoreError> {
        let path = dir.as_ref().join(self.export_file_name(date));
        std::fs::write(&path, self.export_csv())?;
        tracing::info!(path = %path.display(), rows = self.transactions.len(), "exported CSV");
        Ok(path)
    }

    // ── Store Access ────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The underlying store, e.g. to inspect what was persisted.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, dropping the in-memory ledger.
    pub fn into_store(self) -> S {
        self.store
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Write the whole collection back (full overwrite). Skipped while the
    /// initial load has not run, since the load replaces memory anyway.
    fn persist_transactions(&mut self) -> Result<(), CoreError> {
        if self.loading {
            return Ok(());
        }
        StorageManager::save_transactions(
            &mut self.store,
            &self.config.transactions_key,
            &self.transactions,
        )
    }
}
