use crate::errors::CoreError;
use crate::models::transaction::{NewTransaction, Transaction, TransactionPatch};

/// Mutates the in-memory transaction collection (add, remove, patch).
///
/// Pure business logic: no persistence, no I/O. The collection is kept
/// newest-first, so new entries go to the front.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Validate `new`, give it a fresh id and prepend it. Returns the id.
    pub fn insert_new(
        &self,
        transactions: &mut Vec<Transaction>,
        new: NewTransaction,
    ) -> Result<String, CoreError> {
        self.validate_fields(new.amount, &new.category)?;
        let transaction = Transaction::from_new(new);
        let id = transaction.id.clone();
        transactions.insert(0, transaction);
        Ok(id)
    }

    /// Drop every record with `id`. Returns whether anything was removed.
    pub fn remove(&self, transactions: &mut Vec<Transaction>, id: &str) -> bool {
        let before = transactions.len();
        transactions.retain(|t| t.id != id);
        transactions.len() != before
    }

    /// Merge `patch` onto the record with `id`, in place.
    ///
    /// Returns `Ok(false)` when no record matches. The merged record is
    /// validated before it replaces the stored one, so a rejected patch
    /// leaves the collection untouched.
    pub fn apply_patch(
        &self,
        transactions: &mut [Transaction],
        id: &str,
        patch: TransactionPatch,
    ) -> Result<bool, CoreError> {
        let Some(existing) = transactions.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };

        let mut updated = existing.clone();
        updated.apply(patch);
        self.validate_transaction(&updated)?;
        *existing = updated;
        Ok(true)
    }

    /// Check the invariants a stored record must satisfy.
    pub fn validate_transaction(&self, transaction: &Transaction) -> Result<(), CoreError> {
        self.validate_fields(transaction.amount, &transaction.category)
    }

    /// The budget ceiling must be a finite, non-negative number (0 = unset).
    pub fn validate_budget(&self, budget: f64) -> Result<(), CoreError> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Budget must be a non-negative number, got {budget}"
            )));
        }
        Ok(())
    }

    /// Rules:
    /// - Amount must be finite and not negative
    /// - Category must not be blank
    fn validate_fields(&self, amount: f64, category: &str) -> Result<(), CoreError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Transaction amount must be a non-negative number, got {amount}"
            )));
        }
        if category.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Transaction category must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
