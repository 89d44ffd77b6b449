use crate::errors::CoreError;
use crate::models::transaction::Transaction;

use super::traits::KeyValueStore;

/// Result of reading one key: absent, decoded, or present but undecodable.
#[derive(Debug)]
pub enum Loaded<T> {
    Missing,
    Value(T),
    Unparseable(CoreError),
}

/// Encodes ledger state into string values and moves it in and out of a
/// `KeyValueStore`.
///
/// Transactions are stored as one JSON array (full overwrite per save);
/// the budget as a plain decimal string.
pub struct StorageManager;

impl StorageManager {
    /// Serialize the whole collection to a JSON array.
    pub fn encode_transactions(transactions: &[Transaction]) -> Result<String, CoreError> {
        serde_json::to_string(transactions)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize transactions: {e}")))
    }

    /// Parse a JSON array of transactions.
    pub fn decode_transactions(text: &str) -> Result<Vec<Transaction>, CoreError> {
        serde_json::from_str(text)
            .map_err(|e| CoreError::Deserialization(format!("Failed to parse transactions: {e}")))
    }

    /// Render the budget the way it is persisted (`50000`, `1234.5`).
    pub fn encode_budget(budget: f64) -> String {
        budget.to_string()
    }

    /// Parse a persisted budget. Only finite numbers are accepted.
    pub fn decode_budget(text: &str) -> Result<f64, CoreError> {
        let value: f64 = text.trim().parse().map_err(|e| {
            CoreError::Deserialization(format!("Invalid budget value '{text}': {e}"))
        })?;
        if !value.is_finite() {
            return Err(CoreError::Deserialization(format!(
                "Invalid budget value '{text}': not a finite number"
            )));
        }
        Ok(value)
    }

    /// Read the transaction collection stored under `key`. An empty value
    /// counts as missing. Store failures propagate; decoding failures
    /// (including records that do not match the schema) are `Unparseable`.
    pub fn load_transactions<S: KeyValueStore + ?Sized>(
        store: &S,
        key: &str,
    ) -> Result<Loaded<Vec<Transaction>>, CoreError> {
        let loaded = match store.get(key)? {
            None => Loaded::Missing,
            Some(text) if text.trim().is_empty() => Loaded::Missing,
            Some(text) => match Self::decode_transactions(&text) {
                Ok(transactions) => Loaded::Value(transactions),
                Err(e) => Loaded::Unparseable(e),
            },
        };
        Ok(loaded)
    }

    /// Overwrite the collection stored under `key`.
    pub fn save_transactions<S: KeyValueStore + ?Sized>(
        store: &mut S,
        key: &str,
        transactions: &[Transaction],
    ) -> Result<(), CoreError> {
        let text = Self::encode_transactions(transactions)?;
        store.set(key, &text)?;
        tracing::debug!(key, count = transactions.len(), bytes = text.len(), "saved transactions");
        Ok(())
    }

    /// Read the budget stored under `key`. An empty value counts as missing.
    pub fn load_budget<S: KeyValueStore + ?Sized>(
        store: &S,
        key: &str,
    ) -> Result<Loaded<f64>, CoreError> {
        let loaded = match store.get(key)? {
            None => Loaded::Missing,
            Some(text) if text.trim().is_empty() => Loaded::Missing,
            Some(text) => match Self::decode_budget(&text) {
                Ok(budget) => Loaded::Value(budget),
                Err(e) => Loaded::Unparseable(e),
            },
        };
        Ok(loaded)
    }

    /// Overwrite the budget stored under `key`.
    pub fn save_budget<S: KeyValueStore + ?Sized>(
        store: &mut S,
        key: &str,
        budget: f64,
    ) -> Result<(), CoreError> {
        store.set(key, &Self::encode_budget(budget))?;
        tracing::debug!(key, budget, "saved budget");
        Ok(())
    }
}
