use crate::errors::CoreError;

/// Port to a durable, synchronous key-value store holding string values.
///
/// The ledger only ever talks to persistence through this trait, so the
/// backing store can be a JSON file, browser local storage behind a wasm
/// binding, or an in-memory map in tests.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if it was never set.
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Overwrite the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        (**self).set(key, value)
    }
}
