use chrono::NaiveDate;
use household_budget_core::errors::CoreError;
use household_budget_core::models::settings::{sample_transactions, LedgerConfig};
use household_budget_core::models::transaction::{
    NewTransaction, Transaction, TransactionPatch, TransactionType,
};
use household_budget_core::storage::file::FileStore;
use household_budget_core::storage::manager::StorageManager;
use household_budget_core::storage::memory::MemoryStore;
use household_budget_core::storage::traits::KeyValueStore;
use household_budget_core::HouseholdLedger;

const KEY: &str = "household_budget_data";
const BUDGET_KEY: &str = "household_budget_limit";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn seeded() -> HouseholdLedger<MemoryStore> {
    HouseholdLedger::open(MemoryStore::new(), LedgerConfig::default()).unwrap()
}

fn empty() -> HouseholdLedger<MemoryStore> {
    HouseholdLedger::open(MemoryStore::new(), LedgerConfig::without_seed()).unwrap()
}

/// What the store currently holds under the transactions key.
fn persisted(ledger: &HouseholdLedger<MemoryStore>) -> Vec<Transaction> {
    let text = ledger.store().get(KEY).unwrap().expect("transactions key is set");
    StorageManager::decode_transactions(&text).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Mock Store (for testing persistence failures)
// ═══════════════════════════════════════════════════════════════════

/// Store whose reads and/or writes can be made to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_reads: bool,
    fail_writes: bool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        if self.fail_reads {
            return Err(CoreError::Storage("store unavailable".into()));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        if self.fail_writes {
            return Err(CoreError::Storage("quota exceeded".into()));
        }
        self.inner.set(key, value)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Initialization
// ═══════════════════════════════════════════════════════════════════

mod initialization {
    use super::*;

    #[test]
    fn new_is_loading_until_load() {
        let mut ledger = HouseholdLedger::new(MemoryStore::new(), LedgerConfig::default());
        assert!(ledger.is_loading());
        assert!(ledger.is_empty());
        ledger.load().unwrap();
        assert!(!ledger.is_loading());
    }

    #[test]
    fn first_run_seeds_sample_and_persists() {
        let ledger = seeded();
        assert!(!ledger.is_loading());
        assert_eq!(ledger.transactions(), sample_transactions().as_slice());
        assert_eq!(persisted(&ledger), sample_transactions());
        assert_eq!(ledger.store().write_count(), 1);
    }

    #[test]
    fn seeding_disabled_starts_empty_without_writing() {
        let ledger = empty();
        assert!(ledger.is_empty());
        assert!(!ledger.store().contains_key(KEY));
        assert_eq!(ledger.store().write_count(), 0);
    }

    #[test]
    fn custom_seed_is_used() {
        let seed = vec![Transaction::with_id(
            "only",
            NewTransaction::income(1.0, d(2024, 1, 1), "賞与"),
        )];
        let ledger = HouseholdLedger::open(
            MemoryStore::new(),
            LedgerConfig::without_seed().with_seed(seed.clone()),
        )
        .unwrap();
        assert_eq!(ledger.transactions(), seed.as_slice());
    }

    #[test]
    fn existing_data_is_adopted_not_seeded() {
        let stored = vec![Transaction::with_id(
            "k",
            NewTransaction::expense(420.0, d(2025, 2, 2), "交通費"),
        )];
        let store = MemoryStore::new()
            .with_value(KEY, StorageManager::encode_transactions(&stored).unwrap());
        let ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();
        assert_eq!(ledger.transactions(), stored.as_slice());
        assert_eq!(ledger.store().write_count(), 0);
    }

    #[test]
    fn stored_empty_array_is_not_reseeded() {
        let store = MemoryStore::new().with_value(KEY, "[]");
        let ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn empty_stored_value_is_seeded() {
        let store = MemoryStore::new().with_value(KEY, "");
        let ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();
        assert_eq!(ledger.transactions(), sample_transactions().as_slice());
        assert_eq!(persisted(&ledger), sample_transactions());
        assert_eq!(ledger.store().write_count(), 1);
    }

    #[test]
    fn non_iso_date_record_empties_ledger_until_next_write() {
        let text = r#"[{"id":"1","date":"2024-12-5","amount":5000,"type":"expense","category":"食費"}]"#;
        let store = MemoryStore::new().with_value(KEY, text);
        let ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.store().get(KEY).unwrap().as_deref(), Some(text));
    }

    #[test]
    fn malformed_json_recovers_to_empty() {
        let store = MemoryStore::new().with_value(KEY, "{definitely not json");
        let ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();
        assert!(ledger.is_empty());
        assert!(!ledger.is_loading());
        // The bad value is not overwritten until the next mutation.
        assert_eq!(ledger.store().write_count(), 0);
    }

    #[test]
    fn budget_loaded_independently() {
        let store = MemoryStore::new().with_value(BUDGET_KEY, "80000");
        let ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();
        assert_eq!(ledger.budget(), 80000.0);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn budget_defaults_to_zero() {
        assert_eq!(seeded().budget(), 0.0);
    }

    #[test]
    fn unparseable_budget_defaults_to_zero() {
        let store = MemoryStore::new().with_value(BUDGET_KEY, "a lot");
        let ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();
        assert_eq!(ledger.budget(), 0.0);
    }

    #[test]
    fn load_runs_once() {
        let mut ledger = seeded();
        ledger.add(NewTransaction::expense(1.0, d(2025, 1, 1), "食費")).unwrap();
        ledger.load().unwrap();
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn store_read_failure_propagates() {
        let store = FlakyStore {
            fail_reads: true,
            ..FlakyStore::default()
        };
        let result = HouseholdLedger::open(store, LedgerConfig::default());
        assert!(matches!(result, Err(CoreError::Storage(_))));
    }

    #[test]
    fn custom_keys() {
        let config = LedgerConfig::default().with_keys("tx", "limit");
        let mut ledger = HouseholdLedger::open(MemoryStore::new(), config).unwrap();
        ledger.update_budget(10.0).unwrap();
        assert!(ledger.store().contains_key("tx"));
        assert!(ledger.store().contains_key("limit"));
        assert!(!ledger.store().contains_key(KEY));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Mutations & write-through
// ═══════════════════════════════════════════════════════════════════

mod mutations {
    use super::*;

    #[test]
    fn add_prepends_with_unique_id_and_persists() {
        let mut ledger = seeded();
        let id = ledger
            .add(NewTransaction::expense(1280.0, d(2025, 1, 4), "食費").with_note("パン"))
            .unwrap();

        assert_eq!(ledger.transactions()[0].id, id);
        assert_eq!(ledger.len(), 4);
        let ids: std::collections::HashSet<&str> =
            ledger.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(persisted(&ledger), ledger.transactions());
    }

    #[test]
    fn persisted_amount_matches_memory_bit_for_bit() {
        let mut ledger = empty();
        ledger
            .add(NewTransaction::expense(985690694.6328695, d(2025, 1, 4), "住居費"))
            .unwrap();
        let stored = persisted(&ledger);
        assert_eq!(stored[0].amount.to_bits(), ledger.transactions()[0].amount.to_bits());
    }

    #[test]
    fn add_twice_newest_first() {
        let mut ledger = empty();
        let first = ledger.add(NewTransaction::expense(1.0, d(2025, 1, 1), "食費")).unwrap();
        let second = ledger.add(NewTransaction::expense(2.0, d(2025, 1, 1), "食費")).unwrap();
        assert_eq!(ledger.transactions()[0].id, second);
        assert_eq!(ledger.transactions()[1].id, first);
    }

    #[test]
    fn add_invalid_is_rejected_without_write() {
        let mut ledger = seeded();
        let writes = ledger.store().write_count();
        let result = ledger.add(NewTransaction::expense(-100.0, d(2025, 1, 1), "食費"));
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.store().write_count(), writes);
    }

    #[test]
    fn delete_removes_and_persists() {
        let mut ledger = seeded();
        assert!(ledger.delete("1").unwrap());
        assert!(ledger.get("1").is_none());
        assert!(persisted(&ledger).iter().all(|t| t.id != "1"));
    }

    #[test]
    fn delete_unknown_still_writes() {
        let mut ledger = seeded();
        let writes = ledger.store().write_count();
        assert!(!ledger.delete("missing").unwrap());
        assert_eq!(ledger.transactions(), sample_transactions().as_slice());
        assert_eq!(ledger.store().write_count(), writes + 1);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut ledger = seeded();
        ledger.delete("2").unwrap();
        let after_once = ledger.transactions().to_vec();
        ledger.delete("2").unwrap();
        assert_eq!(ledger.transactions(), after_once.as_slice());
    }

    #[test]
    fn update_merges_named_fields() {
        let mut ledger = seeded();
        let patch = TransactionPatch::new()
            .amount(5500.0)
            .note(Some("まとめ買い".into()));
        assert!(ledger.update("1", patch).unwrap());

        let t = ledger.get("1").unwrap();
        assert_eq!(t.amount, 5500.0);
        assert_eq!(t.note.as_deref(), Some("まとめ買い"));
        assert_eq!(t.date, d(2024, 12, 15));
        assert_eq!(t.category, "食費");
        assert_eq!(t.transaction_type, TransactionType::Expense);
        assert_eq!(persisted(&ledger), ledger.transactions());
    }

    #[test]
    fn update_keeps_position() {
        let mut ledger = seeded();
        ledger
            .update("3", TransactionPatch::new().category("賞与"))
            .unwrap();
        assert_eq!(ledger.transactions()[2].id, "3");
        assert_eq!(ledger.transactions()[2].category, "賞与");
    }

    #[test]
    fn update_unknown_is_noop() {
        let mut ledger = seeded();
        assert!(!ledger
            .update("missing", TransactionPatch::new().amount(1.0))
            .unwrap());
        assert_eq!(ledger.transactions(), sample_transactions().as_slice());
    }

    #[test]
    fn update_invalid_leaves_record() {
        let mut ledger = seeded();
        let result = ledger.update("2", TransactionPatch::new().category(""));
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
        assert_eq!(ledger.get("2").unwrap().category, "交通費");
    }

    #[test]
    fn mutation_after_malformed_load_overwrites_bad_value() {
        let store = MemoryStore::new().with_value(KEY, "oops");
        let mut ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();
        ledger.add(NewTransaction::income(1.0, d(2025, 1, 1), "給与")).unwrap();
        assert_eq!(persisted(&ledger).len(), 1);
    }

    #[test]
    fn mutations_before_load_are_not_written() {
        let mut ledger = HouseholdLedger::new(MemoryStore::new(), LedgerConfig::without_seed());
        ledger.add(NewTransaction::income(1.0, d(2025, 1, 1), "給与")).unwrap();
        assert_eq!(ledger.store().write_count(), 0);
    }

    #[test]
    fn write_failure_is_returned() {
        let mut ledger = HouseholdLedger::open(FlakyStore::default(), LedgerConfig::default()).unwrap();
        let mut store = ledger.into_store();
        store.fail_writes = true;
        let mut ledger = HouseholdLedger::open(store, LedgerConfig::default()).unwrap();

        let result = ledger.add(NewTransaction::expense(10.0, d(2025, 1, 1), "食費"));
        assert!(matches!(result, Err(CoreError::Storage(_))));
        // Memory is not rolled back.
        assert_eq!(ledger.len(), 4);

        let result = ledger.update_budget(100.0);
        assert!(matches!(result, Err(CoreError::Storage(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Budget
// ═══════════════════════════════════════════════════════════════════

mod budget {
    use super::*;

    #[test]
    fn update_budget_persists_as_decimal_string() {
        let mut ledger = seeded();
        ledger.update_budget(50000.0).unwrap();
        assert_eq!(ledger.budget(), 50000.0);
        assert_eq!(ledger.store().get(BUDGET_KEY).unwrap().as_deref(), Some("50000"));
    }

    #[test]
    fn update_budget_rejects_negative() {
        let mut ledger = seeded();
        let result = ledger.update_budget(-1.0);
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
        assert_eq!(ledger.budget(), 0.0);
        assert!(!ledger.store().contains_key(BUDGET_KEY));
    }

    #[test]
    fn budget_does_not_touch_transactions_key() {
        let mut ledger = seeded();
        let before = ledger.store().get(KEY).unwrap();
        ledger.update_budget(1.0).unwrap();
        assert_eq!(ledger.store().get(KEY).unwrap(), before);
    }

    #[test]
    fn budget_status_for_sample_month() {
        let mut ledger = seeded();
        ledger.update_budget(10000.0).unwrap();
        let s = ledger.budget_status("2024-12");
        assert_eq!(s.spent, 8000.0);
        assert_eq!(s.remaining, 2000.0);
        assert_eq!(s.percentage, 80.0);
        assert!(!s.over_budget);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Queries, summaries and export
// ═══════════════════════════════════════════════════════════════════

mod queries {
    use super::*;

    #[test]
    fn monthly_summary_on_sample() {
        let s = seeded().monthly_summary("2024-12");
        assert_eq!(s.total_income, 200000.0);
        assert_eq!(s.total_expense, 8000.0);
        assert_eq!(s.balance, 192000.0);
    }

    #[test]
    fn monthly_summary_is_pure() {
        let ledger = seeded();
        let writes = ledger.store().write_count();
        let a = ledger.monthly_summary("2024-12");
        let b = ledger.monthly_summary("2024-12");
        assert_eq!(a, b);
        assert_eq!(a.balance, a.total_income - a.total_expense);
        assert_eq!(ledger.store().write_count(), writes);
    }

    #[test]
    fn monthly_summary_empty_month() {
        let s = seeded().monthly_summary("1999-01");
        assert_eq!((s.total_income, s.total_expense, s.balance), (0.0, 0.0, 0.0));
    }

    #[test]
    fn summary_follows_mutations() {
        let mut ledger = seeded();
        ledger.add(NewTransaction::expense(2000.0, d(2024, 12, 31), "光熱費")).unwrap();
        assert_eq!(ledger.monthly_summary("2024-12").total_expense, 10000.0);
        ledger.delete("3").unwrap();
        assert_eq!(ledger.monthly_summary("2024-12").total_income, 0.0);
    }

    #[test]
    fn transactions_for_month() {
        let mut ledger = seeded();
        ledger.add(NewTransaction::expense(1.0, d(2025, 1, 1), "食費")).unwrap();
        let december = ledger.transactions_for_month("2024-12");
        assert_eq!(december.len(), 3);
        assert_eq!(ledger.transactions_for_month("2025-01").len(), 1);
    }

    #[test]
    fn expense_breakdown_scoped_by_month() {
        let mut ledger = seeded();
        ledger.add(NewTransaction::expense(9000.0, d(2025, 1, 3), "住居費")).unwrap();
        let all = ledger.expense_breakdown(None);
        assert_eq!(all[0].category, "住居費");
        let december = ledger.expense_breakdown(Some("2024-12"));
        assert_eq!(december.len(), 2);
        assert_eq!(december[0].category, "食費");
    }

    #[test]
    fn export_single_transaction() {
        let seed = vec![Transaction::with_id(
            "x",
            NewTransaction::expense(100.0, d(2024, 1, 1), "食費"),
        )];
        let ledger = HouseholdLedger::open(
            MemoryStore::new(),
            LedgerConfig::without_seed().with_seed(seed),
        )
        .unwrap();
        let csv = ledger.export_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ID,日付,金額,種類,カテゴリ,メモ");
        assert_eq!(lines[1], "x,2024-01-01,100,支出,食費,\"\"");
    }

    #[test]
    fn export_follows_ledger_order() {
        let mut ledger = seeded();
        let id = ledger.add(NewTransaction::income(5.0, d(2025, 1, 1), "その他")).unwrap();
        let csv = ledger.export_csv();
        let second_line = csv.lines().nth(1).unwrap();
        assert!(second_line.starts_with(&format!("{id},2025-01-01,5,収入,その他,")));
    }

    #[test]
    fn export_to_dir_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = seeded();
        let path = ledger.export_csv_to_dir(dir.path(), d(2025, 1, 2)).unwrap();
        assert_eq!(path, dir.path().join("transactions_2025-01-02.csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ledger.export_csv());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Full Integration Test (file-backed store, reopen)
// ═══════════════════════════════════════════════════════════════════

mod file_backed {
    use super::*;

    #[test]
    fn full_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut ledger =
            HouseholdLedger::open(FileStore::open(&path).unwrap(), LedgerConfig::default()).unwrap();
        let id = ledger
            .add(NewTransaction::expense(3200.0, d(2024, 12, 28), "交際費・娯楽").with_note("忘年会"))
            .unwrap();
        ledger.delete("2").unwrap();
        ledger
            .update("1", TransactionPatch::new().amount(4800.0))
            .unwrap();
        ledger.update_budget(60000.0).unwrap();
        let expected = ledger.transactions().to_vec();
        drop(ledger);

        let reopened =
            HouseholdLedger::open(FileStore::open(&path).unwrap(), LedgerConfig::default()).unwrap();
        assert_eq!(reopened.transactions(), expected.as_slice());
        assert_eq!(reopened.transactions()[0].id, id);
        assert_eq!(reopened.budget(), 60000.0);

        let s = reopened.monthly_summary("2024-12");
        assert_eq!(s.total_expense, 8000.0);
        assert_eq!(s.total_income, 200000.0);
    }

    #[test]
    fn corrupt_transactions_value_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"household_budget_data":"[not json"}"#).unwrap();

        let ledger =
            HouseholdLedger::open(FileStore::open(&path).unwrap(), LedgerConfig::default()).unwrap();
        assert!(ledger.is_empty());
    }
}
