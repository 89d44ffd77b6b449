use chrono::NaiveDate;

use crate::models::transaction::Transaction;

/// Column labels of the exported CSV (ID, date, amount, type, category, memo).
pub const CSV_HEADERS: [&str; 6] = ["ID", "日付", "金額", "種類", "カテゴリ", "メモ"];

/// Renders the ledger as CSV text for download.
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Build the CSV text: header row, then one row per transaction in
    /// collection order, joined by `\n` with no trailing newline.
    ///
    /// The memo column is always double-quoted (even when empty); the type
    /// column carries the Japanese label instead of the raw discriminant.
    pub fn to_csv(&self, transactions: &[Transaction]) -> String {
        let mut lines = Vec::with_capacity(transactions.len() + 1);
        lines.push(CSV_HEADERS.join(","));
        lines.extend(transactions.iter().map(Self::row));
        lines.join("\n")
    }

    /// `transactions_<YYYY-MM-DD>.csv` for an export taken on `date`.
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("transactions_{}.csv", date.format("%Y-%m-%d"))
    }

    fn row(t: &Transaction) -> String {
        let note = t.note.as_deref().unwrap_or("");
        format!(
            "{},{},{},{},{},\"{}\"",
            escape_field(&t.id),
            t.date.format("%Y-%m-%d"),
            t.amount,
            t.transaction_type.label(),
            escape_field(&t.category),
            note.replace('"', "\"\""),
        )
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote a field only if it contains a comma, quote or line break.
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
