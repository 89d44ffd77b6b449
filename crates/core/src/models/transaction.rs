use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether money came in or went out. Determines the sign in every aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received (salary, bonus, ...)
    Income,
    /// Money spent
    Expense,
}

impl TransactionType {
    /// Japanese display label, as used in the CSV export and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "収入",
            TransactionType::Expense => "支出",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "収入" => Ok(TransactionType::Income),
            "expense" | "支出" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{other}' (expected income or expense)")),
        }
    }
}

/// One ledger entry.
///
/// The JSON shape is the persisted format: `id`, `date` (`YYYY-MM-DD`),
/// `amount`, `type`, `category` and an optional `note`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, immutable after creation
    pub id: String,

    /// Calendar date (no time component)
    pub date: NaiveDate,

    /// Non-negative magnitude; the sign comes from `transaction_type`
    pub amount: f64,

    /// Income or expense
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Free-form category label (e.g. "食費")
    pub category: String,

    /// Optional free-text memo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    /// Build a record with a freshly generated id.
    pub fn from_new(new: NewTransaction) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), new)
    }

    /// Build a record with a caller-chosen id (sample data, imports).
    pub fn with_id(id: impl Into<String>, new: NewTransaction) -> Self {
        Self {
            id: id.into(),
            date: new.date,
            amount: new.amount,
            transaction_type: new.transaction_type,
            category: new.category,
            note: new.note,
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// True if the ISO date text starts with `prefix` (typically `YYYY-MM`).
    pub fn date_starts_with(&self, prefix: &str) -> bool {
        self.date.format("%Y-%m-%d").to_string().starts_with(prefix)
    }

    /// Merge the fields named in `patch` onto this record. The id never changes.
    pub fn apply(&mut self, patch: TransactionPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(transaction_type) = patch.transaction_type {
            self.transaction_type = transaction_type;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(note) = patch.note {
            self.note = note;
        }
    }
}

/// A transaction as submitted by the caller, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn new(
        transaction_type: TransactionType,
        amount: f64,
        date: NaiveDate,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            transaction_type,
            category: category.into(),
            note: None,
        }
    }

    /// Shorthand for an expense entry.
    pub fn expense(amount: f64, date: NaiveDate, category: impl Into<String>) -> Self {
        Self::new(TransactionType::Expense, amount, date, category)
    }

    /// Shorthand for an income entry.
    pub fn income(amount: f64, date: NaiveDate, category: impl Into<String>) -> Self {
        Self::new(TransactionType::Income, amount, date, category)
    }

    /// Attach a memo. Empty strings are stored as no note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.is_empty() { None } else { Some(note) };
        self
    }
}

/// Partial update. `None` leaves the field untouched.
///
/// `note` is doubly optional: `Some(None)` clears the memo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub note: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = Some(note);
        self
    }

    /// True if no field is named.
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.transaction_type.is_none()
            && self.category.is_none()
            && self.note.is_none()
    }
}
