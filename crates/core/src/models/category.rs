use serde::{Deserialize, Serialize};

use super::transaction::TransactionType;

/// A named category offered when entering a transaction.
///
/// The ledger itself does not enforce categories: `Transaction::category`
/// is free text. These are the suggestions a front end presents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,

    pub name: String,

    /// Which side of the ledger this category belongs to
    #[serde(rename = "type")]
    pub category_type: TransactionType,

    /// Optional UI colour, e.g. "#10B981"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, category_type: TransactionType) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            category_type,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Built-in expense categories, default first.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "食費",
    "交通費",
    "光熱費",
    "交際費・娯楽",
    "住居費",
    "医療費",
    "教育・教養",
    "その他",
];

/// Built-in income categories, default first.
pub const INCOME_CATEGORIES: &[&str] = &["給与", "賞与", "副業・投資", "その他"];

/// Palette cycled through by the expense breakdown chart.
pub const CHART_COLORS: &[&str] = &[
    "#10B981", "#3B82F6", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#6366F1", "#64748B",
];

/// Category names offered for a transaction type.
pub fn category_names(transaction_type: TransactionType) -> &'static [&'static str] {
    match transaction_type {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}

/// The category preselected when the type is chosen.
pub fn default_category(transaction_type: TransactionType) -> &'static str {
    category_names(transaction_type)[0]
}

/// Built-in categories for a type, with chart colours assigned in order.
pub fn builtin_categories(transaction_type: TransactionType) -> Vec<Category> {
    category_names(transaction_type)
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Category::new(*name, transaction_type).with_color(chart_color(i))
        })
        .collect()
}

/// Colour for the i-th slice of a chart, wrapping around the palette.
pub fn chart_color(index: usize) -> &'static str {
    CHART_COLORS[index % CHART_COLORS.len()]
}
