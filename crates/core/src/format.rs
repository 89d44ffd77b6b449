//! Display formatting for amounts, in the ja-JP yen style (`￥1,234`).

use crate::models::transaction::{Transaction, TransactionType};

/// Fullwidth yen sign, as rendered by the ja-JP locale.
pub const YEN_SIGN: char = '￥';

/// Format `amount` as whole yen with thousands separators.
///
/// Rounds half away from zero; negatives get a leading `-`.
/// Non-finite input renders as `￥NaN` / `￥∞`.
pub fn format_jpy(amount: f64) -> String {
    if amount.is_nan() {
        return format!("{YEN_SIGN}NaN");
    }
    if amount.is_infinite() {
        let sign = if amount < 0.0 { "-" } else { "" };
        return format!("{sign}{YEN_SIGN}∞");
    }

    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{YEN_SIGN}{}", group_thousands(rounded.abs() as u128))
}

/// Amount with the direction sign used in transaction lists:
/// `+￥200,000` for income, `-￥5,000` for expense.
pub fn signed_jpy(transaction: &Transaction) -> String {
    let sign = match transaction.transaction_type {
        TransactionType::Income => '+',
        TransactionType::Expense => '-',
    };
    format!("{sign}{}", format_jpy(transaction.amount))
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
