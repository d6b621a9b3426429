use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency every calculation is normalized into.
pub const LOCAL_CURRENCY: &str = "PLN";

/// A single income event as delivered by the invoicing side.
///
/// `recognized` is computed by the source: the underlying invoice is issued
/// and sent or paid, and not archived, a draft, or cancelled. Amounts keep
/// their original currency; normalization happens in the income aggregator
/// using the event's `transaction_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEvent {
    pub id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_date: NaiveDate,
    pub recognized: bool,
    pub label: String,
}

/// One recognized income position after currency normalization.
/// Derived per calculation run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeItem {
    pub id: i64,
    pub original_amount: Decimal,
    pub currency: String,
    pub local_amount: Decimal,
    pub label: String,
}

/// A single expense event for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseEvent {
    pub net_amount: Decimal,
    /// Deductible share of the net amount, in percent. Valid range [0, 100].
    pub deductible_percent: Decimal,
    pub is_deductible: bool,
    pub local_amount: Decimal,
}
