use async_trait::async_trait;

use super::ProviderError;
use crate::models::{ExpenseEvent, IncomeEvent};

/// Read-only access to the income events of a period.
#[async_trait]
pub trait IncomeSource: Send + Sync {
    /// Income events for `(year, month)`, each carrying its `recognized`
    /// flag. An empty period yields an empty vec, not an error.
    async fn income_events(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<IncomeEvent>, ProviderError>;
}

/// Read-only access to the expense events of a period.
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    async fn expense_events(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<ExpenseEvent>, ProviderError>;
}
