//! Expense aggregation for a period.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::ComputeError;
use crate::providers::ExpenseSource;

/// Expense totals of one period. Values are unrounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseSummary {
    /// Sum of every expense's local amount, deductible or not.
    pub total_expenses: Decimal,
    /// Sum of `net_amount × deductible_percent / 100` over deductible items.
    pub deductible_expenses: Decimal,
}

impl ExpenseSummary {
    fn empty() -> Self {
        Self {
            total_expenses: Decimal::ZERO,
            deductible_expenses: Decimal::ZERO,
        }
    }
}

/// Sums total and deductible expenses for a period.
#[derive(Clone)]
pub struct ExpenseAggregator {
    source: Arc<dyn ExpenseSource>,
}

impl ExpenseAggregator {
    pub fn new(source: Arc<dyn ExpenseSource>) -> Self {
        Self { source }
    }

    pub async fn aggregate(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<ExpenseSummary, ComputeError> {
        let events = self.source.expense_events(taxpayer_id, year, month).await?;

        let mut summary = ExpenseSummary::empty();
        for event in events {
            summary.total_expenses += event.local_amount;

            if event.is_deductible {
                let percent = clamp_percent(event.deductible_percent);
                summary.deductible_expenses += event.net_amount * percent / Decimal::ONE_HUNDRED;
            }
        }
        Ok(summary)
    }
}

fn clamp_percent(percent: Decimal) -> Decimal {
    if percent < Decimal::ZERO {
        warn!(%percent, "negative deductible percentage clamped to 0");
        Decimal::ZERO
    } else if percent > Decimal::ONE_HUNDRED {
        warn!(%percent, "deductible percentage above 100 clamped to 100");
        Decimal::ONE_HUNDRED
    } else {
        percent
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::ExpenseEvent;
    use crate::providers::MemoryProviders;

    fn expense(net: Decimal, percent: Decimal, deductible: bool) -> ExpenseEvent {
        ExpenseEvent {
            net_amount: net,
            deductible_percent: percent,
            is_deductible: deductible,
            local_amount: net,
        }
    }

    #[tokio::test]
    async fn empty_period_sums_to_zero() {
        let providers = Arc::new(MemoryProviders::new());
        let aggregator = ExpenseAggregator::new(providers);

        let summary = aggregator.aggregate(1, 2025, 3).await.unwrap();

        assert_eq!(summary, ExpenseSummary::empty());
    }

    #[tokio::test]
    async fn total_includes_non_deductible_expenses() {
        let providers = Arc::new(MemoryProviders::new());
        providers.add_expense_event(1, 2025, 3, expense(dec!(1000), dec!(100), true));
        providers.add_expense_event(1, 2025, 3, expense(dec!(500), dec!(0), false));
        let aggregator = ExpenseAggregator::new(providers);

        let summary = aggregator.aggregate(1, 2025, 3).await.unwrap();

        assert_eq!(summary.total_expenses, dec!(1500));
        assert_eq!(summary.deductible_expenses, dec!(1000));
    }

    #[tokio::test]
    async fn partial_deductibility_scales_the_net_amount() {
        let providers = Arc::new(MemoryProviders::new());
        // Typical car-expense case: 75% of net is deductible.
        providers.add_expense_event(1, 2025, 3, expense(dec!(2000), dec!(75), true));
        let aggregator = ExpenseAggregator::new(providers);

        let summary = aggregator.aggregate(1, 2025, 3).await.unwrap();

        assert_eq!(summary.deductible_expenses, dec!(1500));
    }

    #[tokio::test]
    async fn deductible_flag_off_ignores_percentage() {
        let providers = Arc::new(MemoryProviders::new());
        providers.add_expense_event(1, 2025, 3, expense(dec!(2000), dec!(100), false));
        let aggregator = ExpenseAggregator::new(providers);

        let summary = aggregator.aggregate(1, 2025, 3).await.unwrap();

        assert_eq!(summary.total_expenses, dec!(2000));
        assert_eq!(summary.deductible_expenses, dec!(0));
    }

    #[tokio::test]
    async fn out_of_range_percentages_are_clamped() {
        let providers = Arc::new(MemoryProviders::new());
        providers.add_expense_event(1, 2025, 3, expense(dec!(1000), dec!(150), true));
        providers.add_expense_event(1, 2025, 3, expense(dec!(1000), dec!(-10), true));
        let aggregator = ExpenseAggregator::new(providers);

        let summary = aggregator.aggregate(1, 2025, 3).await.unwrap();

        assert_eq!(summary.deductible_expenses, dec!(1000));
    }
}
