//! Recognized-income aggregation with currency normalization.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ComputeError;
use crate::models::{IncomeItem, LOCAL_CURRENCY};
use crate::providers::{CurrencyConverter, IncomeSource};

/// Recognized income of one period, normalized to the local currency.
/// Values are unrounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeSummary {
    pub items: Vec<IncomeItem>,
    pub gross_income: Decimal,
}

impl IncomeSummary {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            gross_income: Decimal::ZERO,
        }
    }
}

/// Sums recognized income for a period.
///
/// Foreign-currency amounts are converted at each event's original
/// transaction date. Conversion failure aborts the whole period: a month
/// with unconvertible foreign income has no result rather than a silently
/// understated one.
#[derive(Clone)]
pub struct IncomeAggregator {
    source: Arc<dyn IncomeSource>,
    converter: Arc<dyn CurrencyConverter>,
}

impl IncomeAggregator {
    pub fn new(source: Arc<dyn IncomeSource>, converter: Arc<dyn CurrencyConverter>) -> Self {
        Self { source, converter }
    }

    pub async fn aggregate(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<IncomeSummary, ComputeError> {
        let events = self.source.income_events(taxpayer_id, year, month).await?;

        // The converter may be a slow external lookup; conversion is linear,
        // so one unit-rate fetch per (currency, date) covers the whole run.
        let mut unit_rates: HashMap<(String, NaiveDate), Decimal> = HashMap::new();

        let mut summary = IncomeSummary::empty();
        for event in events.into_iter().filter(|e| e.recognized) {
            let local_amount = if event.currency == LOCAL_CURRENCY {
                event.amount
            } else {
                let key = (event.currency.clone(), event.transaction_date);
                let unit_rate = match unit_rates.get(&key).copied() {
                    Some(rate) => rate,
                    None => {
                        let rate = self
                            .converter
                            .to_local(Decimal::ONE, &event.currency, event.transaction_date)
                            .await?;
                        unit_rates.insert(key, rate);
                        rate
                    }
                };
                event.amount * unit_rate
            };

            summary.gross_income += local_amount;
            summary.items.push(IncomeItem {
                id: event.id,
                original_amount: event.amount,
                currency: event.currency,
                local_amount,
                label: event.label,
            });
        }

        debug!(
            taxpayer_id,
            year,
            month,
            items = summary.items.len(),
            gross_income = %summary.gross_income,
            "aggregated recognized income"
        );
        Ok(summary)
    }
}
