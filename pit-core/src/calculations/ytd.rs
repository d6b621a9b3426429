//! Year-to-date re-derivation from raw data.

use rust_decimal::Decimal;

use crate::calculations::engine::TaxEngine;
use crate::calculations::expenses::ExpenseAggregator;
use crate::calculations::income::IncomeAggregator;
use crate::error::ComputeError;
use crate::models::{TaxRegime, TaxSettings};

/// Cumulative figures of the months strictly before a given month.
/// Values are unrounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtdPrior {
    /// Recognized gross income (local currency) of the prior months.
    pub income: Decimal,

    /// Sum of the prior months' taxable bases under the live regime rule.
    pub tax_base: Decimal,

    /// Cumulative base on the scale the tax brackets operate on: the
    /// allowance-adjusted base for PROGRESSIVE, the taxable base for FLAT,
    /// gross income for LUMPSUM. Feed this into
    /// [`TaxEngine::pit_for_month`] / [`TaxEngine::annual_pit`].
    pub engine_base: Decimal,
}

impl YtdPrior {
    pub fn zero() -> Self {
        Self {
            income: Decimal::ZERO,
            tax_base: Decimal::ZERO,
            engine_base: Decimal::ZERO,
        }
    }
}

/// Re-derives cumulative income and taxable base before a month.
///
/// Always recomputes from the raw income/expense events, never from cached
/// engine outputs, so any month can be calculated in isolation. The window
/// is months `1..month` of the same calendar year — YTD state resets every
/// January and never crosses a year boundary.
#[derive(Clone)]
pub struct YtdAccumulator {
    income: IncomeAggregator,
    expenses: ExpenseAggregator,
}

impl YtdAccumulator {
    pub fn new(income: IncomeAggregator, expenses: ExpenseAggregator) -> Self {
        Self { income, expenses }
    }

    /// Accumulates months `1..month` (exclusive upper bound) of `year`.
    pub async fn accumulate(
        &self,
        engine: &TaxEngine<'_>,
        settings: &TaxSettings,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<YtdPrior, ComputeError> {
        let mut prior = YtdPrior::zero();

        for m in 1..month.min(13) {
            let income = self.income.aggregate(taxpayer_id, year, m).await?;
            let expenses = self.expenses.aggregate(taxpayer_id, year, m).await?;

            let base = engine.monthly_tax_base(
                settings.regime,
                income.gross_income,
                expenses.deductible_expenses,
            );

            prior.income += income.gross_income;
            prior.tax_base += base;
            prior.engine_base += match settings.regime {
                TaxRegime::Progressive => engine.progressive_adjusted_base(base),
                TaxRegime::Flat | TaxRegime::LumpSum => base,
            };
        }

        Ok(prior)
    }
}
