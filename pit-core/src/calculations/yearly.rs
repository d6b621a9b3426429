//! Yearly aggregation of monthly results.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::calculations::monthly::MonthlyResultBuilder;
use crate::error::{ComputeError, MonthFailure};
use crate::models::{MonthlyTaxResult, YearlySummary, YearlyTotals};

/// Drives the [`MonthlyResultBuilder`] across the months of a year.
///
/// Each month re-derives its own year-to-date state, so months are
/// logically independent; they are computed and assembled in increasing
/// order for presentation. If any month fails, the whole summary is
/// withheld and the error names every failing month — a partial total is
/// never reported.
#[derive(Clone)]
pub struct YearlyAggregator {
    builder: MonthlyResultBuilder,
}

impl YearlyAggregator {
    pub fn new(builder: MonthlyResultBuilder) -> Self {
        Self { builder }
    }

    /// Computes months `1..=min(12, through_month)`.
    pub async fn build_year(
        &self,
        taxpayer_id: i64,
        year: i32,
        through_month: u32,
    ) -> Result<YearlySummary, ComputeError> {
        let last_month = through_month.clamp(1, 12);

        let mut months = Vec::with_capacity(last_month as usize);
        let mut failures = Vec::new();
        for month in 1..=last_month {
            match self.builder.build(taxpayer_id, year, month).await {
                Ok(result) => months.push(result),
                Err(err) => failures.push(MonthFailure {
                    month,
                    reason: err.to_string(),
                }),
            }
        }

        if !failures.is_empty() {
            return Err(ComputeError::YearIncomplete { year, failures });
        }

        let totals = sum_months(&months);
        Ok(YearlySummary {
            year,
            months,
            totals,
        })
    }
}

/// Field-wise sum of already-rounded monthly results. The effective rate is
/// recomputed from the summed figures, never averaged across months.
fn sum_months(months: &[MonthlyTaxResult]) -> YearlyTotals {
    let mut totals = YearlyTotals {
        gross_income: Decimal::ZERO,
        total_expenses: Decimal::ZERO,
        deductible_expenses: Decimal::ZERO,
        tax_base: Decimal::ZERO,
        pit: Decimal::ZERO,
        zus: Decimal::ZERO,
        health_insurance: Decimal::ZERO,
        total_tax_due: Decimal::ZERO,
        net_income: Decimal::ZERO,
        effective_tax_rate: Decimal::ZERO,
    };

    for month in months {
        totals.gross_income += month.gross_income;
        totals.total_expenses += month.total_expenses;
        totals.deductible_expenses += month.deductible_expenses;
        totals.tax_base += month.tax_base;
        totals.pit += month.pit;
        totals.zus += month.zus;
        totals.health_insurance += month.health_insurance;
        totals.total_tax_due += month.total_tax_due;
        totals.net_income += month.net_income;
    }

    if !totals.gross_income.is_zero() {
        totals.effective_tax_rate =
            round_half_up(totals.total_tax_due / totals.gross_income * Decimal::ONE_HUNDRED);
    }

    totals
}
