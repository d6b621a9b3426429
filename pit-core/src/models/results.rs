use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IncomeItem, TaxSettings};

/// Full tax picture of one month.
///
/// All monetary fields carry exactly two decimal places; the
/// `MonthlyResultBuilder` is the only place that rounds. The `ytd_*`
/// fields are cumulative through and including this month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTaxResult {
    pub year: i32,
    pub month: u32,

    pub income_items: Vec<IncomeItem>,
    /// Recognized income for the month, in local currency.
    pub gross_income: Decimal,

    pub total_expenses: Decimal,
    pub deductible_expenses: Decimal,

    /// Regime-dependent taxable base for the month.
    pub tax_base: Decimal,

    pub pit: Decimal,
    pub zus: Decimal,
    pub health_insurance: Decimal,

    /// `pit + zus + health_insurance`.
    pub total_tax_due: Decimal,
    /// `gross_income - total_tax_due`.
    pub net_income: Decimal,
    /// `total_tax_due / gross_income × 100`, in percent; 0 for an empty month.
    pub effective_tax_rate: Decimal,

    pub ytd_income: Decimal,
    pub ytd_tax_base: Decimal,
    pub ytd_pit: Decimal,
}

/// Field-wise sums over the months of a [`YearlySummary`].
///
/// Always derived by summing the already-rounded monthly results, with the
/// effective rate recomputed from the summed figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyTotals {
    pub gross_income: Decimal,
    pub total_expenses: Decimal,
    pub deductible_expenses: Decimal,
    pub tax_base: Decimal,
    pub pit: Decimal,
    pub zus: Decimal,
    pub health_insurance: Decimal,
    pub total_tax_due: Decimal,
    pub net_income: Decimal,
    pub effective_tax_rate: Decimal,
}

/// Ordered monthly results for one calendar year plus their totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: i32,
    pub months: Vec<MonthlyTaxResult>,
    pub totals: YearlyTotals,
}

/// Current-month and year-to-date snapshot for the dashboard view.
/// Pure view object; recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDashboard {
    pub current_month: MonthlyTaxResult,
    pub year_to_date: YearlyTotals,
    pub settings: TaxSettings,
    pub generated_at: DateTime<Utc>,
}
