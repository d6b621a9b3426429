//! Dashboard view assembly.

use std::sync::Arc;

use chrono::Utc;

use crate::calculations::monthly::MonthlyResultBuilder;
use crate::calculations::yearly::YearlyAggregator;
use crate::error::ComputeError;
use crate::models::TaxDashboard;
use crate::providers::SettingsProvider;

/// Bundles the current month, year-to-date totals and a settings snapshot
/// into a [`TaxDashboard`]. Pure composition — all figures come from the
/// monthly builder and the yearly aggregator.
#[derive(Clone)]
pub struct DashboardAssembler {
    builder: MonthlyResultBuilder,
    yearly: YearlyAggregator,
    settings: Arc<dyn SettingsProvider>,
}

impl DashboardAssembler {
    pub fn new(builder: MonthlyResultBuilder, settings: Arc<dyn SettingsProvider>) -> Self {
        let yearly = YearlyAggregator::new(builder.clone());
        Self {
            builder,
            yearly,
            settings,
        }
    }

    /// Assembles the dashboard for `(year, month)` — normally the current
    /// calendar month; the caller owns that decision.
    pub async fn assemble(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<TaxDashboard, ComputeError> {
        let current_month = self.builder.build(taxpayer_id, year, month).await?;
        let summary = self.yearly.build_year(taxpayer_id, year, month).await?;
        let settings = self.settings.settings_for(taxpayer_id).await?;

        Ok(TaxDashboard {
            current_month,
            year_to_date: summary.totals,
            settings,
            generated_at: Utc::now(),
        })
    }
}
