//! Assembly of one month's full tax result.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::calculations::contributions::ContributionCalculator;
use crate::calculations::engine::TaxEngine;
use crate::calculations::expenses::ExpenseAggregator;
use crate::calculations::income::IncomeAggregator;
use crate::calculations::ytd::YtdAccumulator;
use crate::error::ComputeError;
use crate::models::MonthlyTaxResult;
use crate::providers::{
    CurrencyConverter, ExpenseSource, IncomeSource, RateProvider, SettingsProvider,
};

/// Builds a [`MonthlyTaxResult`] from the injected providers.
///
/// This is the rounding boundary: aggregators and the engine work on
/// unrounded values, and every monetary field of the assembled result is
/// rounded to two decimals here and nowhere else.
#[derive(Clone)]
pub struct MonthlyResultBuilder {
    settings: Arc<dyn SettingsProvider>,
    rates: Arc<dyn RateProvider>,
    income: IncomeAggregator,
    expenses: ExpenseAggregator,
    ytd: YtdAccumulator,
}

impl MonthlyResultBuilder {
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        rates: Arc<dyn RateProvider>,
        income_source: Arc<dyn IncomeSource>,
        expense_source: Arc<dyn ExpenseSource>,
        converter: Arc<dyn CurrencyConverter>,
    ) -> Self {
        let income = IncomeAggregator::new(income_source, converter);
        let expenses = ExpenseAggregator::new(expense_source);
        let ytd = YtdAccumulator::new(income.clone(), expenses.clone());
        Self {
            settings,
            rates,
            income,
            expenses,
            ytd,
        }
    }

    /// Computes the full tax result of one month.
    ///
    /// Every call re-derives its own year-to-date state from raw data, so
    /// months are independent and may be computed in any order or in
    /// parallel.
    pub async fn build(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<MonthlyTaxResult, ComputeError> {
        let settings = self.settings.settings_for(taxpayer_id).await?;
        let config = self.rates.rate_config(year).await?;
        let zus_rates = self.rates.zus_rates(year).await?;
        let health_brackets = self.rates.health_brackets(year).await?;

        let engine = TaxEngine::new(&config);
        let contributions = ContributionCalculator::new(&config, &zus_rates, &health_brackets);

        let income = self.income.aggregate(taxpayer_id, year, month).await?;
        let expenses = self.expenses.aggregate(taxpayer_id, year, month).await?;
        let prior = self
            .ytd
            .accumulate(&engine, &settings, taxpayer_id, year, month)
            .await?;

        let tax_base = engine.monthly_tax_base(
            settings.regime,
            income.gross_income,
            expenses.deductible_expenses,
        );
        let assessment = engine.pit_for_month(&settings, tax_base, prior.engine_base)?;
        let prior_pit = engine.annual_pit(&settings, prior.engine_base)?;

        let zus = contributions.zus(&settings);
        // Health insurance reads YTD revenue *including* this month.
        let health = contributions.health_insurance(
            settings.regime,
            income.gross_income,
            prior.income + income.gross_income,
        )?;

        let gross_income = round_half_up(income.gross_income);
        let pit = round_half_up(assessment.pit);
        let zus = round_half_up(zus);
        let health_insurance = round_half_up(health);
        let total_tax_due = pit + zus + health_insurance;
        let net_income = gross_income - total_tax_due;
        let effective_tax_rate = if gross_income.is_zero() {
            Decimal::ZERO
        } else {
            round_half_up(total_tax_due / gross_income * Decimal::ONE_HUNDRED)
        };

        let mut income_items = income.items;
        for item in &mut income_items {
            item.local_amount = round_half_up(item.local_amount);
        }

        debug!(
            taxpayer_id,
            year,
            month,
            regime = settings.regime.as_str(),
            %gross_income,
            %pit,
            %total_tax_due,
            "assembled monthly tax result"
        );

        Ok(MonthlyTaxResult {
            year,
            month,
            income_items,
            gross_income,
            total_expenses: round_half_up(expenses.total_expenses),
            deductible_expenses: round_half_up(expenses.deductible_expenses),
            tax_base: round_half_up(tax_base),
            pit,
            zus,
            health_insurance,
            total_tax_due,
            net_income,
            effective_tax_rate,
            ytd_income: round_half_up(prior.income + income.gross_income),
            ytd_tax_base: round_half_up(prior.tax_base + tax_base),
            ytd_pit: round_half_up(prior_pit + assessment.pit),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        ContributionPlan, ExpenseEvent, HealthRevenueBracket, IncomeEvent, TaxRateConfig,
        TaxRegime, TaxSettings, ZusRates,
    };
    use crate::providers::{MemoryProviders, RateTableStore};

    fn test_config() -> TaxRateConfig {
        TaxRateConfig {
            tax_year: 2025,
            flat_rate: dec!(0.19),
            progressive_threshold: dec!(120000),
            progressive_allowance: dec!(30000),
            progressive_lower_rate: dec!(0.12),
            progressive_upper_rate: dec!(0.32),
            lumpsum_default_rate: dec!(0.12),
            health_minimum: dec!(381.78),
            health_flat_rate: dec!(0.049),
            health_progressive_rate: dec!(0.09),
            health_lumpsum_reference_wage: dec!(7000),
            health_lumpsum_rate: dec!(0.09),
        }
    }

    async fn seeded_providers() -> Arc<MemoryProviders> {
        let providers = Arc::new(MemoryProviders::new());
        providers.upsert_rate_config(&test_config()).await.unwrap();
        providers
            .upsert_zus_rates(&ZusRates {
                tax_year: 2025,
                standard: dec!(1600.32),
                reduced_plus: dec!(800.16),
                preferential: dec!(408.30),
            })
            .await
            .unwrap();
        providers
            .replace_health_brackets(
                2025,
                &[
                    HealthRevenueBracket {
                        tax_year: 2025,
                        min_revenue: dec!(0),
                        max_revenue: Some(dec!(60000)),
                        basis_multiplier: dec!(0.6),
                    },
                    HealthRevenueBracket {
                        tax_year: 2025,
                        min_revenue: dec!(60000),
                        max_revenue: Some(dec!(300000)),
                        basis_multiplier: dec!(1.0),
                    },
                    HealthRevenueBracket {
                        tax_year: 2025,
                        min_revenue: dec!(300000),
                        max_revenue: None,
                        basis_multiplier: dec!(1.8),
                    },
                ],
            )
            .await
            .unwrap();
        providers
    }

    fn builder(providers: &Arc<MemoryProviders>) -> MonthlyResultBuilder {
        MonthlyResultBuilder::new(
            providers.clone(),
            providers.clone(),
            providers.clone(),
            providers.clone(),
            providers.clone(),
        )
    }

    fn income(providers: &MemoryProviders, month: u32, amount: Decimal) {
        providers.add_income_event(
            1,
            IncomeEvent {
                id: month as i64,
                amount,
                currency: "PLN".to_string(),
                transaction_date: NaiveDate::from_ymd_opt(2025, month, 10).unwrap(),
                recognized: true,
                label: "invoice".to_string(),
            },
        );
    }

    fn expense(providers: &MemoryProviders, month: u32, net: Decimal) {
        providers.add_expense_event(
            1,
            2025,
            month,
            ExpenseEvent {
                net_amount: net,
                deductible_percent: dec!(100),
                is_deductible: true,
                local_amount: net,
            },
        );
    }

    #[tokio::test]
    async fn flat_scenario_computes_known_figures() {
        let providers = seeded_providers().await;
        income(&providers, 3, dec!(20000));
        expense(&providers, 3, dec!(5000));

        let result = builder(&providers).build(1, 2025, 3).await.unwrap();

        assert_eq!(result.gross_income, dec!(20000.00));
        assert_eq!(result.total_expenses, dec!(5000.00));
        assert_eq!(result.deductible_expenses, dec!(5000.00));
        assert_eq!(result.tax_base, dec!(15000.00));
        assert_eq!(result.pit, dec!(2850.00));
        assert_eq!(result.zus, dec!(1600.32));
        assert_eq!(result.health_insurance, dec!(980.00)); // 20000 × 4.9%
        assert_eq!(result.total_tax_due, dec!(5430.32));
        assert_eq!(result.net_income, dec!(14569.68));
        assert_eq!(result.effective_tax_rate, dec!(27.15));
        assert_eq!(result.ytd_income, dec!(20000.00));
        assert_eq!(result.ytd_tax_base, dec!(15000.00));
        assert_eq!(result.ytd_pit, dec!(2850.00));
    }

    #[tokio::test]
    async fn lumpsum_scenario_ignores_expenses() {
        let providers = seeded_providers().await;
        providers.set_settings(TaxSettings {
            taxpayer_id: 1,
            regime: TaxRegime::LumpSum,
            contribution_plan: ContributionPlan::Standard,
            custom_lumpsum_rate_percent: None,
            custom_zus_amount: None,
        });
        income(&providers, 3, dec!(10000));
        expense(&providers, 3, dec!(8000));

        let result = builder(&providers).build(1, 2025, 3).await.unwrap();

        assert_eq!(result.tax_base, dec!(10000.00));
        assert_eq!(result.pit, dec!(1200.00));
        // Inclusive YTD revenue 10000 sits in the first bracket:
        // 0.6 × 7000 × 9% = 378.00.
        assert_eq!(result.health_insurance, dec!(378.00));
        assert_eq!(result.total_expenses, dec!(8000.00));
    }

    #[tokio::test]
    async fn empty_month_still_owes_contributions() {
        let providers = seeded_providers().await;

        let result = builder(&providers).build(1, 2025, 3).await.unwrap();

        assert_eq!(result.gross_income, dec!(0));
        assert_eq!(result.pit, dec!(0.00));
        assert_eq!(result.zus, dec!(1600.32));
        assert_eq!(result.health_insurance, dec!(381.78));
        assert_eq!(result.effective_tax_rate, dec!(0));
        assert_eq!(result.net_income, dec!(-1982.10));
    }

    #[tokio::test]
    async fn missing_settings_fall_back_to_flat_standard_defaults() {
        let providers = seeded_providers().await;
        income(&providers, 3, dec!(10000));

        // No set_settings call: the provider creates FLAT/STANDARD on access.
        let result = builder(&providers).build(1, 2025, 3).await.unwrap();

        assert_eq!(result.pit, dec!(1900.00));
        assert_eq!(result.zus, dec!(1600.32));
    }

    #[tokio::test]
    async fn identical_inputs_yield_identical_results() {
        let providers = seeded_providers().await;
        income(&providers, 3, dec!(12345.67));
        expense(&providers, 3, dec!(2345.11));
        let builder = builder(&providers);

        let first = builder.build(1, 2025, 3).await.unwrap();
        let second = builder.build(1, 2025, 3).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn ytd_fields_accumulate_across_months() {
        let providers = seeded_providers().await;
        income(&providers, 1, dec!(10000));
        income(&providers, 2, dec!(20000));
        expense(&providers, 2, dec!(4000));
        let builder = builder(&providers);

        let january = builder.build(1, 2025, 1).await.unwrap();
        let february = builder.build(1, 2025, 2).await.unwrap();

        assert_eq!(january.ytd_income, dec!(10000.00));
        assert_eq!(february.ytd_income, dec!(30000.00));
        assert_eq!(
            february.ytd_tax_base,
            january.tax_base + february.tax_base
        );
        assert_eq!(february.ytd_pit, january.pit + february.pit);
    }

    #[tokio::test]
    async fn progressive_bracket_crossing_is_taxed_as_a_delta() {
        let providers = seeded_providers().await;
        providers.set_settings(TaxSettings {
            taxpayer_id: 1,
            regime: TaxRegime::Progressive,
            contribution_plan: ContributionPlan::Standard,
            custom_lumpsum_rate_percent: None,
            custom_zus_amount: None,
        });
        // Five months of 25000 put the adjusted YTD at 112500; the sixth
        // month crosses the 120000 threshold.
        for month in 1..=6 {
            income(&providers, month, dec!(25000));
        }

        let june = builder(&providers).build(1, 2025, 6).await.unwrap();

        // Adjusted base 22500: 7500 at 12% + 15000 at 32%.
        assert_eq!(june.pit, dec!(5700.00));
        // YTD PIT telescopes: 112500 × 12% + june's delta.
        assert_eq!(june.ytd_pit, dec!(13500.00) + dec!(5700.00));
    }

    #[tokio::test]
    async fn foreign_income_without_rate_aborts_the_month() {
        let providers = seeded_providers().await;
        providers.add_income_event(
            1,
            IncomeEvent {
                id: 99,
                amount: dec!(1000),
                currency: "EUR".to_string(),
                transaction_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
                recognized: true,
                label: "foreign invoice".to_string(),
            },
        );

        let result = builder(&providers).build(1, 2025, 3).await;

        assert!(matches!(result, Err(ComputeError::Conversion(_))));
    }
}
