//! Social-insurance (ZUS) and health-insurance contributions.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::clamp_non_negative;
use crate::error::ConfigError;
use crate::models::{
    ContributionPlan, HealthRevenueBracket, TaxRateConfig, TaxRegime, TaxSettings, ZusRates,
};

/// Calculator for the monthly contribution amounts.
///
/// ZUS is a fixed table lookup with no month dependence. Health insurance
/// depends on the regime: FLAT and PROGRESSIVE pay a rate on the month's
/// income floored at the configured minimum, while LUMPSUM pays a fixed
/// amount chosen by the year-to-date revenue bracket — where the YTD figure
/// **includes** the current month. PIT, by contrast, consumes YTD exclusive
/// of the current month and adds a delta; the asymmetry is regulation-driven
/// and deliberate.
#[derive(Debug, Clone)]
pub struct ContributionCalculator<'a> {
    config: &'a TaxRateConfig,
    zus_rates: &'a ZusRates,
    health_brackets: &'a [HealthRevenueBracket],
}

impl<'a> ContributionCalculator<'a> {
    pub fn new(
        config: &'a TaxRateConfig,
        zus_rates: &'a ZusRates,
        health_brackets: &'a [HealthRevenueBracket],
    ) -> Self {
        Self {
            config,
            zus_rates,
            health_brackets,
        }
    }

    /// Monthly ZUS amount for the taxpayer's contribution plan.
    ///
    /// `Custom` uses the taxpayer's override; with no override set it falls
    /// back to the standard amount (an expected state, unlike an unknown
    /// plan value, which never reaches this point).
    pub fn zus(&self, settings: &TaxSettings) -> Decimal {
        match settings.contribution_plan {
            ContributionPlan::Standard => self.zus_rates.standard,
            ContributionPlan::ReducedPlus => self.zus_rates.reduced_plus,
            ContributionPlan::Preferential => self.zus_rates.preferential,
            ContributionPlan::Custom => match settings.custom_zus_amount {
                Some(amount) => clamp_non_negative(amount),
                None => {
                    warn!(
                        taxpayer_id = settings.taxpayer_id,
                        "custom contribution plan without override amount; using standard rate"
                    );
                    self.zus_rates.standard
                }
            },
        }
    }

    /// Monthly health-insurance contribution.
    ///
    /// `ytd_revenue_through_month` must include the current month's revenue;
    /// it is only consulted under the lump-sum regime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid rate configuration, or when the
    /// lump-sum regime finds no bracket covering the YTD revenue.
    pub fn health_insurance(
        &self,
        regime: TaxRegime,
        monthly_income: Decimal,
        ytd_revenue_through_month: Decimal,
    ) -> Result<Decimal, ConfigError> {
        self.config.validate()?;

        let income = clamp_non_negative(monthly_income);
        match regime {
            TaxRegime::Flat => {
                Ok((income * self.config.health_flat_rate).max(self.config.health_minimum))
            }
            TaxRegime::Progressive => {
                Ok((income * self.config.health_progressive_rate).max(self.config.health_minimum))
            }
            TaxRegime::LumpSum => {
                let revenue = clamp_non_negative(ytd_revenue_through_month);
                let bracket = self.lumpsum_bracket(revenue)?;
                Ok(bracket.basis_multiplier
                    * self.config.health_lumpsum_reference_wage
                    * self.config.health_lumpsum_rate)
            }
        }
    }

    fn lumpsum_bracket(&self, ytd_revenue: Decimal) -> Result<&HealthRevenueBracket, ConfigError> {
        if self.health_brackets.is_empty() {
            return Err(ConfigError::NoHealthBrackets);
        }

        self.health_brackets
            .iter()
            .find(|b| {
                ytd_revenue >= b.min_revenue
                    && b.max_revenue.is_none_or(|max| ytd_revenue <= max)
            })
            .ok_or(ConfigError::NoMatchingHealthBracket(ytd_revenue))
    }
}
