//! Regime-specific personal income tax for a single month.
//!
//! The engine is stateless: every call receives the month's taxable base
//! plus the cumulative base of the preceding months of the same year, and
//! returns the PIT newly due for this month. For the progressive regime the
//! month is taxed as the *delta* between the cumulative bracket tax before
//! and after adding this month's base, so summing sequential monthly calls
//! (each seeded with the true running YTD) telescopes to the single-pass
//! tax over the final cumulative base — see [`TaxEngine::annual_pit`].
//!
//! No input value makes a regime call fail; negative bases clamp to zero
//! and a YTD already past the threshold simply yields a zero lower-bracket
//! delta. The only error source is invalid rate configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::clamp_non_negative;
use crate::error::ConfigError;
use crate::models::{TaxRateConfig, TaxRegime, TaxSettings};

/// Outcome of one monthly PIT assessment. Values are unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitAssessment {
    /// The base that entered the brackets this month. Equals the monthly
    /// taxable base except under the progressive regime, where the monthly
    /// share of the annual allowance has been subtracted first.
    pub adjusted_base: Decimal,

    /// Cumulative engine base after this month (`prior + adjusted_base`).
    /// Feed this back as `ytd_engine_base_prior` of the next month.
    pub ytd_engine_base: Decimal,

    /// PIT due for this month. Never negative.
    pub pit: Decimal,
}

/// Calculator for regime-specific monthly PIT.
#[derive(Debug, Clone)]
pub struct TaxEngine<'a> {
    config: &'a TaxRateConfig,
}

impl<'a> TaxEngine<'a> {
    pub fn new(config: &'a TaxRateConfig) -> Self {
        Self { config }
    }

    /// Taxable base of a single month.
    ///
    /// LUMPSUM taxes revenue: the base is the gross income and expenses are
    /// ignored. FLAT and PROGRESSIVE deduct expenses, clamped at zero.
    pub fn monthly_tax_base(
        &self,
        regime: TaxRegime,
        gross_income: Decimal,
        deductible_expenses: Decimal,
    ) -> Decimal {
        match regime {
            TaxRegime::LumpSum => clamp_non_negative(gross_income),
            TaxRegime::Flat | TaxRegime::Progressive => {
                let base = gross_income - deductible_expenses;
                if base < Decimal::ZERO {
                    warn!(
                        gross_income = %gross_income,
                        deductible_expenses = %deductible_expenses,
                        "deductible expenses exceed income; taxable base clamped to zero"
                    );
                }
                clamp_non_negative(base)
            }
        }
    }

    /// PIT newly due for one month.
    ///
    /// `ytd_engine_base_prior` is the cumulative engine base of months
    /// 1..N-1 of the same year — strictly exclusive of the current month.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the rate configuration or the taxpayer's
    /// custom lump-sum rate is invalid. Input values never produce errors.
    pub fn pit_for_month(
        &self,
        settings: &TaxSettings,
        monthly_tax_base: Decimal,
        ytd_engine_base_prior: Decimal,
    ) -> Result<PitAssessment, ConfigError> {
        self.config.validate()?;

        let base = clamp_non_negative(monthly_tax_base);
        let prior = clamp_non_negative(ytd_engine_base_prior);

        Ok(match settings.regime {
            TaxRegime::Flat => PitAssessment {
                adjusted_base: base,
                ytd_engine_base: prior + base,
                pit: base * self.config.flat_rate,
            },
            TaxRegime::LumpSum => PitAssessment {
                adjusted_base: base,
                ytd_engine_base: prior + base,
                pit: base * self.lumpsum_rate(settings)?,
            },
            TaxRegime::Progressive => self.progressive_month(base, prior),
        })
    }

    /// Single-pass PIT over a cumulative engine base.
    ///
    /// For the progressive regime this is the closed form the monthly
    /// deltas telescope to; the builder uses it to derive year-to-date PIT
    /// without replaying every month through [`Self::pit_for_month`].
    pub fn annual_pit(
        &self,
        settings: &TaxSettings,
        annual_engine_base: Decimal,
    ) -> Result<Decimal, ConfigError> {
        self.config.validate()?;

        let base = clamp_non_negative(annual_engine_base);
        Ok(match settings.regime {
            TaxRegime::Flat => base * self.config.flat_rate,
            TaxRegime::LumpSum => base * self.lumpsum_rate(settings)?,
            TaxRegime::Progressive => self.bracket_tax(base),
        })
    }

    /// Monthly share of the annual tax-free allowance.
    pub fn monthly_allowance(&self) -> Decimal {
        self.config.progressive_allowance / Decimal::from(12)
    }

    /// Allowance-adjusted progressive base for one month.
    pub fn progressive_adjusted_base(&self, monthly_tax_base: Decimal) -> Decimal {
        clamp_non_negative(clamp_non_negative(monthly_tax_base) - self.monthly_allowance())
    }

    fn lumpsum_rate(&self, settings: &TaxSettings) -> Result<Decimal, ConfigError> {
        match settings.custom_lumpsum_rate_percent {
            Some(percent) => {
                if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                    return Err(ConfigError::RateOutOfRange {
                        name: "custom_lumpsum_rate_percent",
                        value: percent,
                    });
                }
                Ok(percent / Decimal::ONE_HUNDRED)
            }
            None => Ok(self.config.lumpsum_default_rate),
        }
    }

    /// The bracket-delta step: tax only the slices of cumulative base that
    /// newly entered each bracket this month.
    fn progressive_month(&self, monthly_tax_base: Decimal, prior: Decimal) -> PitAssessment {
        let threshold = self.config.progressive_threshold;
        let adjusted = self.progressive_adjusted_base(monthly_tax_base);
        let new_ytd = prior + adjusted;

        let lower_delta = new_ytd.min(threshold) - prior.min(threshold);
        let mut tax = Decimal::ZERO;
        if lower_delta > Decimal::ZERO {
            tax += lower_delta * self.config.progressive_lower_rate;
        }
        if new_ytd > threshold {
            let upper_delta = new_ytd - threshold.max(prior);
            tax += upper_delta * self.config.progressive_upper_rate;
        }

        PitAssessment {
            adjusted_base: adjusted,
            ytd_engine_base: new_ytd,
            pit: clamp_non_negative(tax),
        }
    }

    /// Cumulative two-bracket tax over an allowance-adjusted annual base.
    fn bracket_tax(&self, cumulative_base: Decimal) -> Decimal {
        let threshold = self.config.progressive_threshold;
        let lower = cumulative_base.min(threshold) * self.config.progressive_lower_rate;
        let upper =
            clamp_non_negative(cumulative_base - threshold) * self.config.progressive_upper_rate;
        clamp_non_negative(lower + upper)
    }
}
