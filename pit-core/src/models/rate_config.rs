use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Per-tax-year rates and thresholds.
///
/// Regulatory figures are data, not code: a new tax year is a new row in
/// the rate store (or a seed/CSV edit), never a code change. Fractional
/// rates are decimals in [0, 1] (e.g. `0.19` for 19%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRateConfig {
    pub tax_year: i32,

    /// Flat-regime PIT rate.
    pub flat_rate: Decimal,

    /// Annual taxable-base threshold between the progressive brackets.
    pub progressive_threshold: Decimal,

    /// Annual tax-free allowance, applied evenly as 1/12 per month.
    pub progressive_allowance: Decimal,

    /// Rate for the cumulative base at or below the threshold.
    pub progressive_lower_rate: Decimal,

    /// Rate for the cumulative base above the threshold.
    pub progressive_upper_rate: Decimal,

    /// Lump-sum PIT rate applied when the taxpayer has no custom rate.
    pub lumpsum_default_rate: Decimal,

    /// Monthly health-insurance floor for the flat and progressive regimes.
    pub health_minimum: Decimal,

    /// Health-insurance rate on monthly income under the flat regime.
    pub health_flat_rate: Decimal,

    /// Health-insurance rate on monthly income under the progressive regime.
    pub health_progressive_rate: Decimal,

    /// Reference wage the lump-sum health basis multipliers apply to.
    pub health_lumpsum_reference_wage: Decimal,

    /// Rate applied to the lump-sum health basis.
    pub health_lumpsum_rate: Decimal,
}

impl TaxRateConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any rate lies outside [0, 1], the
    /// progressive threshold or reference wage is not positive, or the
    /// allowance or health minimum is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, rate) in [
            ("flat_rate", self.flat_rate),
            ("progressive_lower_rate", self.progressive_lower_rate),
            ("progressive_upper_rate", self.progressive_upper_rate),
            ("lumpsum_default_rate", self.lumpsum_default_rate),
            ("health_flat_rate", self.health_flat_rate),
            ("health_progressive_rate", self.health_progressive_rate),
            ("health_lumpsum_rate", self.health_lumpsum_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ConfigError::RateOutOfRange { name, value: rate });
            }
        }
        if self.progressive_threshold <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveThreshold(
                self.progressive_threshold,
            ));
        }
        if self.progressive_allowance < Decimal::ZERO {
            return Err(ConfigError::NegativeAllowance(self.progressive_allowance));
        }
        if self.health_minimum < Decimal::ZERO {
            return Err(ConfigError::NegativeHealthMinimum(self.health_minimum));
        }
        if self.health_lumpsum_reference_wage <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveReferenceWage(
                self.health_lumpsum_reference_wage,
            ));
        }
        Ok(())
    }
}

/// One lump-sum health-insurance revenue bracket.
///
/// The basis is `basis_multiplier × health_lumpsum_reference_wage`; the
/// bracket matching the year-to-date revenue (inclusive of the current
/// month) applies. The open-ended top bracket has `max_revenue: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRevenueBracket {
    pub tax_year: i32,
    pub min_revenue: Decimal,
    pub max_revenue: Option<Decimal>,
    pub basis_multiplier: Decimal,
}

/// Fixed monthly ZUS amounts per contribution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZusRates {
    pub tax_year: i32,
    pub standard: Decimal,
    pub reduced_plus: Decimal,
    pub preferential: Decimal,
}
