use serde::{Deserialize, Serialize};

/// Personal income tax regime. Exactly one is active per taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxRegime {
    /// Flat-rate tax on income minus deductible expenses.
    Flat,
    /// Two-bracket progressive tax with an annual tax-free allowance.
    Progressive,
    /// Revenue-based lump sum; expenses are not deductible.
    LumpSum,
}

impl TaxRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "FLAT",
            Self::Progressive => "PROGRESSIVE",
            Self::LumpSum => "LUMPSUM",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FLAT" => Some(Self::Flat),
            "PROGRESSIVE" => Some(Self::Progressive),
            "LUMPSUM" => Some(Self::LumpSum),
            _ => None,
        }
    }
}

/// Social-insurance (ZUS) contribution plan.
///
/// Each plan maps to a fixed monthly amount in [`ZusRates`]; `Custom` uses
/// the taxpayer's override amount, falling back to the standard amount when
/// no override is set.
///
/// [`ZusRates`]: crate::models::ZusRates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionPlan {
    Standard,
    ReducedPlus,
    Preferential,
    Custom,
}

impl ContributionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::ReducedPlus => "REDUCED_PLUS",
            Self::Preferential => "PREFERENTIAL",
            Self::Custom => "CUSTOM",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "STANDARD" => Some(Self::Standard),
            "REDUCED_PLUS" => Some(Self::ReducedPlus),
            "PREFERENTIAL" => Some(Self::Preferential),
            "CUSTOM" => Some(Self::Custom),
            _ => None,
        }
    }
}
