use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ContributionPlan, TaxRegime};

/// Per-taxpayer tax configuration.
///
/// A settings row is created with [`TaxSettings::default_for`] on first
/// access (see `SettingsProvider`); a missing row is never an error.
/// Mutation happens only through the settings-update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSettings {
    pub taxpayer_id: i64,
    pub regime: TaxRegime,
    pub contribution_plan: ContributionPlan,
    /// Lump-sum rate override, expressed as a percentage (e.g. `8.5`).
    /// `None` means the configured default rate applies.
    pub custom_lumpsum_rate_percent: Option<Decimal>,
    /// Monthly ZUS override used by [`ContributionPlan::Custom`].
    pub custom_zus_amount: Option<Decimal>,
}

impl TaxSettings {
    /// Default settings assigned on first access: flat regime, standard
    /// contribution plan, no overrides.
    pub fn default_for(taxpayer_id: i64) -> Self {
        Self {
            taxpayer_id,
            regime: TaxRegime::Flat,
            contribution_plan: ContributionPlan::Standard,
            custom_lumpsum_rate_percent: None,
            custom_zus_amount: None,
        }
    }
}
