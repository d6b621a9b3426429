use async_trait::async_trait;

use super::ProviderError;
use crate::models::{HealthRevenueBracket, TaxRateConfig, ZusRates};

/// Read access to the per-year rate tables.
///
/// PIT thresholds/rates and the health-insurance revenue brackets are two
/// independent tables so that regulatory changes stay data edits.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn rate_config(&self, tax_year: i32) -> Result<TaxRateConfig, ProviderError>;

    /// Lump-sum health-insurance brackets for the year, ordered by
    /// `min_revenue` ascending.
    async fn health_brackets(
        &self,
        tax_year: i32,
    ) -> Result<Vec<HealthRevenueBracket>, ProviderError>;

    async fn zus_rates(&self, tax_year: i32) -> Result<ZusRates, ProviderError>;
}

/// Write access used by the rate-table loader. Replacement is per tax
/// year, making repeated loads idempotent.
#[async_trait]
pub trait RateTableStore: RateProvider {
    async fn upsert_rate_config(&self, config: &TaxRateConfig) -> Result<(), ProviderError>;

    /// Replaces every bracket of `tax_year` with `brackets`.
    async fn replace_health_brackets(
        &self,
        tax_year: i32,
        brackets: &[HealthRevenueBracket],
    ) -> Result<(), ProviderError>;

    async fn upsert_zus_rates(&self, rates: &ZusRates) -> Result<(), ProviderError>;
}
