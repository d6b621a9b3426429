//! In-memory provider implementations.
//!
//! Backs the engine with plain maps: unit tests across the calculation
//! modules run against these, and in-process callers can assemble a
//! one-off calculation without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::{
    ConversionError, CurrencyConverter, ExpenseSource, IncomeSource, ProviderError, RateProvider,
    RateTableStore, SettingsProvider,
};
use crate::models::{
    ExpenseEvent, HealthRevenueBracket, IncomeEvent, TaxRateConfig, TaxSettings, ZusRates,
};

#[derive(Debug, Default)]
struct Inner {
    settings: HashMap<i64, TaxSettings>,
    income: HashMap<(i64, i32, u32), Vec<IncomeEvent>>,
    expenses: HashMap<(i64, i32, u32), Vec<ExpenseEvent>>,
    rate_configs: HashMap<i32, TaxRateConfig>,
    health_brackets: HashMap<i32, Vec<HealthRevenueBracket>>,
    zus_rates: HashMap<i32, ZusRates>,
    exchange_rates: HashMap<(String, NaiveDate), Decimal>,
}

/// Map-backed implementation of every provider trait.
#[derive(Debug, Default)]
pub struct MemoryProviders {
    inner: Mutex<Inner>,
}

impl MemoryProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files an income event under the period of its transaction date.
    pub fn add_income_event(&self, taxpayer_id: i64, event: IncomeEvent) {
        let key = (
            taxpayer_id,
            event.transaction_date.year(),
            event.transaction_date.month(),
        );
        self.inner
            .lock()
            .unwrap()
            .income
            .entry(key)
            .or_default()
            .push(event);
    }

    pub fn add_expense_event(&self, taxpayer_id: i64, year: i32, month: u32, event: ExpenseEvent) {
        self.inner
            .lock()
            .unwrap()
            .expenses
            .entry((taxpayer_id, year, month))
            .or_default()
            .push(event);
    }

    pub fn set_settings(&self, settings: TaxSettings) {
        self.inner
            .lock()
            .unwrap()
            .settings
            .insert(settings.taxpayer_id, settings);
    }

    pub fn set_exchange_rate(&self, currency: &str, as_of: NaiveDate, rate: Decimal) {
        self.inner
            .lock()
            .unwrap()
            .exchange_rates
            .insert((currency.to_string(), as_of), rate);
    }
}

#[async_trait]
impl SettingsProvider for MemoryProviders {
    async fn settings_for(&self, taxpayer_id: i64) -> Result<TaxSettings, ProviderError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner
            .settings
            .entry(taxpayer_id)
            .or_insert_with(|| TaxSettings::default_for(taxpayer_id))
            .clone())
    }

    async fn update_settings(&self, settings: &TaxSettings) -> Result<(), ProviderError> {
        self.inner
            .lock()
            .unwrap()
            .settings
            .insert(settings.taxpayer_id, settings.clone());
        Ok(())
    }
}

#[async_trait]
impl IncomeSource for MemoryProviders {
    async fn income_events(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<IncomeEvent>, ProviderError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .income
            .get(&(taxpayer_id, year, month))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ExpenseSource for MemoryProviders {
    async fn expense_events(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<ExpenseEvent>, ProviderError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .expenses
            .get(&(taxpayer_id, year, month))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl CurrencyConverter for MemoryProviders {
    async fn to_local(
        &self,
        amount: Decimal,
        currency: &str,
        as_of: NaiveDate,
    ) -> Result<Decimal, ConversionError> {
        let rate = self
            .inner
            .lock()
            .unwrap()
            .exchange_rates
            .get(&(currency.to_string(), as_of))
            .copied()
            .ok_or_else(|| ConversionError::Unavailable {
                currency: currency.to_string(),
                as_of,
            })?;
        Ok(amount * rate)
    }
}

#[async_trait]
impl RateProvider for MemoryProviders {
    async fn rate_config(&self, tax_year: i32) -> Result<TaxRateConfig, ProviderError> {
        self.inner
            .lock()
            .unwrap()
            .rate_configs
            .get(&tax_year)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn health_brackets(
        &self,
        tax_year: i32,
    ) -> Result<Vec<HealthRevenueBracket>, ProviderError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .health_brackets
            .get(&tax_year)
            .cloned()
            .unwrap_or_default())
    }

    async fn zus_rates(&self, tax_year: i32) -> Result<ZusRates, ProviderError> {
        self.inner
            .lock()
            .unwrap()
            .zus_rates
            .get(&tax_year)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }
}

#[async_trait]
impl RateTableStore for MemoryProviders {
    async fn upsert_rate_config(&self, config: &TaxRateConfig) -> Result<(), ProviderError> {
        self.inner
            .lock()
            .unwrap()
            .rate_configs
            .insert(config.tax_year, config.clone());
        Ok(())
    }

    async fn replace_health_brackets(
        &self,
        tax_year: i32,
        brackets: &[HealthRevenueBracket],
    ) -> Result<(), ProviderError> {
        self.inner
            .lock()
            .unwrap()
            .health_brackets
            .insert(tax_year, brackets.to_vec());
        Ok(())
    }

    async fn upsert_zus_rates(&self, rates: &ZusRates) -> Result<(), ProviderError> {
        self.inner
            .lock()
            .unwrap()
            .zus_rates
            .insert(rates.tax_year, rates.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{ContributionPlan, TaxRegime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn settings_are_created_with_defaults_on_first_access() {
        let providers = MemoryProviders::new();

        let settings = providers.settings_for(1).await.unwrap();

        assert_eq!(settings, TaxSettings::default_for(1));
    }

    #[tokio::test]
    async fn settings_survive_update() {
        let providers = MemoryProviders::new();
        let mut settings = providers.settings_for(1).await.unwrap();
        settings.regime = TaxRegime::LumpSum;
        settings.contribution_plan = ContributionPlan::Preferential;

        providers.update_settings(&settings).await.unwrap();

        assert_eq!(providers.settings_for(1).await.unwrap(), settings);
    }

    #[tokio::test]
    async fn income_events_are_filed_by_transaction_month() {
        let providers = MemoryProviders::new();
        providers.add_income_event(
            1,
            IncomeEvent {
                id: 10,
                amount: dec!(5000),
                currency: "PLN".to_string(),
                transaction_date: date(2025, 3, 14),
                recognized: true,
                label: "invoice 10".to_string(),
            },
        );

        let march = providers.income_events(1, 2025, 3).await.unwrap();
        let april = providers.income_events(1, 2025, 4).await.unwrap();

        assert_eq!(march.len(), 1);
        assert!(april.is_empty());
    }

    #[tokio::test]
    async fn missing_exchange_rate_is_unavailable() {
        let providers = MemoryProviders::new();
        providers.set_exchange_rate("EUR", date(2025, 3, 14), dec!(4.20));

        let ok = providers
            .to_local(dec!(100), "EUR", date(2025, 3, 14))
            .await;
        let missing = providers
            .to_local(dec!(100), "EUR", date(2025, 3, 15))
            .await;

        assert_eq!(ok, Ok(dec!(420.00)));
        assert_eq!(
            missing,
            Err(ConversionError::Unavailable {
                currency: "EUR".to_string(),
                as_of: date(2025, 3, 15),
            })
        );
    }

    #[tokio::test]
    async fn replace_health_brackets_overwrites_previous_set() {
        let providers = MemoryProviders::new();
        let first = vec![HealthRevenueBracket {
            tax_year: 2025,
            min_revenue: dec!(0),
            max_revenue: None,
            basis_multiplier: dec!(0.6),
        }];
        let second = vec![
            HealthRevenueBracket {
                tax_year: 2025,
                min_revenue: dec!(0),
                max_revenue: Some(dec!(60000)),
                basis_multiplier: dec!(0.6),
            },
            HealthRevenueBracket {
                tax_year: 2025,
                min_revenue: dec!(60000),
                max_revenue: None,
                basis_multiplier: dec!(1.0),
            },
        ];

        providers.replace_health_brackets(2025, &first).await.unwrap();
        providers.replace_health_brackets(2025, &second).await.unwrap();

        assert_eq!(providers.health_brackets(2025).await.unwrap(), second);
    }
}
