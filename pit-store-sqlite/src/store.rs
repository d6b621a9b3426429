use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Row, sqlite::SqlitePool};
use tracing::debug;

use pit_core::providers::{
    ConversionError, CurrencyConverter, ExpenseSource, IncomeSource, ProviderError, RateProvider,
    RateTableStore, SettingsProvider,
};
use pit_core::{
    ContributionPlan, ExpenseEvent, HealthRevenueBracket, IncomeEvent, TaxRateConfig, TaxRegime,
    TaxSettings, ZusRates,
};

use crate::decimal::{decimal_to_f64, get_decimal, get_optional_decimal};

/// Income-event statuses that count as recognized revenue.
const RECOGNIZED_STATUSES: [&str; 2] = ["sent", "paid"];

/// SQLite-backed implementation of every engine provider trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(&self, seeds_dir: &Path) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(seed = %path.display(), "executed seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> ProviderError {
    ProviderError::Storage(e.to_string())
}

/// First day of the month and first day of the following month, giving a
/// half-open date window for period queries.
fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ProviderError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ProviderError::Configuration(format!("invalid period {year}-{month:02}")))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| ProviderError::Configuration(format!("invalid period {year}-{month:02}")))?;
    Ok((start, end))
}

fn parse_regime(s: &str) -> Result<TaxRegime, ProviderError> {
    TaxRegime::parse(s)
        .ok_or_else(|| ProviderError::Configuration(format!("unknown tax regime '{s}'")))
}

fn parse_plan(s: &str) -> Result<ContributionPlan, ProviderError> {
    ContributionPlan::parse(s)
        .ok_or_else(|| ProviderError::Configuration(format!("unknown contribution plan '{s}'")))
}

fn row_to_settings(row: &sqlx::sqlite::SqliteRow) -> Result<TaxSettings, ProviderError> {
    let regime: String = row.try_get("regime").map_err(db_err)?;
    let plan: String = row.try_get("contribution_plan").map_err(db_err)?;
    Ok(TaxSettings {
        taxpayer_id: row.try_get("taxpayer_id").map_err(db_err)?,
        regime: parse_regime(&regime)?,
        contribution_plan: parse_plan(&plan)?,
        custom_lumpsum_rate_percent: get_optional_decimal(row, "custom_lumpsum_rate_percent")?,
        custom_zus_amount: get_optional_decimal(row, "custom_zus_amount")?,
    })
}

#[async_trait]
impl SettingsProvider for SqliteStore {
    async fn settings_for(&self, taxpayer_id: i64) -> Result<TaxSettings, ProviderError> {
        let row = sqlx::query(
            "SELECT taxpayer_id, regime, contribution_plan,
                    custom_lumpsum_rate_percent, custom_zus_amount
             FROM tax_settings WHERE taxpayer_id = ?",
        )
        .bind(taxpayer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = &row {
            return row_to_settings(row);
        }

        // First access: create the default row. INSERT OR IGNORE keeps a
        // concurrent first access from failing on the primary key.
        let defaults = TaxSettings::default_for(taxpayer_id);
        sqlx::query(
            "INSERT OR IGNORE INTO tax_settings
                (taxpayer_id, regime, contribution_plan,
                 custom_lumpsum_rate_percent, custom_zus_amount)
             VALUES (?, ?, ?, NULL, NULL)",
        )
        .bind(taxpayer_id)
        .bind(defaults.regime.as_str())
        .bind(defaults.contribution_plan.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(defaults)
    }

    async fn update_settings(&self, settings: &TaxSettings) -> Result<(), ProviderError> {
        sqlx::query(
            "INSERT OR REPLACE INTO tax_settings
                (taxpayer_id, regime, contribution_plan,
                 custom_lumpsum_rate_percent, custom_zus_amount)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(settings.taxpayer_id)
        .bind(settings.regime.as_str())
        .bind(settings.contribution_plan.as_str())
        .bind(settings.custom_lumpsum_rate_percent.map(decimal_to_f64))
        .bind(settings.custom_zus_amount.map(decimal_to_f64))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl IncomeSource for SqliteStore {
    async fn income_events(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<IncomeEvent>, ProviderError> {
        let (start, end) = month_bounds(year, month)?;

        let rows = sqlx::query(
            "SELECT id, amount, currency, transaction_date, status, archived, label
             FROM income_events
             WHERE taxpayer_id = ? AND transaction_date >= ? AND transaction_date < ?
             ORDER BY transaction_date, id",
        )
        .bind(taxpayer_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("status").map_err(db_err)?;
            let archived: bool = row.try_get("archived").map_err(db_err)?;
            events.push(IncomeEvent {
                id: row.try_get("id").map_err(db_err)?,
                amount: get_decimal(&row, "amount")?,
                currency: row.try_get("currency").map_err(db_err)?,
                transaction_date: row.try_get("transaction_date").map_err(db_err)?,
                recognized: RECOGNIZED_STATUSES.contains(&status.as_str()) && !archived,
                label: row.try_get("label").map_err(db_err)?,
            });
        }
        Ok(events)
    }
}

#[async_trait]
impl ExpenseSource for SqliteStore {
    async fn expense_events(
        &self,
        taxpayer_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<ExpenseEvent>, ProviderError> {
        let (start, end) = month_bounds(year, month)?;

        let rows = sqlx::query(
            "SELECT net_amount, deductible_percent, is_deductible, local_amount
             FROM expense_events
             WHERE taxpayer_id = ? AND incurred_date >= ? AND incurred_date < ?
             ORDER BY incurred_date, id",
        )
        .bind(taxpayer_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(ExpenseEvent {
                net_amount: get_decimal(&row, "net_amount")?,
                deductible_percent: get_decimal(&row, "deductible_percent")?,
                is_deductible: row.try_get("is_deductible").map_err(db_err)?,
                local_amount: get_decimal(&row, "local_amount")?,
            });
        }
        Ok(events)
    }
}

#[async_trait]
impl CurrencyConverter for SqliteStore {
    async fn to_local(
        &self,
        amount: Decimal,
        currency: &str,
        as_of: NaiveDate,
    ) -> Result<Decimal, ConversionError> {
        let row = sqlx::query("SELECT rate FROM exchange_rates WHERE currency = ? AND rate_date = ?")
            .bind(currency)
            .bind(as_of)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ConversionError::Backend(e.to_string()))?;

        let row = row.ok_or_else(|| ConversionError::Unavailable {
            currency: currency.to_string(),
            as_of,
        })?;

        let rate =
            get_decimal(&row, "rate").map_err(|e| ConversionError::Backend(e.to_string()))?;
        Ok(amount * rate)
    }
}

#[async_trait]
impl RateProvider for SqliteStore {
    async fn rate_config(&self, tax_year: i32) -> Result<TaxRateConfig, ProviderError> {
        let row = sqlx::query(
            "SELECT tax_year, flat_rate, progressive_threshold, progressive_allowance,
                    progressive_lower_rate, progressive_upper_rate, lumpsum_default_rate,
                    health_minimum, health_flat_rate, health_progressive_rate,
                    health_lumpsum_reference_wage, health_lumpsum_rate
             FROM tax_rate_config WHERE tax_year = ?",
        )
        .bind(tax_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(ProviderError::NotFound)?;

        Ok(TaxRateConfig {
            tax_year: row.try_get("tax_year").map_err(db_err)?,
            flat_rate: get_decimal(&row, "flat_rate")?,
            progressive_threshold: get_decimal(&row, "progressive_threshold")?,
            progressive_allowance: get_decimal(&row, "progressive_allowance")?,
            progressive_lower_rate: get_decimal(&row, "progressive_lower_rate")?,
            progressive_upper_rate: get_decimal(&row, "progressive_upper_rate")?,
            lumpsum_default_rate: get_decimal(&row, "lumpsum_default_rate")?,
            health_minimum: get_decimal(&row, "health_minimum")?,
            health_flat_rate: get_decimal(&row, "health_flat_rate")?,
            health_progressive_rate: get_decimal(&row, "health_progressive_rate")?,
            health_lumpsum_reference_wage: get_decimal(&row, "health_lumpsum_reference_wage")?,
            health_lumpsum_rate: get_decimal(&row, "health_lumpsum_rate")?,
        })
    }

    async fn health_brackets(
        &self,
        tax_year: i32,
    ) -> Result<Vec<HealthRevenueBracket>, ProviderError> {
        let rows = sqlx::query(
            "SELECT tax_year, min_revenue, max_revenue, basis_multiplier
             FROM health_revenue_brackets
             WHERE tax_year = ?
             ORDER BY min_revenue",
        )
        .bind(tax_year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut brackets = Vec::with_capacity(rows.len());
        for row in rows {
            brackets.push(HealthRevenueBracket {
                tax_year: row.try_get("tax_year").map_err(db_err)?,
                min_revenue: get_decimal(&row, "min_revenue")?,
                max_revenue: get_optional_decimal(&row, "max_revenue")?,
                basis_multiplier: get_decimal(&row, "basis_multiplier")?,
            });
        }
        Ok(brackets)
    }

    async fn zus_rates(&self, tax_year: i32) -> Result<ZusRates, ProviderError> {
        let row = sqlx::query(
            "SELECT tax_year, standard, reduced_plus, preferential
             FROM zus_rates WHERE tax_year = ?",
        )
        .bind(tax_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(ProviderError::NotFound)?;

        Ok(ZusRates {
            tax_year: row.try_get("tax_year").map_err(db_err)?,
            standard: get_decimal(&row, "standard")?,
            reduced_plus: get_decimal(&row, "reduced_plus")?,
            preferential: get_decimal(&row, "preferential")?,
        })
    }
}

#[async_trait]
impl RateTableStore for SqliteStore {
    async fn upsert_rate_config(&self, config: &TaxRateConfig) -> Result<(), ProviderError> {
        sqlx::query(
            "INSERT OR REPLACE INTO tax_rate_config (
                tax_year, flat_rate, progressive_threshold, progressive_allowance,
                progressive_lower_rate, progressive_upper_rate, lumpsum_default_rate,
                health_minimum, health_flat_rate, health_progressive_rate,
                health_lumpsum_reference_wage, health_lumpsum_rate
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(config.tax_year)
        .bind(decimal_to_f64(config.flat_rate))
        .bind(decimal_to_f64(config.progressive_threshold))
        .bind(decimal_to_f64(config.progressive_allowance))
        .bind(decimal_to_f64(config.progressive_lower_rate))
        .bind(decimal_to_f64(config.progressive_upper_rate))
        .bind(decimal_to_f64(config.lumpsum_default_rate))
        .bind(decimal_to_f64(config.health_minimum))
        .bind(decimal_to_f64(config.health_flat_rate))
        .bind(decimal_to_f64(config.health_progressive_rate))
        .bind(decimal_to_f64(config.health_lumpsum_reference_wage))
        .bind(decimal_to_f64(config.health_lumpsum_rate))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn replace_health_brackets(
        &self,
        tax_year: i32,
        brackets: &[HealthRevenueBracket],
    ) -> Result<(), ProviderError> {
        sqlx::query("DELETE FROM health_revenue_brackets WHERE tax_year = ?")
            .bind(tax_year)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        for bracket in brackets {
            sqlx::query(
                "INSERT INTO health_revenue_brackets
                    (tax_year, min_revenue, max_revenue, basis_multiplier)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(tax_year)
            .bind(decimal_to_f64(bracket.min_revenue))
            .bind(bracket.max_revenue.map(decimal_to_f64))
            .bind(decimal_to_f64(bracket.basis_multiplier))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        }

        Ok(())
    }

    async fn upsert_zus_rates(&self, rates: &ZusRates) -> Result<(), ProviderError> {
        sqlx::query(
            "INSERT OR REPLACE INTO zus_rates (tax_year, standard, reduced_plus, preferential)
             VALUES (?, ?, ?, ?)",
        )
        .bind(rates.tax_year)
        .bind(decimal_to_f64(rates.standard))
        .bind(decimal_to_f64(rates.reduced_plus))
        .bind(decimal_to_f64(rates.preferential))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
