use std::collections::HashMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use pit_core::providers::{ProviderError, RateTableStore};
use pit_core::{HealthRevenueBracket, ZusRates};

/// Errors that can occur when loading rate-table data.
#[derive(Debug, Error)]
pub enum RateTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl From<csv::Error> for RateTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RateTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the health-insurance bracket CSV.
///
/// Columns:
/// - `tax_year`: the tax year the bracket belongs to
/// - `min_revenue`: lower revenue bound of the bracket
/// - `max_revenue`: upper bound (empty for the open-ended top bracket)
/// - `basis_multiplier`: factor applied to the reference wage
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HealthBracketRecord {
    pub tax_year: i32,
    pub min_revenue: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_revenue: Option<Decimal>,
    pub basis_multiplier: Decimal,
}

/// A single record from the ZUS plan-amount CSV.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ZusRatesRecord {
    pub tax_year: i32,
    pub standard: Decimal,
    pub reduced_plus: Decimal,
    pub preferential: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for health-insurance revenue brackets.
///
/// Reads CSV data and writes it through the `RateTableStore` trait, so it
/// works with any store backend. Brackets are replaced per tax year, which
/// makes repeated loads idempotent.
pub struct HealthBracketLoader;

impl HealthBracketLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<HealthBracketRecord>, RateTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: HealthBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Load bracket records into the store, replacing each tax year's set
    /// as a whole. Returns the number of brackets written.
    pub async fn load<S: RateTableStore>(
        store: &S,
        records: &[HealthBracketRecord],
    ) -> Result<usize, RateTableLoaderError> {
        let mut by_year: HashMap<i32, Vec<HealthRevenueBracket>> = HashMap::new();
        for record in records {
            by_year
                .entry(record.tax_year)
                .or_default()
                .push(HealthRevenueBracket {
                    tax_year: record.tax_year,
                    min_revenue: record.min_revenue,
                    max_revenue: record.max_revenue,
                    basis_multiplier: record.basis_multiplier,
                });
        }

        let mut written = 0;
        for (tax_year, mut brackets) in by_year {
            brackets.sort_by(|a, b| a.min_revenue.cmp(&b.min_revenue));
            store.replace_health_brackets(tax_year, &brackets).await?;
            written += brackets.len();
            info!(tax_year, count = brackets.len(), "loaded health brackets");
        }

        Ok(written)
    }
}

/// Loader for ZUS plan amounts, one row per tax year.
pub struct ZusRatesLoader;

impl ZusRatesLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ZusRatesRecord>, RateTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ZusRatesRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Upserts one `zus_rates` row per record. Returns the number of rows
    /// written.
    pub async fn load<S: RateTableStore>(
        store: &S,
        records: &[ZusRatesRecord],
    ) -> Result<usize, RateTableLoaderError> {
        for record in records {
            store
                .upsert_zus_rates(&ZusRates {
                    tax_year: record.tax_year,
                    standard: record.standard,
                    reduced_plus: record.reduced_plus,
                    preferential: record.preferential,
                })
                .await?;
            info!(tax_year = record.tax_year, "loaded ZUS rates");
        }

        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_reads_bracket_rows() {
        let csv = "tax_year,min_revenue,max_revenue,basis_multiplier\n\
                   2025,0,60000,0.6\n\
                   2025,60000,300000,1.0\n\
                   2025,300000,,1.8";

        let records = HealthBracketLoader::parse(csv.as_bytes()).expect("Should parse CSV");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].min_revenue, dec!(0));
        assert_eq!(records[0].max_revenue, Some(dec!(60000)));
        assert_eq!(records[2].max_revenue, None);
        assert_eq!(records[2].basis_multiplier, dec!(1.8));
    }

    #[test]
    fn parse_rejects_malformed_amounts() {
        let csv = "tax_year,min_revenue,max_revenue,basis_multiplier\n\
                   2025,abc,60000,0.6";

        let result = HealthBracketLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(RateTableLoaderError::CsvParse(_))));
    }

    #[test]
    fn parse_reads_zus_rows() {
        let csv = "tax_year,standard,reduced_plus,preferential\n\
                   2025,1600.32,800.16,408.30";

        let records = ZusRatesLoader::parse(csv.as_bytes()).expect("Should parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].standard, dec!(1600.32));
        assert_eq!(records[0].preferential, dec!(408.30));
    }
}
