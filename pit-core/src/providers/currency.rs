use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from the currency-conversion collaborator.
///
/// A failed conversion aborts the affected month's calculation; foreign
/// income is never silently treated as zero.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("no exchange rate for {currency} on {as_of}")]
    Unavailable { currency: String, as_of: NaiveDate },

    #[error("conversion backend error: {0}")]
    Backend(String),
}

/// Converts a foreign-currency amount into the local currency.
///
/// Lookups may be slow (external rate source); callers cache by
/// `(currency, date)` within one calculation run. Amounts already in the
/// local currency never reach the converter.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    /// Converts `amount` of `currency` into the local currency at the rate
    /// valid on `as_of` — the original transaction date, not the
    /// calculation date.
    async fn to_local(
        &self,
        amount: Decimal,
        currency: &str,
        as_of: NaiveDate,
    ) -> Result<Decimal, ConversionError>;
}
