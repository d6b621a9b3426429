use rust_decimal::Decimal;
use thiserror::Error;

use crate::providers::{ConversionError, ProviderError};

/// Configuration-class errors: bad rate tables, unknown wire values.
///
/// Distinct from computation errors on purpose — a taxpayer with no
/// settings row gets defaults, but a settings row carrying an unknown
/// regime or plan is rejected, never silently substituted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate '{name}' must be between 0 and 1, got {value}")]
    RateOutOfRange { name: &'static str, value: Decimal },

    #[error("progressive threshold must be positive, got {0}")]
    NonPositiveThreshold(Decimal),

    #[error("progressive allowance must be non-negative, got {0}")]
    NegativeAllowance(Decimal),

    #[error("health-insurance minimum must be non-negative, got {0}")]
    NegativeHealthMinimum(Decimal),

    #[error("lump-sum health reference wage must be positive, got {0}")]
    NonPositiveReferenceWage(Decimal),

    #[error("no health-insurance revenue brackets configured")]
    NoHealthBrackets,

    #[error("no health-insurance bracket matches year-to-date revenue {0}")]
    NoMatchingHealthBracket(Decimal),

    #[error("unknown tax regime '{0}'")]
    UnknownRegime(String),

    #[error("unknown contribution plan '{0}'")]
    UnknownPlan(String),
}

/// One month that could not be computed during yearly aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthFailure {
    pub month: u32,
    pub reason: String,
}

/// Errors surfaced by the calculation pipeline.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// One or more months of a yearly aggregation failed. The summary is
    /// withheld entirely rather than returned with a gap in the totals.
    #[error("tax year {year} incomplete; failed months: {}", format_failures(.failures))]
    YearIncomplete {
        year: i32,
        failures: Vec<MonthFailure>,
    },
}

fn format_failures(failures: &[MonthFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.month, f.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn year_incomplete_lists_every_failed_month() {
        let err = ComputeError::YearIncomplete {
            year: 2025,
            failures: vec![
                MonthFailure {
                    month: 3,
                    reason: "no exchange rate for EUR on 2025-03-14".to_string(),
                },
                MonthFailure {
                    month: 7,
                    reason: "no exchange rate for USD on 2025-07-02".to_string(),
                },
            ],
        };

        let message = err.to_string();

        assert!(message.contains("2025"));
        assert!(message.contains("3 (no exchange rate for EUR on 2025-03-14)"));
        assert!(message.contains("7 (no exchange rate for USD on 2025-07-02)"));
    }

    #[test]
    fn config_error_carries_offending_value() {
        let err = ConfigError::RateOutOfRange {
            name: "flat_rate",
            value: dec!(1.5),
        };

        assert_eq!(err.to_string(), "rate 'flat_rate' must be between 0 and 1, got 1.5");
    }
}
