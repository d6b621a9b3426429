//! Decimal extraction helpers for SQLite rows.
//!
//! SQLite has no decimal type; monetary columns are stored as REAL (or end
//! up INTEGER when the value happens to be whole), so reads have to accept
//! both affinities.

use pit_core::ProviderError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{Row, TypeInfo, ValueRef};

/// Reads a decimal column, accepting INTEGER, REAL and NULL (as zero).
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, ProviderError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| ProviderError::Storage(format!("column '{}' not found: {}", column, e)))?;

    match value_ref.type_info().name() {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                ProviderError::Storage(format!("failed to get INTEGER from '{}': {}", column, e))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                ProviderError::Storage(format!("failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                ProviderError::Storage(format!("failed to convert {} to Decimal: {}", val, e))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        other => Err(ProviderError::Storage(format!(
            "unexpected type '{}' for column '{}'",
            other, column
        ))),
    }
}

/// Reads an optional decimal column; NULL maps to `None`.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, ProviderError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| ProviderError::Storage(format!("column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Converts a decimal to f64 for storage in a REAL column.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
