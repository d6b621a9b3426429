//! Interfaces to the external collaborators of the tax engine.
//!
//! The engine is a pure function of externally supplied data; everything it
//! reads arrives through the traits in this module, injected as
//! `Arc<dyn …>`. `memory` provides in-process implementations used by
//! tests and by callers that assemble data without a database.

pub mod currency;
pub mod events;
pub mod memory;
pub mod rates;
pub mod settings;

use thiserror::Error;

pub use currency::{ConversionError, CurrencyConverter};
pub use events::{ExpenseSource, IncomeSource};
pub use memory::MemoryProviders;
pub use rates::{RateProvider, RateTableStore};
pub use settings::SettingsProvider;

/// Errors from the data providers backing the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("record not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}
