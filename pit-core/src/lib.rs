pub mod calculations;
pub mod error;
pub mod models;
pub mod providers;

pub use error::{ComputeError, ConfigError, MonthFailure};
pub use models::*;
pub use providers::{ConversionError, ProviderError};
