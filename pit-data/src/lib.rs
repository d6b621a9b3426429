mod loader;

pub use loader::{
    HealthBracketLoader, HealthBracketRecord, RateTableLoaderError, ZusRatesLoader, ZusRatesRecord,
};
