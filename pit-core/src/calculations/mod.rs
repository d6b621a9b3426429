//! Periodic tax calculations.
//!
//! Leaf modules first: aggregation (`income`, `expenses`, `ytd`), the pure
//! regime math (`engine`, `contributions`), then assembly (`monthly`,
//! `yearly`, `dashboard`). Everything below `monthly` works on unrounded
//! decimals; the monthly builder is the single rounding boundary.

pub mod common;
pub mod contributions;
pub mod dashboard;
pub mod engine;
pub mod expenses;
pub mod income;
pub mod monthly;
pub mod yearly;
pub mod ytd;

pub use contributions::ContributionCalculator;
pub use dashboard::DashboardAssembler;
pub use engine::{PitAssessment, TaxEngine};
pub use expenses::{ExpenseAggregator, ExpenseSummary};
pub use income::{IncomeAggregator, IncomeSummary};
pub use monthly::MonthlyResultBuilder;
pub use yearly::YearlyAggregator;
pub use ytd::{YtdAccumulator, YtdPrior};
