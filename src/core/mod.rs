//! Core fund catalog engine: store, query, ranking, NAV analytics

pub mod cache;
pub mod compare;
pub mod error;
pub mod fund;
pub mod nav;
pub mod query;
pub mod rank;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types for cleaner imports
pub use error::EngineError;
pub use fund::{FundRecord, NavHistoryPoint, Period, PeriodReturns};
pub use store::{FundStore, StoreSnapshot};
