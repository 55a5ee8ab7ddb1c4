//! Engine error taxonomy
//!
//! Engine operations fail fast on bad arguments or unresolvable symbols.
//! Empty results are values, never errors: a page past the end, a fund with
//! no NAV history or a search with no matches all come back as empty
//! structures.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Period string does not name a known performance period.
    #[error("unknown performance period: {0}")]
    UnknownPeriod(String),

    /// Malformed or out-of-range request argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Symbol does not resolve against the current snapshot.
    #[error("fund not found: {0}")]
    FundNotFound(String),
}
