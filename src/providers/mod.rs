//! Fund data providers
//!
//! Providers produce the snapshot the engine serves. All I/O happens here,
//! before the store publishes anything; engine operations never fetch.

pub mod file;
pub mod sec_api;
pub mod util;

use crate::core::fund::{FundRecord, NavHistoryPoint};
use crate::core::store::StoreSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Everything needed to build one store snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotData {
    pub funds: Vec<FundRecord>,
    /// NAV series per symbol, newest first.
    pub nav_history: HashMap<String, Vec<NavHistoryPoint>>,
}

impl From<SnapshotData> for StoreSnapshot {
    fn from(data: SnapshotData) -> Self {
        StoreSnapshot::new(data.funds, data.nav_history)
    }
}

#[async_trait]
pub trait FundDataProvider: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<SnapshotData>;
}
