//! In-memory fund store with atomic snapshot replacement
//!
//! A snapshot owns its fund records and NAV history for its whole lifetime.
//! Refreshing the store swaps the published `Arc` in one step; readers that
//! already hold a snapshot keep a consistent view until they drop it, so no
//! reader ever observes a partially updated catalog.

use crate::core::fund::{FundRecord, NavHistoryPoint};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// One immutable snapshot of the fund catalog.
pub struct StoreSnapshot {
    funds: Vec<FundRecord>,
    by_symbol: HashMap<String, usize>,
    nav_history: HashMap<String, Vec<NavHistoryPoint>>,
}

impl StoreSnapshot {
    /// Builds a snapshot, indexing funds by symbol in insertion order.
    ///
    /// Symbols are unique within a snapshot. On a duplicate the first record
    /// wins and the later one is dropped with a warning, so a bad upstream
    /// row cannot fail a whole refresh.
    pub fn new(
        funds: Vec<FundRecord>,
        nav_history: HashMap<String, Vec<NavHistoryPoint>>,
    ) -> Self {
        let mut deduped = Vec::with_capacity(funds.len());
        let mut by_symbol = HashMap::with_capacity(funds.len());
        for fund in funds {
            if by_symbol.contains_key(&fund.symbol) {
                warn!("Duplicate fund symbol '{}' dropped from snapshot", fund.symbol);
                continue;
            }
            by_symbol.insert(fund.symbol.clone(), deduped.len());
            deduped.push(fund);
        }
        debug!("Built snapshot with {} funds", deduped.len());
        Self {
            funds: deduped,
            by_symbol,
            nav_history,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), HashMap::new())
    }

    /// Looks up a fund by its symbol.
    pub fn get(&self, symbol: &str) -> Option<&FundRecord> {
        self.by_symbol.get(symbol).map(|&i| &self.funds[i])
    }

    /// All funds in stable insertion order.
    pub fn funds(&self) -> &[FundRecord] {
        &self.funds
    }

    pub fn len(&self) -> usize {
        self.funds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }

    /// NAV history window for a symbol: up to `days` points, newest first.
    /// Unknown symbols and funds without history yield an empty slice.
    pub fn nav_history(&self, symbol: &str, days: usize) -> &[NavHistoryPoint] {
        match self.nav_history.get(symbol) {
            Some(series) => &series[..days.min(series.len())],
            None => &[],
        }
    }
}

/// Shared handle over the current snapshot.
///
/// `snapshot()` is the only read path; engine operations take the returned
/// `Arc<StoreSnapshot>` so a concurrent `replace` cannot shear a single
/// operation across two catalogs.
pub struct FundStore {
    current: RwLock<Arc<StoreSnapshot>>,
}

impl FundStore {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn empty() -> Self {
        Self::new(StoreSnapshot::empty())
    }

    /// Current snapshot for the duration of one operation.
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.current.read().unwrap().clone()
    }

    /// Atomically publishes a new snapshot. Records already handed out via
    /// `snapshot()` are never mutated, only superseded.
    pub fn replace(&self, snapshot: StoreSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write().unwrap() = snapshot;
        debug!("Fund store snapshot replaced");
    }
}

impl Default for FundStore {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::fund;
    use chrono::NaiveDate;

    #[test]
    fn test_lookup_and_order() {
        let snapshot = StoreSnapshot::new(
            vec![fund("B-RMF"), fund("A-RMF"), fund("C-RMF")],
            HashMap::new(),
        );

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get("A-RMF").unwrap().symbol, "A-RMF");
        assert!(snapshot.get("MISSING").is_none());

        // Scan order is insertion order, not sorted.
        let symbols: Vec<_> = snapshot.funds().iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["B-RMF", "A-RMF", "C-RMF"]);
    }

    #[test]
    fn test_duplicate_symbol_first_wins() {
        let mut second = fund("A-RMF");
        second.fund_name = "Impostor".to_string();
        let snapshot = StoreSnapshot::new(vec![fund("A-RMF"), second], HashMap::new());

        assert_eq!(snapshot.len(), 1);
        assert_ne!(snapshot.get("A-RMF").unwrap().fund_name, "Impostor");
    }

    #[test]
    fn test_nav_history_window() {
        let mut history = HashMap::new();
        let points: Vec<_> = (0..5)
            .map(|i| NavHistoryPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 20 - i).unwrap(),
                nav: Some(10.0 + i as f64),
                previous_nav: None,
            })
            .collect();
        history.insert("A-RMF".to_string(), points);
        let snapshot = StoreSnapshot::new(vec![fund("A-RMF")], history);

        let window = snapshot.nav_history("A-RMF", 3);
        assert_eq!(window.len(), 3);
        // Newest first.
        assert_eq!(window[0].date, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());

        assert_eq!(snapshot.nav_history("A-RMF", 100).len(), 5);
        assert!(snapshot.nav_history("B-RMF", 30).is_empty());
    }

    #[test]
    fn test_replace_is_atomic_for_held_snapshots() {
        let store = FundStore::new(StoreSnapshot::new(vec![fund("A-RMF")], HashMap::new()));
        let before = store.snapshot();

        store.replace(StoreSnapshot::new(
            vec![fund("B-RMF"), fund("C-RMF")],
            HashMap::new(),
        ));

        // The held snapshot still sees the old catalog in full.
        assert_eq!(before.len(), 1);
        assert!(before.get("A-RMF").is_some());

        let after = store.snapshot();
        assert_eq!(after.len(), 2);
        assert!(after.get("A-RMF").is_none());
    }
}
