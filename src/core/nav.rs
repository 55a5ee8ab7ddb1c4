//! NAV history windows and derived statistics

use crate::core::error::EngineError;
use crate::core::fund::NavHistoryPoint;
use crate::core::store::StoreSnapshot;
use serde::{Deserialize, Serialize};

/// Longest NAV history window a caller can request.
pub const MAX_HISTORY_DAYS: usize = 365;
/// Window when the caller does not ask for one.
pub const DEFAULT_HISTORY_DAYS: usize = 30;

/// One day of history with derived day-over-day change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavHistoryEntry {
    pub date: chrono::NaiveDate,
    pub nav: Option<f64>,
    pub previous_nav: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

/// Statistics over the reported NAV values in a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavStats {
    /// Min/max/average are 0.0 when no NAV values are reported in the
    /// window; this zero policy is deliberate and distinct from the
    /// "no history at all" case, which has no stats block.
    pub min_nav: f64,
    pub max_nav: f64,
    pub avg_nav: f64,
    /// Percent return between the chronological endpoints of the window.
    /// `None` when either endpoint is unreported or the oldest NAV is not
    /// positive.
    pub period_return: Option<f64>,
    /// Standard deviation of consecutive daily fractional returns, as a
    /// percentage. Population form (divide by N, not N-1) — a deliberate
    /// simplification, not sample statistics. `None` with fewer than two
    /// reported NAV points.
    pub volatility: Option<f64>,
}

/// NAV history for one fund, windowed and analyzed.
///
/// An empty `series` with `stats: None` means the fund has no history at
/// all; callers must not confuse that with a flat NAV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavHistoryView {
    pub symbol: String,
    pub fund_name: String,
    /// Effective window after clamping.
    pub days: usize,
    pub series: Vec<NavHistoryEntry>,
    pub stats: Option<NavStats>,
}

/// Windows the fund's NAV series to `days` (clamped to [1, 365]) and
/// computes statistics over it. Fails only when the symbol is unknown.
pub fn analyze(
    snapshot: &StoreSnapshot,
    symbol: &str,
    days: usize,
) -> Result<NavHistoryView, EngineError> {
    let fund = snapshot
        .get(symbol)
        .ok_or_else(|| EngineError::FundNotFound(symbol.to_string()))?;

    let days = days.clamp(1, MAX_HISTORY_DAYS);
    let window = snapshot.nav_history(symbol, days);

    let series: Vec<NavHistoryEntry> = window
        .iter()
        .map(|point| {
            let change = point.change();
            let change_percent = match (point.nav, point.previous_nav) {
                (Some(nav), Some(prev)) if prev > 0.0 => Some((nav - prev) / prev * 100.0),
                _ => None,
            };
            NavHistoryEntry {
                date: point.date,
                nav: point.nav,
                previous_nav: point.previous_nav,
                change,
                change_percent,
            }
        })
        .collect();

    let stats = if window.is_empty() {
        None
    } else {
        Some(compute_stats(window))
    };

    Ok(NavHistoryView {
        symbol: symbol.to_string(),
        fund_name: fund.fund_name.clone(),
        days,
        series,
        stats,
    })
}

fn compute_stats(window: &[NavHistoryPoint]) -> NavStats {
    let values: Vec<f64> = window.iter().filter_map(|p| p.nav).collect();

    let (min_nav, max_nav, avg_nav) = if values.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        (min, max, avg)
    };

    // Window is newest-first: first entry is the newest NAV, last the oldest.
    let period_return = match (
        window.first().and_then(|p| p.nav),
        window.last().and_then(|p| p.nav),
    ) {
        (Some(newest), Some(oldest)) if oldest > 0.0 => {
            Some((newest - oldest) / oldest * 100.0)
        }
        _ => None,
    };

    let daily_returns: Vec<f64> = window
        .windows(2)
        .filter_map(|pair| match (pair[0].nav, pair[1].nav) {
            (Some(curr), Some(prev)) if prev > 0.0 => Some((curr - prev) / prev),
            _ => None,
        })
        .collect();

    let volatility = if daily_returns.is_empty() {
        None
    } else {
        let mean = daily_returns.iter().sum::<f64>() / daily_returns.len() as f64;
        let variance = daily_returns
            .iter()
            .map(|r| (r - mean).powi(2))
            .sum::<f64>()
            / daily_returns.len() as f64;
        Some(variance.sqrt() * 100.0)
    };

    NavStats {
        min_nav,
        max_nav,
        avg_nav,
        period_return,
        volatility,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::fund;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn point(d: u32, nav: Option<f64>) -> NavHistoryPoint {
        NavHistoryPoint {
            date: day(d),
            nav,
            previous_nav: None,
        }
    }

    fn snapshot_with(series: Vec<NavHistoryPoint>) -> StoreSnapshot {
        let mut history = HashMap::new();
        history.insert("A-RMF".to_string(), series);
        StoreSnapshot::new(vec![fund("A-RMF")], history)
    }

    #[test]
    fn test_unknown_symbol_is_not_found() {
        let snap = snapshot_with(vec![]);
        let err = analyze(&snap, "NOPE-RMF", 30).unwrap_err();
        assert_eq!(err, EngineError::FundNotFound("NOPE-RMF".to_string()));
    }

    #[test]
    fn test_no_history_is_distinct_from_flat_nav() {
        let snap = snapshot_with(vec![]);
        let view = analyze(&snap, "A-RMF", 30).unwrap();
        assert!(view.series.is_empty());
        assert!(view.stats.is_none());

        let flat = snapshot_with(vec![point(3, Some(10.0)), point(2, Some(10.0))]);
        let view = analyze(&flat, "A-RMF", 30).unwrap();
        assert!(view.stats.is_some());
        assert_eq!(view.stats.unwrap().period_return, Some(0.0));
    }

    #[test]
    fn test_period_return_and_volatility_scenario() {
        // Newest-first: (d3, 102), (d2, 100), (d1, 100)
        let snap = snapshot_with(vec![
            point(3, Some(102.0)),
            point(2, Some(100.0)),
            point(1, Some(100.0)),
        ]);
        let view = analyze(&snap, "A-RMF", 3).unwrap();
        let stats = view.stats.unwrap();

        // (102 - 100) / 100 * 100 = 2.00%
        assert!((stats.period_return.unwrap() - 2.0).abs() < 1e-9);

        // Daily returns [0.02, 0.0], population stdev 0.01 -> 1.00%
        assert!((stats.volatility.unwrap() - 1.0).abs() < 1e-9);
        assert!(stats.volatility.unwrap() >= 0.0);

        assert_eq!(stats.min_nav, 100.0);
        assert_eq!(stats.max_nav, 102.0);
        assert!((stats.avg_nav - 100.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn test_volatility_requires_two_reported_points() {
        let single = snapshot_with(vec![point(3, Some(102.0))]);
        let stats = analyze(&single, "A-RMF", 30).unwrap().stats.unwrap();
        assert_eq!(stats.volatility, None);
        assert_eq!(stats.period_return, Some(0.0));

        let gap = snapshot_with(vec![point(3, Some(102.0)), point(2, None)]);
        let stats = analyze(&gap, "A-RMF", 30).unwrap().stats.unwrap();
        assert_eq!(stats.volatility, None);
    }

    #[test]
    fn test_missing_endpoint_means_no_period_return() {
        let snap = snapshot_with(vec![
            point(3, None),
            point(2, Some(101.0)),
            point(1, Some(100.0)),
        ]);
        let stats = analyze(&snap, "A-RMF", 30).unwrap().stats.unwrap();
        assert_eq!(stats.period_return, None);
        // The interior pair still yields a volatility sample.
        assert!(stats.volatility.is_some());
    }

    #[test]
    fn test_all_values_absent_yields_zero_aggregates() {
        let snap = snapshot_with(vec![point(2, None), point(1, None)]);
        let stats = analyze(&snap, "A-RMF", 30).unwrap().stats.unwrap();
        assert_eq!(stats.min_nav, 0.0);
        assert_eq!(stats.max_nav, 0.0);
        assert_eq!(stats.avg_nav, 0.0);
        assert_eq!(stats.period_return, None);
        assert_eq!(stats.volatility, None);
    }

    #[test]
    fn test_days_clamped_to_maximum() {
        let series: Vec<_> = (1..=20).rev().map(|d| point(d, Some(d as f64))).collect();
        let snap = snapshot_with(series);

        let view = analyze(&snap, "A-RMF", 10_000).unwrap();
        assert_eq!(view.days, MAX_HISTORY_DAYS);
        assert_eq!(view.series.len(), 20);

        let short = analyze(&snap, "A-RMF", 5).unwrap();
        assert_eq!(short.days, 5);
        assert_eq!(short.series.len(), 5);
        // Window keeps the newest points.
        assert_eq!(short.series[0].date, day(20));
    }

    #[test]
    fn test_series_change_fields() {
        let snap = snapshot_with(vec![NavHistoryPoint {
            date: day(3),
            nav: Some(102.0),
            previous_nav: Some(100.0),
        }]);
        let view = analyze(&snap, "A-RMF", 30).unwrap();
        let entry = &view.series[0];
        assert!((entry.change.unwrap() - 2.0).abs() < 1e-9);
        assert!((entry.change_percent.unwrap() - 2.0).abs() < 1e-9);
    }
}
