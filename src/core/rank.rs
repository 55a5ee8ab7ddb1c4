//! Rank funds by period performance against their benchmarks

use crate::core::fund::{FundRecord, Period};
use crate::core::query::SortOrder;
use crate::core::store::StoreSnapshot;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Benchmark comparison for one ranked fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub name: String,
    /// Benchmark return for the ranked period, when reported.
    pub performance: Option<f64>,
    /// Fund return minus benchmark return, rounded to 2 decimal places.
    /// `None` when either side is unknown.
    pub outperformance: Option<f64>,
}

/// One entry of a performance ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFund {
    /// 1-indexed position in the final ordering.
    pub rank: usize,
    pub symbol: String,
    pub fund_name: String,
    pub amc: String,
    pub risk_level: u8,
    pub performance: f64,
    pub nav_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkComparison>,
}

/// Ranks funds by their return over `period`.
///
/// Funds without a reported value for the period are excluded up front, so
/// a missing return can never rank as zero. Ties keep store order; `desc`
/// puts the best performer first.
pub fn top_performers(
    snapshot: &StoreSnapshot,
    period: Period,
    risk_level: Option<u8>,
    order: SortOrder,
    limit: usize,
) -> Vec<RankedFund> {
    let mut ranked: Vec<(&FundRecord, f64)> = snapshot
        .funds()
        .iter()
        .filter(|fund| risk_level.is_none_or(|level| fund.risk_level == level))
        .filter_map(|fund| fund.performance(period).map(|value| (fund, value)))
        .collect();

    ranked.sort_by(|(_, a), (_, b)| {
        let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (fund, value))| RankedFund {
            rank: index + 1,
            symbol: fund.symbol.clone(),
            fund_name: fund.fund_name.clone(),
            amc: fund.amc.clone(),
            risk_level: fund.risk_level,
            performance: value,
            nav_value: fund.nav_value,
            benchmark: fund.benchmark_name.as_ref().map(|name| {
                let benchmark = fund.benchmark(period);
                BenchmarkComparison {
                    name: name.clone(),
                    performance: benchmark,
                    outperformance: benchmark.map(|b| round2(value - b)),
                }
            }),
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
