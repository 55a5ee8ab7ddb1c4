//! Fund record types shared by the store and the query engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Performance reporting period for RMF funds.
///
/// Each period maps to a fixed pair of record fields (fund performance and
/// benchmark performance). Unknown period strings are rejected at the
/// boundary, so engine code can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Ytd,
    ThreeMonth,
    SixMonth,
    OneYear,
    ThreeYear,
    FiveYear,
    TenYear,
}

/// All rankable periods, in reporting order.
pub const ALL_PERIODS: [Period; 7] = [
    Period::Ytd,
    Period::ThreeMonth,
    Period::SixMonth,
    Period::OneYear,
    Period::ThreeYear,
    Period::FiveYear,
    Period::TenYear,
];

impl Period {
    /// Human readable label, e.g. "3-Month".
    pub fn label(&self) -> &'static str {
        match self {
            Period::Ytd => "YTD",
            Period::ThreeMonth => "3-Month",
            Period::SixMonth => "6-Month",
            Period::OneYear => "1-Year",
            Period::ThreeYear => "3-Year",
            Period::FiveYear => "5-Year",
            Period::TenYear => "10-Year",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::Ytd => "ytd",
                Period::ThreeMonth => "3m",
                Period::SixMonth => "6m",
                Period::OneYear => "1y",
                Period::ThreeYear => "3y",
                Period::FiveYear => "5y",
                Period::TenYear => "10y",
            }
        )
    }
}

impl FromStr for Period {
    type Err = crate::core::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ytd" => Ok(Period::Ytd),
            "3m" => Ok(Period::ThreeMonth),
            "6m" => Ok(Period::SixMonth),
            "1y" => Ok(Period::OneYear),
            "3y" => Ok(Period::ThreeYear),
            "5y" => Ok(Period::FiveYear),
            "10y" => Ok(Period::TenYear),
            _ => Err(crate::core::error::EngineError::UnknownPeriod(
                s.to_string(),
            )),
        }
    }
}

/// A single RMF fund as published in a store snapshot.
///
/// Records are immutable once a snapshot is built. Absent performance and
/// benchmark values stay `None`; zero is a valid return and is never used as
/// a stand-in for "unknown". The `*_json` style blobs from the upstream
/// factsheet are carried verbatim as `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    pub symbol: String,
    pub fund_name: String,
    pub amc: String,
    pub fund_classification: String,
    pub management_style: String,
    pub dividend_policy: String,
    /// SEC risk spectrum, 1 (lowest) to 8 (highest).
    pub risk_level: u8,

    pub nav_value: f64,
    pub nav_change: f64,
    pub nav_change_percent: f64,
    pub nav_date: NaiveDate,
    #[serde(default)]
    pub buy_price: Option<f64>,
    #[serde(default)]
    pub sell_price: Option<f64>,

    #[serde(default)]
    pub perf_ytd: Option<f64>,
    #[serde(default)]
    pub perf_3m: Option<f64>,
    #[serde(default)]
    pub perf_6m: Option<f64>,
    #[serde(default)]
    pub perf_1y: Option<f64>,
    #[serde(default)]
    pub perf_3y: Option<f64>,
    #[serde(default)]
    pub perf_5y: Option<f64>,
    #[serde(default)]
    pub perf_10y: Option<f64>,
    #[serde(default)]
    pub perf_since_inception: Option<f64>,

    #[serde(default)]
    pub benchmark_name: Option<String>,
    #[serde(default)]
    pub benchmark_ytd: Option<f64>,
    #[serde(default)]
    pub benchmark_3m: Option<f64>,
    #[serde(default)]
    pub benchmark_6m: Option<f64>,
    #[serde(default)]
    pub benchmark_1y: Option<f64>,
    #[serde(default)]
    pub benchmark_3y: Option<f64>,
    #[serde(default)]
    pub benchmark_5y: Option<f64>,
    #[serde(default)]
    pub benchmark_10y: Option<f64>,

    #[serde(default)]
    pub asset_allocation: Option<serde_json::Value>,
    #[serde(default)]
    pub fees: Option<serde_json::Value>,
    #[serde(default)]
    pub parties: Option<serde_json::Value>,
    #[serde(default)]
    pub holdings: Option<serde_json::Value>,
    #[serde(default)]
    pub risk_factors: Option<serde_json::Value>,
    #[serde(default)]
    pub suitability: Option<serde_json::Value>,

    #[serde(default)]
    pub factsheet_url: Option<String>,
    #[serde(default)]
    pub annual_report_url: Option<String>,
    #[serde(default)]
    pub halfyear_report_url: Option<String>,

    #[serde(default)]
    pub investment_min_initial: Option<f64>,
    #[serde(default)]
    pub investment_min_additional: Option<f64>,
}

impl FundRecord {
    /// Fund performance for a period, `None` when unreported.
    pub fn performance(&self, period: Period) -> Option<f64> {
        match period {
            Period::Ytd => self.perf_ytd,
            Period::ThreeMonth => self.perf_3m,
            Period::SixMonth => self.perf_6m,
            Period::OneYear => self.perf_1y,
            Period::ThreeYear => self.perf_3y,
            Period::FiveYear => self.perf_5y,
            Period::TenYear => self.perf_10y,
        }
    }

    /// Benchmark performance for a period, `None` when the fund has no
    /// benchmark or the benchmark did not report for this period.
    pub fn benchmark(&self, period: Period) -> Option<f64> {
        self.benchmark_name.as_ref()?;
        match period {
            Period::Ytd => self.benchmark_ytd,
            Period::ThreeMonth => self.benchmark_3m,
            Period::SixMonth => self.benchmark_6m,
            Period::OneYear => self.benchmark_1y,
            Period::ThreeYear => self.benchmark_3y,
            Period::FiveYear => self.benchmark_5y,
            Period::TenYear => self.benchmark_10y,
        }
    }
}

/// Per-period returns keyed the way the factsheet reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturns {
    pub ytd: Option<f64>,
    #[serde(rename = "3m")]
    pub three_month: Option<f64>,
    #[serde(rename = "6m")]
    pub six_month: Option<f64>,
    #[serde(rename = "1y")]
    pub one_year: Option<f64>,
    #[serde(rename = "3y")]
    pub three_year: Option<f64>,
    #[serde(rename = "5y")]
    pub five_year: Option<f64>,
    #[serde(rename = "10y")]
    pub ten_year: Option<f64>,
}

impl PeriodReturns {
    pub fn performance_of(fund: &FundRecord) -> Self {
        Self {
            ytd: fund.perf_ytd,
            three_month: fund.perf_3m,
            six_month: fund.perf_6m,
            one_year: fund.perf_1y,
            three_year: fund.perf_3y,
            five_year: fund.perf_5y,
            ten_year: fund.perf_10y,
        }
    }

    pub fn benchmark_of(fund: &FundRecord) -> Self {
        Self {
            ytd: fund.benchmark_ytd,
            three_month: fund.benchmark_3m,
            six_month: fund.benchmark_6m,
            one_year: fund.benchmark_1y,
            three_year: fund.benchmark_3y,
            five_year: fund.benchmark_5y,
            ten_year: fund.benchmark_10y,
        }
    }
}

/// One day of NAV history, ordered newest-first within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavHistoryPoint {
    pub date: NaiveDate,
    /// NAV for the day; `None` when the fund did not publish.
    #[serde(default)]
    pub nav: Option<f64>,
    #[serde(default)]
    pub previous_nav: Option<f64>,
}

impl NavHistoryPoint {
    /// Day-over-day NAV change when both values are present.
    pub fn change(&self) -> Option<f64> {
        Some(self.nav? - self.previous_nav?)
    }
}
