//! Shared fund fixtures for engine unit tests

use crate::core::fund::FundRecord;
use chrono::NaiveDate;

/// A plain fund record with sensible defaults; tests override what they need.
pub(crate) fn fund(symbol: &str) -> FundRecord {
    FundRecord {
        symbol: symbol.to_string(),
        fund_name: format!("{symbol} Retirement Fund"),
        amc: "Krung Thai Asset Management".to_string(),
        fund_classification: "Equity".to_string(),
        management_style: "Active".to_string(),
        dividend_policy: "No Dividend".to_string(),
        risk_level: 6,
        nav_value: 10.0,
        nav_change: 0.0,
        nav_change_percent: 0.0,
        nav_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        buy_price: None,
        sell_price: None,
        perf_ytd: None,
        perf_3m: None,
        perf_6m: None,
        perf_1y: None,
        perf_3y: None,
        perf_5y: None,
        perf_10y: None,
        perf_since_inception: None,
        benchmark_name: None,
        benchmark_ytd: None,
        benchmark_3m: None,
        benchmark_6m: None,
        benchmark_1y: None,
        benchmark_3y: None,
        benchmark_5y: None,
        benchmark_10y: None,
        asset_allocation: None,
        fees: None,
        parties: None,
        holdings: None,
        risk_factors: None,
        suitability: None,
        factsheet_url: None,
        annual_report_url: None,
        halfyear_report_url: None,
        investment_min_initial: None,
        investment_min_additional: None,
    }
}
