//! Side-by-side fund comparison

use crate::core::error::EngineError;
use crate::core::fund::{FundRecord, PeriodReturns};
use crate::core::store::StoreSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const MIN_COMPARE_FUNDS: usize = 2;
pub const MAX_COMPARE_FUNDS: usize = 5;

/// Which blocks a comparison projection carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    Performance,
    Risk,
    Fees,
    #[default]
    All,
}

impl Focus {
    fn includes_performance(&self) -> bool {
        matches!(self, Focus::Performance | Focus::All)
    }

    fn includes_risk(&self) -> bool {
        matches!(self, Focus::Risk | Focus::All)
    }

    fn includes_fees(&self) -> bool {
        matches!(self, Focus::Fees | Focus::All)
    }
}

impl Display for Focus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Focus::Performance => "performance",
                Focus::Risk => "risk",
                Focus::Fees => "fees",
                Focus::All => "all",
            }
        )
    }
}

impl FromStr for Focus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "performance" => Ok(Focus::Performance),
            "risk" => Ok(Focus::Risk),
            "fees" => Ok(Focus::Fees),
            "all" => Ok(Focus::All),
            _ => Err(EngineError::InvalidArgument(format!(
                "comparison focus must be one of performance, risk, fees, all; got '{s}'"
            ))),
        }
    }
}

/// A comparison request: 2 to 5 unique symbols plus a focus.
#[derive(Debug, Clone)]
pub struct ComparisonSpec {
    pub symbols: Vec<String>,
    pub focus: Focus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReturns {
    pub name: String,
    #[serde(flatten)]
    pub returns: PeriodReturns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub risk_level: u8,
    pub fund_classification: String,
    pub management_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentMinimums {
    pub initial: Option<f64>,
    pub additional: Option<f64>,
}

/// One fund's slice of a comparison. Identity fields are always present;
/// the optional blocks follow the requested focus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundComparison {
    pub symbol: String,
    pub fund_name: String,
    pub amc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PeriodReturns>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkReturns>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_minimums: Option<InvestmentMinimums>,
}

/// Assembles projections for 2-5 funds, preserving the caller's symbol
/// order.
///
/// All-or-nothing: the first unresolved symbol fails the whole comparison,
/// so a caller can never mistake a silently dropped fund for a missing one.
pub fn compare(
    snapshot: &StoreSnapshot,
    spec: &ComparisonSpec,
) -> Result<Vec<FundComparison>, EngineError> {
    if spec.symbols.len() < MIN_COMPARE_FUNDS || spec.symbols.len() > MAX_COMPARE_FUNDS {
        return Err(EngineError::InvalidArgument(format!(
            "comparison requires {MIN_COMPARE_FUNDS} to {MAX_COMPARE_FUNDS} funds, got {}",
            spec.symbols.len()
        )));
    }

    let mut funds = Vec::with_capacity(spec.symbols.len());
    for symbol in &spec.symbols {
        let fund = snapshot
            .get(symbol)
            .ok_or_else(|| EngineError::FundNotFound(symbol.clone()))?;
        funds.push(fund);
    }

    Ok(funds
        .into_iter()
        .map(|fund| project(fund, spec.focus))
        .collect())
}

fn project(fund: &FundRecord, focus: Focus) -> FundComparison {
    let mut projection = FundComparison {
        symbol: fund.symbol.clone(),
        fund_name: fund.fund_name.clone(),
        amc: fund.amc.clone(),
        nav_value: None,
        performance: None,
        benchmark: None,
        risk: None,
        fees: None,
        investment_minimums: None,
    };

    if focus.includes_performance() {
        projection.nav_value = Some(fund.nav_value);
        projection.performance = Some(PeriodReturns::performance_of(fund));
        projection.benchmark = fund.benchmark_name.as_ref().map(|name| BenchmarkReturns {
            name: name.clone(),
            returns: PeriodReturns::benchmark_of(fund),
        });
    }

    if focus.includes_risk() {
        projection.risk = Some(RiskProfile {
            risk_level: fund.risk_level,
            fund_classification: fund.fund_classification.clone(),
            management_style: fund.management_style.clone(),
        });
    }

    if focus.includes_fees() {
        // Fee block is present even when the factsheet reported nothing.
        projection.fees = Some(fund.fees.clone().unwrap_or(serde_json::Value::Null));
        projection.investment_minimums = Some(InvestmentMinimums {
            initial: fund.investment_min_initial,
            additional: fund.investment_min_additional,
        });
    }

    projection
}
