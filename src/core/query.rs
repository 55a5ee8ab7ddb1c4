//! Filter, sort and paginate the fund catalog
//!
//! All filters are conjunctive. Sorting is stable, so funds with equal keys
//! keep their store order, and absent numeric values always rank last no
//! matter the direction. Pagination clamps rather than rejects: an oversized
//! page size is capped and a page past the end is an empty result, not an
//! error.

use crate::core::error::EngineError;
use crate::core::fund::FundRecord;
use crate::core::store::StoreSnapshot;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Hard cap on funds per page.
pub const MAX_PAGE_SIZE: usize = 50;
/// Page size when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(EngineError::InvalidArgument(format!(
                "sort order must be 'asc' or 'desc', got '{s}'"
            ))),
        }
    }
}

/// Sortable fields of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Ytd,
    OneYear,
    ThreeYear,
    FiveYear,
    Nav,
    Name,
    Risk,
}

impl SortField {
    fn is_performance(&self) -> bool {
        matches!(
            self,
            SortField::Ytd | SortField::OneYear | SortField::ThreeYear | SortField::FiveYear
        )
    }

    /// Performance sorts read best-first by default; everything else
    /// ascending.
    pub fn default_order(&self) -> SortOrder {
        if self.is_performance() {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

impl FromStr for SortField {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ytd" => Ok(SortField::Ytd),
            "1y" => Ok(SortField::OneYear),
            "3y" => Ok(SortField::ThreeYear),
            "5y" => Ok(SortField::FiveYear),
            "nav" => Ok(SortField::Nav),
            "name" => Ok(SortField::Name),
            "risk" => Ok(SortField::Risk),
            _ => Err(EngineError::InvalidArgument(format!(
                "unknown sort field '{s}'"
            ))),
        }
    }
}

/// One search request. Built per call, validated and clamped at the tool
/// boundary, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// Case-insensitive substring against fund name or symbol.
    pub search: Option<String>,
    /// Case-insensitive substring against the asset management company.
    pub amc: Option<String>,
    pub min_risk_level: Option<u8>,
    pub max_risk_level: Option<u8>,
    /// Exact match against the fund classification.
    pub category: Option<String>,
    /// Keep only funds whose YTD return is reported and at least this value.
    pub min_ytd_return: Option<f64>,
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    /// 1-indexed page.
    pub page: u32,
    pub page_size: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            search: None,
            amc: None,
            min_risk_level: None,
            max_risk_level: None,
            category: None,
            min_ytd_return: None,
            sort_field: None,
            sort_order: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Matching funds for one page, plus the match count before pagination.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub funds: Vec<FundRecord>,
    pub total_count: usize,
}

/// Runs a query over the snapshot: filter, sort, slice.
pub fn search(snapshot: &StoreSnapshot, spec: &QuerySpec) -> SearchResult {
    let mut matches: Vec<&FundRecord> = snapshot
        .funds()
        .iter()
        .filter(|fund| matches_filters(fund, spec))
        .collect();

    if let Some(field) = spec.sort_field {
        let order = spec.sort_order.unwrap_or_else(|| field.default_order());
        sort_funds(&mut matches, field, order);
    }

    let total_count = matches.len();
    let page_size = spec.page_size.clamp(1, MAX_PAGE_SIZE);
    let page = spec.page.max(1) as usize;

    let funds = matches
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    SearchResult { funds, total_count }
}

fn matches_filters(fund: &FundRecord, spec: &QuerySpec) -> bool {
    if let Some(term) = &spec.search {
        let term = term.to_lowercase();
        if !fund.fund_name.to_lowercase().contains(&term)
            && !fund.symbol.to_lowercase().contains(&term)
        {
            return false;
        }
    }
    if let Some(amc) = &spec.amc
        && !fund.amc.to_lowercase().contains(&amc.to_lowercase())
    {
        return false;
    }
    if let Some(min) = spec.min_risk_level
        && fund.risk_level < min
    {
        return false;
    }
    if let Some(max) = spec.max_risk_level
        && fund.risk_level > max
    {
        return false;
    }
    if let Some(category) = &spec.category
        && fund.fund_classification != *category
    {
        return false;
    }
    if let Some(min_ytd) = spec.min_ytd_return {
        match fund.perf_ytd {
            Some(ytd) if ytd >= min_ytd => {}
            // Unreported YTD never passes a YTD threshold.
            _ => return false,
        }
    }
    true
}

fn sort_funds(funds: &mut [&FundRecord], field: SortField, order: SortOrder) {
    if field == SortField::Name {
        funds.sort_by(|a, b| {
            let ord = a.fund_name.to_lowercase().cmp(&b.fund_name.to_lowercase());
            apply_order(ord, order)
        });
        return;
    }
    funds.sort_by(|a, b| cmp_optional(sort_key(a, field), sort_key(b, field), order));
}

fn sort_key(fund: &FundRecord, field: SortField) -> Option<f64> {
    match field {
        SortField::Ytd => fund.perf_ytd,
        SortField::OneYear => fund.perf_1y,
        SortField::ThreeYear => fund.perf_3y,
        SortField::FiveYear => fund.perf_5y,
        SortField::Nav => Some(fund.nav_value),
        SortField::Risk => Some(fund.risk_level as f64),
        SortField::Name => None,
    }
}

fn apply_order(ord: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

/// Absent values rank last regardless of direction.
fn cmp_optional(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            apply_order(a.partial_cmp(&b).unwrap_or(Ordering::Equal), order)
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
