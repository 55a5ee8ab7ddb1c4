//! MCP tools over the fund catalog engine
//!
//! This is the tool dispatch boundary: arguments are defaulted and clamped
//! here, once, so the engine below can assume well-formed input. Every tool
//! responds with a one-line summary followed by a JSON payload.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::schemars::JsonSchema;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Deserialize;
use serde_json::json;

use crate::core::compare::{ComparisonSpec, Focus, compare};
use crate::core::error::EngineError;
use crate::core::fund::{FundRecord, Period, PeriodReturns};
use crate::core::nav::{self, DEFAULT_HISTORY_DAYS};
use crate::core::query::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, QuerySpec, SortField, SortOrder, search,
};
use crate::core::rank::top_performers;
use crate::core::store::FundStore;
use crate::mcp::{SERVER_NAME, SERVER_VERSION};

/// MCP server exposing the Thai RMF catalog.
#[derive(Clone)]
pub struct RmfMcpServer {
    store: Arc<FundStore>,
    tool_router: ToolRouter<Self>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_limit() -> usize {
    20
}

fn default_performance_limit() -> usize {
    10
}

fn default_period() -> String {
    "ytd".to_string()
}

fn default_desc() -> String {
    "desc".to_string()
}

fn default_days() -> usize {
    DEFAULT_HISTORY_DAYS
}

fn default_compare_by() -> String {
    "all".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetFundsParams {
    /// Page number for pagination (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of funds per page (max: 50)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Sort by field: ytd, 1y, 3y, 5y, nav, name, risk
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Sort order: asc or desc
    #[serde(default)]
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchFundsParams {
    /// Search in fund name or symbol
    #[serde(default)]
    pub search: Option<String>,
    /// Filter by Asset Management Company
    #[serde(default)]
    pub amc: Option<String>,
    /// Minimum risk level (1-8)
    #[serde(default)]
    pub min_risk_level: Option<u8>,
    /// Maximum risk level (1-8)
    #[serde(default)]
    pub max_risk_level: Option<u8>,
    /// Filter by fund classification, e.g. "Equity" or "Fixed Income"
    #[serde(default)]
    pub category: Option<String>,
    /// Minimum YTD return percentage
    #[serde(default)]
    pub min_ytd_return: Option<f64>,
    /// Sort by field: ytd, 1y, 3y, 5y, nav, name, risk
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Maximum results (max: 50)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FundDetailParams {
    /// Fund symbol/code (e.g. "ABAPAC-RMF")
    pub fund_code: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FundPerformanceParams {
    /// Performance period: ytd, 3m, 6m, 1y, 3y, 5y, 10y
    #[serde(default = "default_period")]
    pub period: String,
    /// Sort order (desc = best performers first)
    #[serde(default = "default_desc")]
    pub sort_order: String,
    /// Maximum number of funds to return
    #[serde(default = "default_performance_limit")]
    pub limit: usize,
    /// Filter by exact risk level (1-8)
    #[serde(default)]
    pub risk_level: Option<u8>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NavHistoryParams {
    /// Fund symbol/code (e.g. "ABAPAC-RMF")
    pub fund_code: String,
    /// Number of days of history (max: 365)
    #[serde(default = "default_days")]
    pub days: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompareFundsParams {
    /// Fund symbols to compare (2-5 funds)
    pub fund_codes: Vec<String>,
    /// Comparison focus: performance, risk, fees or all
    #[serde(default = "default_compare_by")]
    pub compare_by: String,
}

fn engine_error(err: EngineError) -> McpError {
    match err {
        EngineError::FundNotFound(_) => McpError::resource_not_found(err.to_string(), None),
        EngineError::UnknownPeriod(_) | EngineError::InvalidArgument(_) => {
            McpError::invalid_params(err.to_string(), None)
        }
    }
}

/// Catalog row shared by the list and search tools.
fn fund_row(fund: &FundRecord) -> serde_json::Value {
    json!({
        "symbol": fund.symbol,
        "fund_name": fund.fund_name,
        "amc": fund.amc,
        "nav_value": fund.nav_value,
        "nav_change": fund.nav_change,
        "nav_change_percent": fund.nav_change_percent,
        "risk_level": fund.risk_level,
        "perf_ytd": fund.perf_ytd,
        "perf_1y": fund.perf_1y,
        "perf_3y": fund.perf_3y,
        "fund_classification": fund.fund_classification,
    })
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl RmfMcpServer {
    pub fn new(store: Arc<FundStore>) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    /// Summary line plus pretty JSON payload, the shape every tool returns.
    fn summary_and_json(
        summary: impl Into<String>,
        payload: &serde_json::Value,
    ) -> Result<CallToolResult, McpError> {
        let body = serde_json::to_string_pretty(payload)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![
            Content::text(summary.into()),
            Content::text(body),
        ]))
    }

    fn parse_sort(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<(Option<SortField>, Option<SortOrder>), McpError> {
        let field = sort_by
            .map(str::parse::<SortField>)
            .transpose()
            .map_err(engine_error)?;
        let order = sort_order
            .map(str::parse::<SortOrder>)
            .transpose()
            .map_err(engine_error)?;
        Ok((field, order))
    }
}

#[tool_router]
impl RmfMcpServer {
    /// List RMF funds with pagination and sorting
    #[tool(
        description = "Get a list of Thai Retirement Mutual Funds (RMF) with pagination and sorting"
    )]
    pub async fn get_rmf_funds(
        &self,
        Parameters(params): Parameters<GetFundsParams>,
    ) -> Result<CallToolResult, McpError> {
        let (sort_field, sort_order) =
            Self::parse_sort(params.sort_by.as_deref(), params.sort_order.as_deref())?;

        let page = params.page.max(1);
        let page_size = params.page_size.clamp(1, MAX_PAGE_SIZE);
        let spec = QuerySpec {
            sort_field,
            sort_order,
            page,
            page_size,
            ..QuerySpec::default()
        };

        let snapshot = self.store.snapshot();
        let result = search(&snapshot, &spec);

        let summary = format!(
            "Found {} RMF funds. Showing page {} ({} funds).",
            result.total_count,
            page,
            result.funds.len()
        );
        let payload = json!({
            "funds": result.funds.iter().map(fund_row).collect::<Vec<_>>(),
            "pagination": {
                "page": page,
                "page_size": page_size,
                "total_count": result.total_count,
                "total_pages": result.total_count.div_ceil(page_size),
            },
            "timestamp": timestamp(),
        });
        Self::summary_and_json(summary, &payload)
    }

    /// Search and filter funds
    #[tool(description = "Search and filter Thai RMF funds by multiple criteria")]
    pub async fn search_rmf_funds(
        &self,
        Parameters(params): Parameters<SearchFundsParams>,
    ) -> Result<CallToolResult, McpError> {
        let (sort_field, _) = Self::parse_sort(params.sort_by.as_deref(), None)?;

        let spec = QuerySpec {
            search: params.search.clone(),
            amc: params.amc.clone(),
            min_risk_level: params.min_risk_level,
            max_risk_level: params.max_risk_level,
            category: params.category.clone(),
            min_ytd_return: params.min_ytd_return,
            sort_field,
            sort_order: None,
            page: 1,
            page_size: params.limit.clamp(1, MAX_PAGE_SIZE),
        };

        let snapshot = self.store.snapshot();
        let result = search(&snapshot, &spec);

        let mut filters = Vec::new();
        if let Some(search) = &params.search {
            filters.push(format!("search: \"{search}\""));
        }
        if let Some(amc) = &params.amc {
            filters.push(format!("AMC: \"{amc}\""));
        }
        if let Some(min) = params.min_risk_level {
            filters.push(format!("min risk: {min}"));
        }
        if let Some(max) = params.max_risk_level {
            filters.push(format!("max risk: {max}"));
        }
        if let Some(category) = &params.category {
            filters.push(format!("category: {category}"));
        }
        if let Some(min_ytd) = params.min_ytd_return {
            filters.push(format!("min YTD: {min_ytd}%"));
        }

        let summary = if filters.is_empty() {
            format!("Found {} RMF funds.", result.total_count)
        } else {
            format!(
                "Found {} RMF funds matching filters: {}",
                result.total_count,
                filters.join(", ")
            )
        };
        let payload = json!({
            "funds": result.funds.iter().map(fund_row).collect::<Vec<_>>(),
            "total_count": result.total_count,
            "filters": {
                "search": params.search,
                "amc": params.amc,
                "min_risk_level": params.min_risk_level,
                "max_risk_level": params.max_risk_level,
                "category": params.category,
                "min_ytd_return": params.min_ytd_return,
            },
            "timestamp": timestamp(),
        });
        Self::summary_and_json(summary, &payload)
    }

    /// Full fund detail with a week of NAV history
    #[tool(description = "Get detailed information for a specific Thai RMF fund")]
    pub async fn get_rmf_fund_detail(
        &self,
        Parameters(params): Parameters<FundDetailParams>,
    ) -> Result<CallToolResult, McpError> {
        let snapshot = self.store.snapshot();
        let fund = snapshot
            .get(&params.fund_code)
            .ok_or_else(|| engine_error(EngineError::FundNotFound(params.fund_code.clone())))?;

        let history = nav::analyze(&snapshot, &params.fund_code, 7).map_err(engine_error)?;

        let sign = if fund.nav_change >= 0.0 { "+" } else { "" };
        let summary = format!(
            "{} ({}) managed by {}. Current NAV: {} THB ({}{:.2}%). Risk level: {}/8.",
            fund.fund_name,
            fund.symbol,
            fund.amc,
            fund.nav_value,
            sign,
            fund.nav_change_percent,
            fund.risk_level
        );

        let mut performance = serde_json::to_value(PeriodReturns::performance_of(fund))
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        performance["since_inception"] = json!(fund.perf_since_inception);

        let benchmark = fund.benchmark_name.as_ref().map(|name| {
            json!({
                "name": name,
                "ytd": fund.benchmark_ytd,
                "3m": fund.benchmark_3m,
                "6m": fund.benchmark_6m,
                "1y": fund.benchmark_1y,
                "3y": fund.benchmark_3y,
                "5y": fund.benchmark_5y,
                "10y": fund.benchmark_10y,
            })
        });

        let payload = json!({
            "symbol": fund.symbol,
            "fund_name": fund.fund_name,
            "amc": fund.amc,
            "fund_classification": fund.fund_classification,
            "risk_level": fund.risk_level,
            "management_style": fund.management_style,
            "dividend_policy": fund.dividend_policy,
            "nav_value": fund.nav_value,
            "nav_change": fund.nav_change,
            "nav_change_percent": fund.nav_change_percent,
            "nav_date": fund.nav_date,
            "buy_price": fund.buy_price,
            "sell_price": fund.sell_price,
            "performance": performance,
            "benchmark": benchmark,
            "asset_allocation": fund.asset_allocation,
            "fees": fund.fees,
            "parties": fund.parties,
            "holdings": fund.holdings,
            "risk_factors": fund.risk_factors,
            "suitability": fund.suitability,
            "documents": {
                "factsheet_url": fund.factsheet_url,
                "annual_report_url": fund.annual_report_url,
                "halfyear_report_url": fund.halfyear_report_url,
            },
            "investment_minimums": {
                "initial": fund.investment_min_initial,
                "additional": fund.investment_min_additional,
            },
            "nav_history_7d": history.series,
            "timestamp": timestamp(),
        });
        Self::summary_and_json(summary, &payload)
    }

    /// Top performers for a period
    #[tool(
        description = "Get top performing Thai RMF funds for a specific period with benchmark comparison"
    )]
    pub async fn get_rmf_fund_performance(
        &self,
        Parameters(params): Parameters<FundPerformanceParams>,
    ) -> Result<CallToolResult, McpError> {
        let period: Period = params.period.parse().map_err(engine_error)?;
        let order: SortOrder = params.sort_order.parse().map_err(engine_error)?;

        let snapshot = self.store.snapshot();
        let ranked = top_performers(&snapshot, period, params.risk_level, order, params.limit);

        let summary = match params.risk_level {
            Some(level) => format!(
                "Top {} performing RMF funds for {} (Risk Level {})",
                ranked.len(),
                period.label(),
                level
            ),
            None => format!(
                "Top {} performing RMF funds for {}",
                ranked.len(),
                period.label()
            ),
        };
        let payload = json!({
            "period": period.to_string(),
            "period_label": period.label(),
            "funds": ranked,
            "total_count": ranked.len(),
            "filters": { "risk_level": params.risk_level },
            "timestamp": timestamp(),
        });
        Self::summary_and_json(summary, &payload)
    }

    /// NAV history with derived statistics
    #[tool(
        description = "Get NAV (Net Asset Value) history for a specific Thai RMF fund over time"
    )]
    pub async fn get_rmf_fund_nav_history(
        &self,
        Parameters(params): Parameters<NavHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let snapshot = self.store.snapshot();
        let view =
            nav::analyze(&snapshot, &params.fund_code, params.days).map_err(engine_error)?;

        let Some(stats) = &view.stats else {
            let summary = format!(
                "No NAV history available for {} ({})",
                view.fund_name, view.symbol
            );
            let payload = json!({
                "symbol": view.symbol,
                "fund_name": view.fund_name,
                "message": "No NAV history available",
                "timestamp": timestamp(),
            });
            return Self::summary_and_json(summary, &payload);
        };

        let period_return = stats
            .period_return
            .map_or("N/A".to_string(), |v| format!("{v:.2}%"));
        let volatility = stats
            .volatility
            .map_or("N/A".to_string(), |v| format!("{v:.2}%"));

        let summary = format!(
            "{} ({}) NAV history over {} days. Period return: {}. Volatility: {}.",
            view.fund_name, view.symbol, view.days, period_return, volatility
        );
        let payload = json!({
            "symbol": view.symbol,
            "fund_name": view.fund_name,
            "days": view.days,
            "nav_history": view.series,
            "statistics": {
                "min_nav": format!("{:.4}", stats.min_nav),
                "max_nav": format!("{:.4}", stats.max_nav),
                "avg_nav": format!("{:.4}", stats.avg_nav),
                "period_return": period_return,
                "volatility": volatility,
            },
            "timestamp": timestamp(),
        });
        Self::summary_and_json(summary, &payload)
    }

    /// Side-by-side comparison of 2-5 funds
    #[tool(description = "Compare multiple Thai RMF funds side by side")]
    pub async fn compare_rmf_funds(
        &self,
        Parameters(params): Parameters<CompareFundsParams>,
    ) -> Result<CallToolResult, McpError> {
        let focus: Focus = params.compare_by.parse().map_err(engine_error)?;
        let spec = ComparisonSpec {
            symbols: params.fund_codes.clone(),
            focus,
        };

        let snapshot = self.store.snapshot();
        let projections = compare(&snapshot, &spec).map_err(engine_error)?;

        let summary = format!(
            "Comparing {} RMF funds: {}",
            projections.len(),
            params.fund_codes.join(", ")
        );
        let payload = json!({
            "compare_by": focus.to_string(),
            "fund_count": projections.len(),
            "funds": projections,
            "timestamp": timestamp(),
        });
        Self::summary_and_json(summary, &payload)
    }
}

#[tool_handler]
impl ServerHandler for RmfMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
                title: Some("Thai RMF Fund Catalog".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Thai Retirement Mutual Fund (RMF) catalog. List, search and compare funds, \
                 rank top performers by period, and inspect NAV history with derived statistics."
                    .to_string(),
            ),
        }
    }
}
