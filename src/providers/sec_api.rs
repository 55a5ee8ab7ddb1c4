//! Thai SEC fund data client
//!
//! Talks to the SEC FundFactsheet/FundDailyInfo feeds, retries transient
//! failures and caches responses until the next daily NAV publication. The
//! feed emits catalog rows in the snapshot schema; anything beyond
//! deserializing them is out of scope here.

use crate::core::cache::KeyValueCollection;
use crate::core::fund::{FundRecord, NavHistoryPoint};
use crate::providers::util::{seconds_until, with_retry};
use crate::providers::{FundDataProvider, SnapshotData};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// SEC publishes end-of-day NAVs in the Bangkok evening; cached responses
/// expire shortly after (13:30 UTC = 20:30 ICT).
const REFRESH_HOUR_UTC: u32 = 13;
const REFRESH_MINUTE_UTC: u32 = 30;

pub struct SecApiProvider {
    base_url: String,
    api_key: String,
    history_days: usize,
    cache: Arc<dyn KeyValueCollection>,
}

#[derive(Debug, Deserialize)]
struct SecNavRow {
    nav_date: String,
    #[serde(default)]
    last_val: Option<f64>,
    #[serde(default)]
    previous_val: Option<f64>,
}

impl SecApiProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        history_days: usize,
        cache: Arc<dyn KeyValueCollection>,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            history_days,
            cache,
        }
    }

    fn client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder().user_agent("rmfx/0.1").build()?)
    }

    fn cache_ttl(&self) -> Duration {
        let ttl_seconds = match seconds_until(REFRESH_HOUR_UTC, REFRESH_MINUTE_UTC) {
            Ok(ttl) => ttl,
            Err(e) => {
                warn!(
                    "Failed calculating NAV refresh TTL: {}. Using fallback 1 day",
                    e
                );
                24 * 60 * 60
            }
        };
        Duration::from_secs(ttl_seconds)
    }

    /// Fetches the full RMF catalog.
    pub async fn fetch_funds(&self) -> Result<Vec<FundRecord>> {
        if let Some(cached) = self.cache.get(b"funds").await {
            return Ok(serde_json::from_slice(&cached)?);
        }

        let url = format!("{}/FundFactsheet/fund", self.base_url);
        debug!("Requesting fund catalog from {}", url);

        let client = self.client()?;
        let response = with_retry(
            || async {
                client
                    .post(&url)
                    .header("Ocp-Apim-Subscription-Key", &self.api_key)
                    .json(&serde_json::json!({ "keyword": "RMF" }))
                    .send()
                    .await
            },
            3,
            500,
        )
        .await
        .context("Failed to query SEC fund catalog")?;

        let response_text = response
            .text()
            .await
            .context("Failed to read SEC fund catalog response")?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty response for SEC fund catalog"));
        }

        let funds: Vec<FundRecord> = serde_json::from_str(&response_text)
            .with_context(|| format!("Failed to parse SEC fund catalog. Response: '{response_text}'"))?;
        debug!("Fetched {} funds from SEC", funds.len());

        self.cache
            .put(
                b"funds",
                &serde_json::to_vec(&funds)?,
                Some(self.cache_ttl()),
            )
            .await;

        Ok(funds)
    }

    /// Fetches one fund's daily NAV series, newest first.
    pub async fn fetch_nav_history(
        &self,
        symbol: &str,
        days: usize,
    ) -> Result<Vec<NavHistoryPoint>> {
        let cache_key = format!("nav:{symbol}:{days}");
        if let Some(cached) = self.cache.get(cache_key.as_bytes()).await {
            return Ok(serde_json::from_slice(&cached)?);
        }

        let url = format!("{}/FundDailyInfo/{}/dailynav", self.base_url, symbol);
        debug!("Requesting NAV history from {}", url);

        let client = self.client()?;
        let response = with_retry(
            || async {
                client
                    .get(&url)
                    .query(&[("days", days)])
                    .header("Ocp-Apim-Subscription-Key", &self.api_key)
                    .send()
                    .await
            },
            3,
            500,
        )
        .await
        .with_context(|| format!("Failed to query NAV history for {symbol}"))?;

        let rows: Vec<SecNavRow> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse NAV history for {symbol}"))?;

        let mut series: Vec<NavHistoryPoint> = rows
            .into_iter()
            .filter_map(|row| {
                match chrono::NaiveDate::parse_from_str(&row.nav_date, "%Y-%m-%d") {
                    Ok(date) => Some(NavHistoryPoint {
                        date,
                        nav: row.last_val,
                        previous_nav: row.previous_val,
                    }),
                    Err(e) => {
                        debug!(
                            "Skipping NAV row with bad date '{}' for {}: {}",
                            row.nav_date, symbol, e
                        );
                        None
                    }
                }
            })
            .collect();

        series.sort_by(|a, b| b.date.cmp(&a.date));

        self.cache
            .put(
                cache_key.as_bytes(),
                &serde_json::to_vec(&series)?,
                Some(self.cache_ttl()),
            )
            .await;

        Ok(series)
    }
}

#[async_trait]
impl FundDataProvider for SecApiProvider {
    async fn fetch_snapshot(&self) -> Result<SnapshotData> {
        let funds = self.fetch_funds().await?;
        let mut nav_history = HashMap::new();
        for fund in &funds {
            match self.fetch_nav_history(&fund.symbol, self.history_days).await {
                Ok(series) if !series.is_empty() => {
                    nav_history.insert(fund.symbol.clone(), series);
                }
                Ok(_) => {}
                Err(e) => warn!("NAV history unavailable for {}: {}", fund.symbol, e),
            }
        }
        Ok(SnapshotData { funds, nav_history })
    }
}
