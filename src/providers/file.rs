//! Snapshot file provider
//!
//! Serves the catalog from a local JSON snapshot, the format `rmfx refresh`
//! writes. This is the normal serving path: the MCP server reads one file at
//! startup and never touches the network.

use crate::core::fund::{FundRecord, NavHistoryPoint};
use crate::providers::{FundDataProvider, SnapshotData};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk snapshot layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub funds: Vec<FundRecord>,
    #[serde(default)]
    pub nav_history: HashMap<String, Vec<NavHistoryPoint>>,
}

impl SnapshotFile {
    pub async fn read(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
        let snapshot: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse snapshot file: {}", path.display()))?;
        debug!(
            "Read snapshot with {} funds from {}",
            snapshot.funds.len(),
            path.display()
        );
        Ok(snapshot)
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let raw = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, raw)
            .await
            .with_context(|| format!("Failed to write snapshot file: {}", path.display()))?;
        debug!("Wrote snapshot with {} funds to {}", self.funds.len(), path.display());
        Ok(())
    }
}

pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FundDataProvider for FileProvider {
    async fn fetch_snapshot(&self) -> Result<SnapshotData> {
        let snapshot = SnapshotFile::read(&self.path).await?;
        Ok(SnapshotData {
            funds: snapshot.funds,
            nav_history: snapshot.nav_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_json() -> &'static str {
        r#"{
            "funds": [
                {
                    "symbol": "ABAPAC-RMF",
                    "fund_name": "ABA Pacific Equity RMF",
                    "amc": "Aberdeen Asset Management",
                    "fund_classification": "Equity",
                    "management_style": "Active",
                    "dividend_policy": "No Dividend",
                    "risk_level": 6,
                    "nav_value": 15.4321,
                    "nav_change": 0.12,
                    "nav_change_percent": 0.78,
                    "nav_date": "2024-01-15",
                    "perf_ytd": 3.5
                }
            ],
            "nav_history": {
                "ABAPAC-RMF": [
                    { "date": "2024-01-15", "nav": 15.4321, "previous_nav": 15.3121 }
                ]
            }
        }"#
    }

    #[tokio::test]
    async fn test_read_snapshot_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        tokio::fs::write(file.path(), sample_json()).await.unwrap();

        let provider = FileProvider::new(file.path());
        let data = provider.fetch_snapshot().await.unwrap();

        assert_eq!(data.funds.len(), 1);
        let fund = &data.funds[0];
        assert_eq!(fund.symbol, "ABAPAC-RMF");
        assert_eq!(fund.perf_ytd, Some(3.5));
        // Fields absent from the file stay unknown, not zero.
        assert_eq!(fund.perf_1y, None);
        assert_eq!(fund.nav_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let series = &data.nav_history["ABAPAC-RMF"];
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].nav, Some(15.4321));
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots/rmf.json");

        let original = SnapshotFile::read(write_sample(&dir).await.as_path())
            .await
            .unwrap();
        original.write(&path).await.unwrap();

        let reread = SnapshotFile::read(&path).await.unwrap();
        assert_eq!(reread.funds, original.funds);
        assert_eq!(reread.nav_history, original.nav_history);
    }

    async fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("sample.json");
        tokio::fs::write(&path, sample_json()).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_file_errors_with_path() {
        let provider = FileProvider::new("/nonexistent/rmf.json");
        let err = provider.fetch_snapshot().await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rmf.json"));
    }
}
