use std::sync::Arc;
use tracing::info;

use rmfx::core::query::{QuerySpec, SortField, search};
use rmfx::core::store::{FundStore, StoreSnapshot};
use rmfx::core::{Period, nav, rank};
use rmfx::providers::FundDataProvider;
use rmfx::providers::file::{FileProvider, SnapshotFile};
use rmfx::providers::sec_api::SecApiProvider;
use rmfx::store::MemoryCollection;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const CATALOG_JSON: &str = r#"[
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
            "perf_ytd": 3.5,
            "perf_1y": 8.2
        },
        {
            "symbol": "KGBRMF",
            "fund_name": "Krungsri Global Bond RMF",
            "amc": "Krungsri Asset Management",
            "fund_classification": "Fixed Income",
            "management_style": "Active",
            "dividend_policy": "No Dividend",
            "risk_level": 4,
            "nav_value": 11.2101,
            "nav_change": -0.01,
            "nav_change_percent": -0.09,
            "nav_date": "2024-01-15",
            "perf_ytd": 1.1,
            "perf_1y": 2.4
        },
        {
            "symbol": "TMEQRMF",
            "fund_name": "Thai Mid Cap Equity RMF",
            "amc": "Thai Asset Management",
            "fund_classification": "Equity",
            "management_style": "Passive",
            "dividend_policy": "No Dividend",
            "risk_level": 6,
            "nav_value": 9.8700,
            "nav_change": 0.05,
            "nav_change_percent": 0.51,
            "nav_date": "2024-01-15"
        }
    ]"#;

    pub async fn create_sec_mock_server() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/FundFactsheet/fund"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG_JSON))
            .mount(&server)
            .await;

        let nav_body = r#"[
            { "nav_date": "2024-01-15", "last_val": 15.4321, "previous_val": 15.3121 },
            { "nav_date": "2024-01-12", "last_val": 15.3121, "previous_val": 15.3000 },
            { "nav_date": "2024-01-11", "last_val": 15.3000, "previous_val": 15.2500 }
        ]"#;
        Mock::given(method("GET"))
            .and(path("/FundDailyInfo/ABAPAC-RMF/dailynav"))
            .respond_with(ResponseTemplate::new(200).set_body_string(nav_body))
            .mount(&server)
            .await;

        // Other funds have no published history.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        server
    }
}

#[test_log::test(tokio::test)]
async fn test_refresh_then_serve_flow() {
    let mock_server = test_utils::create_sec_mock_server().await;

    // Refresh: SEC feed -> snapshot file.
    let provider = SecApiProvider::new(
        &mock_server.uri(),
        "test-key",
        30,
        Arc::new(MemoryCollection::new()),
    );
    let data = provider.fetch_snapshot().await.unwrap();
    assert_eq!(data.funds.len(), 3);
    assert_eq!(data.nav_history.len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    SnapshotFile {
        funds: data.funds,
        nav_history: data.nav_history,
    }
    .write(&path)
    .await
    .unwrap();

    // Serve: snapshot file -> store -> engine.
    let data = FileProvider::new(&path).fetch_snapshot().await.unwrap();
    let store = FundStore::new(StoreSnapshot::from(data));
    let snapshot = store.snapshot();
    info!("Loaded {} funds from snapshot", snapshot.len());

    let result = search(
        &snapshot,
        &QuerySpec {
            category: Some("Equity".to_string()),
            sort_field: Some(SortField::Ytd),
            ..QuerySpec::default()
        },
    );
    assert_eq!(result.total_count, 2);
    // Performance sorts default descending; the fund without a YTD value
    // goes last.
    assert_eq!(result.funds[0].symbol, "ABAPAC-RMF");
    assert_eq!(result.funds[1].symbol, "TMEQRMF");

    let view = nav::analyze(&snapshot, "ABAPAC-RMF", 30).unwrap();
    let stats = view.stats.unwrap();
    assert_eq!(view.series.len(), 3);
    assert!(stats.period_return.unwrap() > 0.0);

    let no_history = nav::analyze(&snapshot, "KGBRMF", 30).unwrap();
    assert!(no_history.stats.is_none());
    assert!(no_history.series.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_search_filters_compose_conjunctively() {
    let dir = write_snapshot().await;
    let data = FileProvider::new(dir.path().join("snapshot.json"))
        .fetch_snapshot()
        .await
        .unwrap();
    let snapshot = StoreSnapshot::from(data);

    // Each filter narrows the previous result.
    let all = search(&snapshot, &QuerySpec::default());
    assert_eq!(all.total_count, 3);

    let equity = search(
        &snapshot,
        &QuerySpec {
            category: Some("Equity".to_string()),
            ..QuerySpec::default()
        },
    );
    assert_eq!(equity.total_count, 2);

    let equity_with_ytd = search(
        &snapshot,
        &QuerySpec {
            category: Some("Equity".to_string()),
            min_ytd_return: Some(0.0),
            ..QuerySpec::default()
        },
    );
    // TMEQRMF has no YTD value and is excluded by the threshold.
    assert_eq!(equity_with_ytd.total_count, 1);
    assert_eq!(equity_with_ytd.funds[0].symbol, "ABAPAC-RMF");

    let amc_search = search(
        &snapshot,
        &QuerySpec {
            category: Some("Equity".to_string()),
            amc: Some("aberdeen".to_string()),
            ..QuerySpec::default()
        },
    );
    assert_eq!(amc_search.total_count, 1);
}

#[test_log::test(tokio::test)]
async fn test_pagination_partitions_results() {
    let dir = write_snapshot().await;
    let data = FileProvider::new(dir.path().join("snapshot.json"))
        .fetch_snapshot()
        .await
        .unwrap();
    let snapshot = StoreSnapshot::from(data);

    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = search(
            &snapshot,
            &QuerySpec {
                page,
                page_size: 1,
                sort_field: Some(SortField::Name),
                ..QuerySpec::default()
            },
        );
        assert_eq!(result.total_count, 3);
        seen.extend(result.funds.iter().map(|f| f.symbol.clone()));
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 3);

    let past_end = search(
        &snapshot,
        &QuerySpec {
            page: 4,
            page_size: 1,
            ..QuerySpec::default()
        },
    );
    assert!(past_end.funds.is_empty());
    assert_eq!(past_end.total_count, 3);
}

#[test_log::test(tokio::test)]
async fn test_top_performers_excludes_missing_values() {
    let dir = write_snapshot().await;
    let data = FileProvider::new(dir.path().join("snapshot.json"))
        .fetch_snapshot()
        .await
        .unwrap();
    let snapshot = StoreSnapshot::from(data);

    let ranked = rank::top_performers(
        &snapshot,
        Period::Ytd,
        None,
        rmfx::core::query::SortOrder::Desc,
        10,
    );

    // TMEQRMF publishes no YTD figure and must not be ranked.
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].symbol, "ABAPAC-RMF");
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].symbol, "KGBRMF");
    assert_eq!(ranked[1].rank, 2);
}

async fn write_snapshot() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let funds: Vec<rmfx::core::FundRecord> =
        serde_json::from_str(test_utils::CATALOG_JSON).unwrap();
    SnapshotFile {
        funds,
        nav_history: Default::default(),
    }
    .write(&path)
    .await
    .unwrap();
    dir
}
