//! Integration tests for the Yahoo source against a mock chart server

use ag_marketdata::{
    FetcherConfig, MarketDataError, PriceFetcher, PriceSource, RateLimiterConfig, RetryConfig,
    YahooConfig, YahooSource,
};
use ag_sector_risk::{Period, Sector, Ticker};
use chrono::NaiveDate;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHART: &str = r#"{
    "chart": {
        "result": [{
            "meta": {"currency": "USD", "gmtoffset": -18000},
            "timestamp": [1704205800, 1704292200, 1704378600, 1704465000],
            "indicators": {
                "quote": [{"close": [185.64, 184.25, null, 181.18]}],
                "adjclose": [{"adjclose": [184.73, 183.35, null, 180.30]}]
            }
        }],
        "error": null
    }
}"#;

fn period() -> Period {
    Period::parse("2024-01-01", "2024-01-31").unwrap()
}

fn source(server: &MockServer) -> YahooSource {
    YahooSource::new(YahooConfig::with_endpoint(server.uri())).unwrap()
}

fn fast_fetcher(server: &MockServer, max_retries: u32) -> PriceFetcher<YahooSource> {
    PriceFetcher::new(
        source(server),
        FetcherConfig {
            rate_limit: RateLimiterConfig::new(100, 100),
            retry: RetryConfig::fixed(Duration::from_millis(5), max_retries),
        },
    )
}

#[tokio::test]
async fn test_fetch_parses_chart_and_skips_nulls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("interval", "1d"))
        .and(query_param("period1", "1704067200"))
        .and(query_param("includeAdjustedClose", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHART))
        .expect(1)
        .mount(&server)
        .await;

    let series = source(&server)
        .fetch_prices(&Ticker::new("AAPL"), &period())
        .await
        .unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
    assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 5));
    assert_eq!(series.points()[1].close, 183.35);
}

#[tokio::test]
async fn test_unknown_symbol_maps_to_data_retrieval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        ))
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_prices(&Ticker::new("NOPE"), &period())
        .await
        .unwrap_err();

    match err {
        MarketDataError::DataRetrieval { ticker, message } => {
            assert_eq!(ticker.as_str(), "NOPE");
            assert!(message.contains("Not Found"));
        }
        other => panic!("Expected DataRetrieval, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_result_maps_to_empty_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"chart":{"result":[],"error":null}}"#),
        )
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_prices(&Ticker::new("AAPL"), &period())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::EmptyData { .. }));
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_prices(&Ticker::new("AAPL"), &period())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Json(_)));
}

#[tokio::test]
async fn test_fetcher_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/MSFT"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/MSFT"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHART))
        .expect(1)
        .mount(&server)
        .await;

    let series = fast_fetcher(&server, 3)
        .fetch(&Ticker::new("MSFT"), &period())
        .await
        .unwrap();
    assert_eq!(series.len(), 3);
}

#[tokio::test]
async fn test_fetcher_stops_after_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let err = fast_fetcher(&server, 1)
        .fetch(&Ticker::new("SO"), &period())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::HttpStatus { status: 502, .. }));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(CHART)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = YahooConfig {
        timeout_secs: 1,
        ..YahooConfig::with_endpoint(server.uri())
    };
    let err = YahooSource::new(config)
        .unwrap()
        .fetch_prices(&Ticker::new("D"), &period())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Timeout(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_fetch_all_sector() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CHART))
        .expect(5)
        .mount(&server)
        .await;

    let utilities = Sector::utilities();
    let prices = fast_fetcher(&server, 0)
        .fetch_all(utilities.tickers(), &period())
        .await
        .unwrap();

    assert_eq!(prices.len(), 5);
    let tickers: Vec<_> = prices.iter().map(|p| p.ticker().clone()).collect();
    assert_eq!(tickers, utilities.tickers());
}
