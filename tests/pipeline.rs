use std::{fs, time::Duration};

use holdscrape::{
    config::DEFAULT_LISTING_PATH,
    fetch::{self, DownloadLink},
    holdings::{self, HeaderMatch},
    tickers::SuffixRules,
    Error, ErrorKind, RunConfig, SiteConfig, Stage,
};
use httpmock::prelude::*;
use tempfile::tempdir;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;

const PRODUCT_PATH: &str = "/uk/professional/en/products/239714/ishares-russell-3000-etf";
const HOLDINGS_PATH: &str = "/us/products/239714/ishares-russell-3000-etf/1467271812596.ajax";

const LISTING: &str = r#"<html><body><table><tbody>
<tr><td class="links"><a href="/uk/professional/en/products/253743/ishares-sp-500">S&amp;P 500</a></td></tr>
<tr><td class="links"><a href="/uk/professional/en/products/239714/ishares-russell-3000-etf">Russell 3000</a></td></tr>
</tbody></table></body></html>"#;

const PRODUCT: &str = r#"<html><body>
<a class="icon-xls-export" data-link-event="holdings:holdings"
   href="/us/products/239714/ishares-russell-3000-etf/1467271812596.ajax?fileType=csv&amp;fileName=IWV_holdings">Detailed Holdings</a>
</body></html>"#;

const REDESIGNED_PRODUCT: &str = r#"<html><body>
<button class="download" data-holdings="csv">Download holdings</button>
</body></html>"#;

const HOLDINGS: &str = "iShares Russell 3000 ETF\n\
Fund Holdings as of,\"Oct 17, 2026\"\n\
Shares Outstanding,\"13,150,000.00\"\n\
Ticker,Name,Weight\n\
AAPL,Apple Inc,5.0\n\
BRKB,Berkshire Hathaway,4.0\n\
N/A,,0.0\n";

fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,holdscrape=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn site_for(server: &MockServer) -> SiteConfig {
    let mut site = SiteConfig::new(Url::parse(&server.base_url()).unwrap());
    site.timeout = Duration::from_secs(5);
    site
}

async fn mock_listing(server: &MockServer, body: &'static str) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(DEFAULT_LISTING_PATH)
                .query_param_exists("search")
                .query_param("productView", "all")
                .query_param("sortColumn", "totalFundSizeInMillions")
                .query_param("sortDirection", "desc")
                .query_param("switchLocale", "y");
            then.status(200)
                .header("content-type", "text/html")
                .body(body);
        })
        .await;
}

async fn mock_product(server: &MockServer, body: &'static str) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(PRODUCT_PATH)
                .query_param("siteEntryPassthrough", "true");
            then.status(200)
                .header("content-type", "text/html")
                .body(body);
        })
        .await;
}

async fn mock_holdings(server: &MockServer, body: &'static str) {
    server
        .mock_async(|when, then| {
            when.method(GET).path(HOLDINGS_PATH);
            then.status(200)
                .header("content-type", "text/csv")
                .body(body);
        })
        .await;
}

#[tokio::test]
async fn writes_corrected_ticker_list() {
    init_test_logging();
    let server = MockServer::start_async().await;
    mock_listing(&server, LISTING).await;
    mock_product(&server, PRODUCT).await;
    mock_holdings(&server, HOLDINGS).await;

    let dir = tempdir().unwrap();
    let out = dir.path().join("ru3000.tls");
    let site = site_for(&server);
    let run = RunConfig::new("russell-3000", &out);
    let client = fetch::build_client(&site).unwrap();

    let summary = holdscrape::run(&client, &site, &run).await.unwrap();

    assert_eq!(fs::read_to_string(&out).unwrap(), "AAPL\nBRK-B\n");
    assert_eq!(summary.header.index, 3);
    assert_eq!(summary.header.line, 4);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.corrected, 1);
    assert!(summary.product.url().path().ends_with("ishares-russell-3000-etf"));
    assert_eq!(summary.download.url().path(), HOLDINGS_PATH);
}

#[tokio::test]
async fn unknown_slug_aborts_before_writing() {
    init_test_logging();
    let server = MockServer::start_async().await;
    mock_listing(&server, LISTING).await;

    let dir = tempdir().unwrap();
    let out = dir.path().join("ru3000.tls");
    let site = site_for(&server);
    let mut run = RunConfig::new("russell-1000", &out);
    run.search = "russell 3000".into();
    let client = fetch::build_client(&site).unwrap();

    let err = holdscrape::run(&client, &site, &run).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Data);
    assert_eq!(err.stage(), Stage::ProductLocator);
    assert!(err.to_string().contains("russell-1000"), "{err}");
    assert!(!out.exists());
}

#[tokio::test]
async fn missing_export_anchor_is_parse_error() {
    init_test_logging();
    let server = MockServer::start_async().await;
    mock_listing(&server, LISTING).await;
    mock_product(&server, REDESIGNED_PRODUCT).await;

    let dir = tempdir().unwrap();
    let out = dir.path().join("ru3000.tls");
    fs::write(&out, "PREVIOUS\n").unwrap();
    let site = site_for(&server);
    let run = RunConfig::new("russell-3000", &out);
    let client = fetch::build_client(&site).unwrap();

    let err = holdscrape::run(&client, &site, &run).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.stage(), Stage::LinkResolver);
    let msg = err.to_string();
    assert!(msg.contains("icon-xls-export"), "{msg}");
    assert!(msg.contains("holdings:holdings"), "{msg}");
    // previous run's output untouched
    assert_eq!(fs::read_to_string(&out).unwrap(), "PREVIOUS\n");
}

/// Run against holdings `body` with an existing output file; return the
/// error and the output file's contents afterwards.
async fn run_over_previous_output(body: &'static str) -> (Error, String) {
    let server = MockServer::start_async().await;
    mock_listing(&server, LISTING).await;
    mock_product(&server, PRODUCT).await;
    mock_holdings(&server, body).await;

    let dir = tempdir().unwrap();
    let out = dir.path().join("ru3000.tls");
    fs::write(&out, "PREVIOUS\n").unwrap();
    let site = site_for(&server);
    let run = RunConfig::new("russell-3000", &out);
    let client = fetch::build_client(&site).unwrap();

    let err = holdscrape::run(&client, &site, &run).await.unwrap_err();
    (err, fs::read_to_string(&out).unwrap())
}

#[tokio::test]
async fn holdings_without_header_keep_previous_output() {
    init_test_logging();
    let body = "iShares Russell 3000 ETF\nSymbol,Name,Weight\nAAPL,Apple Inc,5.0\n";

    let (err, previous) = run_over_previous_output(body).await;

    assert_eq!(err.kind(), ErrorKind::Data);
    assert_eq!(err.stage(), Stage::HeaderLocator);
    assert!(err.to_string().contains("Ticker"), "{err}");
    assert_eq!(previous, "PREVIOUS\n");
}

#[tokio::test]
async fn holdings_without_ticker_column_keep_previous_output() {
    init_test_logging();
    let body = "iShares Russell 3000 ETF\nTicker Symbol,Name,Weight\nAAPL,Apple Inc,5.0\n";

    let (err, previous) = run_over_previous_output(body).await;

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.stage(), Stage::TickerExtractor);
    assert!(err.to_string().contains("column 'Ticker'"), "{err}");
    assert_eq!(previous, "PREVIOUS\n");
}

#[tokio::test]
async fn slow_listing_times_out() {
    init_test_logging();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(DEFAULT_LISTING_PATH);
            then.status(200)
                .delay(Duration::from_secs(3))
                .body(LISTING);
        })
        .await;

    let dir = tempdir().unwrap();
    let mut site = site_for(&server);
    site.timeout = Duration::from_millis(200);
    let run = RunConfig::new("russell-3000", dir.path().join("ru3000.tls"));
    let client = fetch::build_client(&site).unwrap();

    let err = holdscrape::run(&client, &site, &run).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(matches!(err, Error::Timeout { .. }), "{err:?}");
}

#[tokio::test]
async fn server_error_is_network_error() {
    init_test_logging();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(DEFAULT_LISTING_PATH);
            then.status(503).body("maintenance");
        })
        .await;

    let dir = tempdir().unwrap();
    let site = site_for(&server);
    let run = RunConfig::new("russell-3000", dir.path().join("ru3000.tls"));
    let client = fetch::build_client(&site).unwrap();

    let err = holdscrape::run(&client, &site, &run).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(matches!(err, Error::Status { .. }), "{err:?}");
    assert_eq!(err.stage(), Stage::ProductLocator);
}

#[tokio::test]
async fn stages_can_be_driven_from_download_url() {
    init_test_logging();
    let server = MockServer::start_async().await;
    mock_holdings(&server, HOLDINGS).await;

    let site = site_for(&server);
    let client = fetch::build_client(&site).unwrap();
    let link = DownloadLink(Url::parse(&server.url(HOLDINGS_PATH)).unwrap());

    let header =
        holdings::fetch_header_row(&client, &site, &link, "Ticker", HeaderMatch::Substring)
            .await
            .unwrap();
    assert_eq!(header.index, 3);

    let list = holdings::fetch_tickers(
        &client,
        &site,
        &link,
        &header,
        "Ticker",
        &SuffixRules::default(),
    )
    .await
    .unwrap();
    let symbols: Vec<_> = list.tickers.iter().map(|t| t.to_string()).collect();
    assert_eq!(symbols, ["AAPL", "BRK-B"]);
}
