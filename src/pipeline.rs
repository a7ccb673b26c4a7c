// src/pipeline.rs
use reqwest::Client;
use tokio::time::Instant;
use tracing::{info, instrument};

use crate::config::{RunConfig, SiteConfig};
use crate::error::Result;
use crate::fetch::{self, DownloadLink, ProductLink};
use crate::holdings::{self, HeaderRow};
use crate::output;

/// What a successful run found along the way.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub product: ProductLink,
    pub download: DownloadLink,
    pub header: HeaderRow,
    pub written: usize,
    pub dropped: usize,
    pub skipped: usize,
    pub corrected: usize,
}

/// Listing → product page → holdings file → ticker list on disk.
///
/// Stops at the first failing stage; the output file is only touched once
/// every stage has succeeded.
#[instrument(level = "info", skip_all, fields(slug = %run.slug, output = %run.output.display()))]
pub async fn run(client: &Client, site: &SiteConfig, run: &RunConfig) -> Result<RunSummary> {
    let start = Instant::now();

    let product = fetch::locate_product(client, site, &run.slug, &run.search).await?;
    let download = fetch::resolve_download_link(client, site, &product).await?;
    let file = fetch::download_holdings(client, site, &download).await?;

    let header = holdings::locate_header(&file, &run.keyword, run.header_match)?;
    info!(index = header.index, skipped = header.skipped, "header row located");

    let list = holdings::extract_tickers(&file, &header, &run.keyword, &run.rules)?;
    output::write_tickers(&run.output, &list.tickers)?;

    info!(
        written = list.tickers.len(),
        elapsed = ?start.elapsed(),
        "run complete"
    );
    Ok(RunSummary {
        product,
        download,
        header,
        written: list.tickers.len(),
        dropped: list.dropped,
        skipped: list.skipped,
        corrected: list.corrected,
    })
}
