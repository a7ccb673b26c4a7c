// src/main.rs
use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use holdscrape::{
    config::{self, RunConfig, SiteConfig},
    fetch,
    holdings::HeaderMatch,
    tickers::SuffixRules,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Download an index's constituents from the provider's holdings export
/// and write them as a plain ticker list.
#[derive(Parser, Debug)]
#[command(name = "holdscrape", version)]
struct Cli {
    /// Slug that must appear in the product page URL.
    #[arg(long, default_value = config::DEFAULT_SLUG)]
    slug: String,

    /// Listing search term. Defaults to the slug with dashes as spaces.
    #[arg(long)]
    search: Option<String>,

    /// Header keyword, also the name of the column to extract.
    #[arg(long, default_value = config::DEFAULT_KEYWORD)]
    keyword: String,

    /// Output file, overwritten on every run.
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Provider origin that relative links are resolved against.
    #[arg(long, default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Path of the product listing page.
    #[arg(long, default_value = config::DEFAULT_LISTING_PATH)]
    listing_path: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Symbol needing a class-suffix separator (repeatable or comma separated).
    /// Replaces the built-in list when given.
    #[arg(long = "suffix-ticker", value_delimiter = ',')]
    suffix_tickers: Vec<String>,

    /// Separator inserted before the class letter.
    #[arg(long, default_value_t = holdscrape::tickers::DEFAULT_SEPARATOR)]
    separator: char,

    /// Require the keyword to be a whole header field, not just a substring.
    #[arg(long)]
    strict_header: bool,
}

impl Cli {
    fn into_configs(self) -> Result<(SiteConfig, RunConfig)> {
        let base_url = Url::parse(&self.base_url)
            .with_context(|| format!("parsing base URL {}", self.base_url))?;

        let mut site = SiteConfig::new(base_url);
        site.listing_path = self.listing_path;
        site.user_agent = self.user_agent;
        site.timeout = Duration::from_secs(self.timeout_secs);

        let mut run = RunConfig::new(self.slug, self.output);
        if let Some(search) = self.search {
            run.search = search;
        }
        run.keyword = self.keyword;
        if self.strict_header {
            run.header_match = HeaderMatch::Field;
        }
        run.rules = if self.suffix_tickers.is_empty() {
            SuffixRules::default().with_separator(self.separator)
        } else {
            SuffixRules::new(self.suffix_tickers, self.separator)
        };

        Ok((site, run))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // ─── logging ─────────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── config ──────────────────────────────────────────────────────
    let (site, run) = match Cli::parse().into_configs() {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    let client = match fetch::build_client(&site).context("building HTTP client") {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(slug = %run.slug, search = %run.search, output = %run.output.display(), "startup");

    // ─── pipeline ────────────────────────────────────────────────────
    match holdscrape::run(&client, &site, &run).await {
        Ok(summary) => {
            info!(
                product = %summary.product,
                download = %summary.download,
                header = summary.header.index,
                written = summary.written,
                dropped = summary.dropped,
                skipped = summary.skipped,
                corrected = summary.corrected,
                "all done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(stage = %e.stage(), kind = ?e.kind(), "{}", e);
            ExitCode::from(e.kind().exit_code())
        }
    }
}
