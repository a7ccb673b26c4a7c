// src/holdings/mod.rs
//! Holdings file handling: find where the table starts, then pull the
//! ticker column out of it.

pub mod extract;
pub mod header;

use reqwest::Client;
use tracing::instrument;

use crate::config::SiteConfig;
use crate::error::Result;
use crate::fetch::{self, DownloadLink};
use crate::tickers::{SuffixRules, Ticker};

pub use extract::extract_tickers;
pub use header::locate_header;

/// Raw holdings payload, downloaded once and parsed twice.
#[derive(Debug, Clone)]
pub struct HoldingsFile {
    /// Where the bytes came from; used in error messages.
    pub source: String,
    pub bytes: Vec<u8>,
}

impl HoldingsFile {
    pub fn new(source: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: source.into(),
            bytes: bytes.into(),
        }
    }
}

/// How the header row is recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderMatch {
    /// Keyword appears anywhere in the line.
    #[default]
    Substring,
    /// Keyword is one of the line's comma-separated fields.
    Field,
}

/// Location of the column header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    /// Zero-based record index; blank lines are not counted.
    pub index: usize,
    /// One-based line the header record starts on. Record boundaries differ
    /// between the `;` and `,` readings of the file, lines do not.
    pub line: u64,
    pub keyword: String,
    /// Malformed records passed over while scanning.
    pub skipped: usize,
}

/// Extracted, corrected symbols plus what happened on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerList {
    pub tickers: Vec<Ticker>,
    /// Data rows read after the header.
    pub rows: usize,
    /// Rows whose value was not a symbol (blank, N/A, footnotes).
    pub dropped: usize,
    /// Rows with more fields than the header.
    pub skipped: usize,
    /// Symbols rewritten by the suffix rules.
    pub corrected: usize,
}

/// Download `link` and locate its header row.
#[instrument(level = "info", skip(client, site), fields(url = %link))]
pub async fn fetch_header_row(
    client: &Client,
    site: &SiteConfig,
    link: &DownloadLink,
    keyword: &str,
    mode: HeaderMatch,
) -> Result<HeaderRow> {
    let file = fetch::download_holdings(client, site, link).await?;
    locate_header(&file, keyword, mode)
}

/// Download `link` and extract the `column` values below `header`.
#[instrument(level = "info", skip(client, site, header, rules), fields(url = %link))]
pub async fn fetch_tickers(
    client: &Client,
    site: &SiteConfig,
    link: &DownloadLink,
    header: &HeaderRow,
    column: &str,
    rules: &SuffixRules,
) -> Result<TickerList> {
    let file = fetch::download_holdings(client, site, link).await?;
    extract_tickers(&file, header, column, rules)
}
