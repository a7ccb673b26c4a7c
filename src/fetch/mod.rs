// src/fetch/mod.rs
//! HTTP side of the pipeline: the listing page, the product page and the
//! holdings download.

pub mod listing;
pub mod product;

use std::fmt;

use reqwest::{Client, StatusCode};
use scraper::Selector;
use tracing::{debug, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::error::{Error, Result, Stage};
use crate::holdings::HoldingsFile;

pub use listing::{find_product_link, locate_product};
pub use product::{find_download_link, resolve_download_link};

/// Product detail page for the target index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLink(pub Url);

/// Direct link to the holdings export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink(pub Url);

impl ProductLink {
    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl DownloadLink {
    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for ProductLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for DownloadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Client with the site's user agent and request timeout.
pub fn build_client(site: &SiteConfig) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(site.user_agent.as_str())
        .timeout(site.timeout)
        .cookie_store(true)
        .gzip(true)
        .build()
}

/// A fetched HTML page.
#[derive(Debug)]
pub(crate) struct Page {
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

impl Page {
    /// First `max` chars of the body, whitespace collapsed, for diagnostics.
    pub fn snippet(&self, max: usize) -> String {
        self.body
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(max)
            .collect()
    }
}

async fn send(
    client: &Client,
    site: &SiteConfig,
    stage: Stage,
    url: &Url,
    params: &[(&str, &str)],
) -> Result<reqwest::Response> {
    debug!(%url, %stage, "GET");
    let resp = client
        .get(url.clone())
        .query(params)
        .send()
        .await
        .map_err(|e| Error::from_reqwest(stage, url.as_str(), site.timeout, e))?;

    let status = resp.status();
    if !status.is_success() {
        warn!(%url, %status, %stage, "non-success status");
        return Err(Error::Status {
            stage,
            url: resp.url().to_string(),
            status,
        });
    }
    Ok(resp)
}

pub(crate) async fn get_page(
    client: &Client,
    site: &SiteConfig,
    stage: Stage,
    url: &Url,
    params: &[(&str, &str)],
) -> Result<Page> {
    let resp = send(client, site, stage, url, params).await?;
    let final_url = resp.url().clone();
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| Error::from_reqwest(stage, final_url.as_str(), site.timeout, e))?;
    debug!(url = %final_url, %status, bytes = body.len(), "page fetched");
    Ok(Page {
        url: final_url,
        status,
        body,
    })
}

/// Fetch the holdings file into memory.
pub async fn download_holdings(
    client: &Client,
    site: &SiteConfig,
    link: &DownloadLink,
) -> Result<HoldingsFile> {
    let stage = Stage::Download;
    let resp = send(client, site, stage, link.url(), &[]).await?;
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| Error::from_reqwest(stage, link.url().as_str(), site.timeout, e))?;
    debug!(url = %link, bytes = bytes.len(), "holdings downloaded");
    Ok(HoldingsFile::new(link.url().as_str(), bytes.to_vec()))
}

pub(crate) fn selector(stage: Stage, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse {
        stage,
        source_name: "selector configuration".to_string(),
        expected: format!("valid CSS selector `{}` ({:?})", css, e),
    })
}

/// Resolve `href` against the site origin.
pub(crate) fn absolute(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}
