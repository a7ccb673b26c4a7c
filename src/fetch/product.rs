// src/fetch/product.rs
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, instrument, warn};
use url::Url;

use super::{absolute, get_page, selector, DownloadLink, ProductLink};
use crate::config::{SiteConfig, PASSTHROUGH_PARAMS};
use crate::error::{Error, Result, Stage};

const SNIPPET_CHARS: usize = 400;

/// Pull the holdings export link out of a product page.
pub fn find_download_link(html: &str, base: &Url, export: &Selector) -> Option<DownloadLink> {
    let document = Html::parse_document(html);
    let href = document
        .select(export)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| absolute(base, href));
    href.map(DownloadLink)
}

/// Fetch the product page and resolve its holdings download link.
///
/// This is where a site redesign shows up first, so a miss logs the page
/// status and the start of the body before failing.
#[instrument(level = "info", skip(client, site, product), fields(product = %product))]
pub async fn resolve_download_link(
    client: &Client,
    site: &SiteConfig,
    product: &ProductLink,
) -> Result<DownloadLink> {
    let stage = Stage::LinkResolver;
    let css = site.export_selector();
    let export = selector(stage, &css)?;

    let page = get_page(client, site, stage, product.url(), PASSTHROUGH_PARAMS).await?;

    match find_download_link(&page.body, &site.base_url, &export) {
        Some(link) => {
            info!(%link, "holdings link resolved");
            Ok(link)
        }
        None => {
            warn!(
                url = %page.url,
                status = %page.status,
                snippet = %page.snippet(SNIPPET_CHARS),
                "no holdings export anchor on product page"
            );
            Err(Error::Parse {
                stage,
                source_name: page.url.to_string(),
                expected: format!("anchor matching `{}`", css),
            })
        }
    }
}
