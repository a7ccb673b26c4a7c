// src/fetch/listing.rs
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, trace};
use url::Url;

use super::{absolute, get_page, ProductLink};
use crate::config::{SiteConfig, LISTING_PARAMS, PASSTHROUGH_PARAMS};
use crate::error::{Error, Result, Stage};

/// Scan the listing table for the first product link containing `slug`.
pub fn find_product_link(html: &str, base: &Url, slug: &str) -> Option<ProductLink> {
    let document = Html::parse_document(html);
    let rows = Selector::parse("tr").expect("row selector should parse");
    let links = Selector::parse("td.links a[href]").expect("link selector should parse");

    let found = document
        .select(&rows)
        .filter_map(|row| row.select(&links).next())
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| absolute(base, href))
        .inspect(|url| trace!(%url, "listed product"))
        .find(|url| url.as_str().contains(slug));
    found.map(ProductLink)
}

/// Search the product listing and return the page for `slug`.
#[instrument(level = "info", skip(client, site))]
pub async fn locate_product(
    client: &Client,
    site: &SiteConfig,
    slug: &str,
    search: &str,
) -> Result<ProductLink> {
    let stage = Stage::ProductLocator;
    let listing = site
        .base_url
        .join(&site.listing_path)
        .map_err(|e| Error::Parse {
            stage,
            source_name: site.base_url.to_string(),
            expected: format!("valid listing path '{}' ({})", site.listing_path, e),
        })?;

    let mut params: Vec<(&str, &str)> = PASSTHROUGH_PARAMS.to_vec();
    params.extend_from_slice(LISTING_PARAMS);
    params.push(("search", search));

    let page = get_page(client, site, stage, &listing, &params).await?;
    debug!(status = %page.status, bytes = page.body.len(), "listing fetched");

    match find_product_link(&page.body, &site.base_url, slug) {
        Some(link) => {
            info!(%link, "product page found");
            Ok(link)
        }
        None => Err(Error::NotFound {
            stage,
            what: "slug",
            needle: slug.to_string(),
            source_name: page.url.to_string(),
        }),
    }
}
