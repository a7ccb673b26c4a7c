// src/config.rs
use std::{path::PathBuf, time::Duration};

use url::Url;

use crate::holdings::HeaderMatch;
use crate::tickers::SuffixRules;

pub const DEFAULT_BASE_URL: &str = "https://www.ishares.com";
pub const DEFAULT_LISTING_PATH: &str = "/uk/professional/en/products/etf-investments";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_SLUG: &str = "russell-3000";
pub const DEFAULT_KEYWORD: &str = "Ticker";
pub const DEFAULT_OUTPUT: &str = "ru3000.tls";

pub const EXPORT_CLASS: &str = "icon-xls-export";
pub const EXPORT_ATTR: &str = "data-link-event";
pub const EXPORT_ATTR_VALUE: &str = "holdings:holdings";

/// Query parameters that get us past the locale / investor-type splash page.
pub const PASSTHROUGH_PARAMS: &[(&str, &str)] =
    &[("switchLocale", "y"), ("siteEntryPassthrough", "true")];

/// Listing parameters: every product, biggest funds first, key facts view.
pub const LISTING_PARAMS: &[(&str, &str)] = &[
    ("productView", "all"),
    ("sortColumn", "totalFundSizeInMillions"),
    ("sortDirection", "desc"),
    ("dataView", "keyFacts"),
    ("keyFacts", "all"),
];

/// Where the provider lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: Url,
    pub listing_path: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub export_class: String,
    pub export_attr: String,
    pub export_attr_value: String,
}

impl SiteConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            listing_path: DEFAULT_LISTING_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            export_class: EXPORT_CLASS.to_string(),
            export_attr: EXPORT_ATTR.to_string(),
            export_attr_value: EXPORT_ATTR_VALUE.to_string(),
        }
    }

    /// CSS selector for the holdings export anchor on a product page.
    pub fn export_selector(&self) -> String {
        format!(
            r#"a.{}[{}="{}"]"#,
            self.export_class, self.export_attr, self.export_attr_value
        )
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        // constant, always parses
        Self::new(Url::parse(DEFAULT_BASE_URL).expect("default base URL should parse"))
    }
}

/// What to look for and where to put it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub slug: String,
    pub search: String,
    pub keyword: String,
    pub header_match: HeaderMatch,
    pub rules: SuffixRules,
    pub output: PathBuf,
}

impl RunConfig {
    pub fn new(slug: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        let slug = slug.into();
        Self {
            search: search_term_for(&slug),
            slug,
            keyword: DEFAULT_KEYWORD.to_string(),
            header_match: HeaderMatch::default(),
            rules: SuffixRules::default(),
            output: output.into(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SLUG, DEFAULT_OUTPUT)
    }
}

/// "russell-3000" → "russell 3000"
pub fn search_term_for(slug: &str) -> String {
    slug.replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_derived_from_slug() {
        assert_eq!(search_term_for("russell-3000"), "russell 3000");
        assert_eq!(RunConfig::default().search, "russell 3000");
    }

    #[test]
    fn export_selector_combines_class_and_attribute() {
        let site = SiteConfig::default();
        assert_eq!(
            site.export_selector(),
            r#"a.icon-xls-export[data-link-event="holdings:holdings"]"#
        );
    }
}
