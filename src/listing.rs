//! Listing-page crawler: venue URLs plus price/location hints from the cards.

use crate::config::Config;
use crate::constants::EXCLUDED_URL_MARKERS;
use crate::error::Result;
use crate::parser::text::{absolutize, element_text, selector};
use crate::types::{ListingHint, ListingPage, PageFetcher};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{info, instrument, warn};
use url::Url;

static CARDS: Lazy<Selector> = Lazy::new(|| selector("div.block_similar"));
static CARD_TITLE: Lazy<Selector> = Lazy::new(|| selector("div.block_title"));
static LINKS: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static CARD_PRICE: Lazy<Selector> = Lazy::new(|| selector("p.address-place"));
static MAP_MARKER: Lazy<Selector> = Lazy::new(|| selector("i.fa-map-marker"));
static LISTING_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:-\d+)?)").expect("listing price regex"));

/// Decides whether a link points at a venue detail page.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    base: Url,
    lang: String,
    excluded: Vec<String>,
}

impl LinkFilter {
    pub fn new(base: Url, lang: impl Into<String>, excluded: Vec<String>) -> Self {
        Self {
            base,
            lang: lang.into(),
            excluded,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.site.base_url)?;
        Ok(Self::new(base, config.site.lang.clone(), config.excluded_keywords()))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute venue URL for `href`, or `None` when the link is not a venue.
    pub fn qualify(&self, href: &str) -> Option<String> {
        let url = absolutize(&self.base, href)?;
        if url.host_str() != self.base.host_str() || !url.scheme().starts_with("http") {
            return None;
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        if segments.len() < 2 || segments[0] != self.lang {
            return None;
        }

        let full = url.as_str();
        if EXCLUDED_URL_MARKERS.iter().any(|m| full.contains(m)) {
            return None;
        }
        if self.excluded.iter().any(|k| full.contains(k.as_str())) {
            return None;
        }
        Some(url.to_string())
    }
}

/// Structural card pass first, then a scan of every anchor; URLs are never repeated.
pub fn parse_listing(html: &str, filter: &LinkFilter) -> ListingPage {
    let document = Html::parse_document(html);
    let mut page = ListingPage::default();
    let mut seen = HashSet::new();

    for card in document.select(&CARDS) {
        let Some(title) = card.select(&CARD_TITLE).next() else {
            continue;
        };
        let Some(url) = title
            .select(&LINKS)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| filter.qualify(href))
        else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }
        page.hints.push((url.clone(), card_hint(&title)));
        page.urls.push(url);
    }

    let structural = page.urls.len();
    for href in document.select(&LINKS).filter_map(|a| a.value().attr("href")) {
        if let Some(url) = filter.qualify(href) {
            if seen.insert(url.clone()) {
                page.urls.push(url);
            }
        }
    }

    tracing::debug!(
        structural,
        scanned = page.urls.len() - structural,
        "Parsed listing page"
    );
    page
}

fn card_hint(title: &ElementRef) -> ListingHint {
    let listing_price = title
        .select(&CARD_PRICE)
        .next()
        .and_then(|p| {
            LISTING_PRICE_RE
                .captures(&element_text(&p))
                .map(|c| c[1].to_string())
        })
        .unwrap_or_default();

    let listing_location = title
        .select(&MAP_MARKER)
        .next()
        .and_then(|marker| marker.parent().and_then(ElementRef::wrap))
        .map(|parent| element_text(&parent))
        .unwrap_or_default();

    ListingHint {
        listing_price,
        listing_location,
    }
}

/// Fetches and parses one listing page. Failures are logged and yield an empty page.
#[instrument(skip(fetcher, config, filter))]
pub async fn crawl_listing_page(
    fetcher: &dyn PageFetcher,
    config: &Config,
    filter: &LinkFilter,
    page_number: u32,
) -> ListingPage {
    let url = config.listing_url(page_number);
    info!("Scraping listing page {}: {}", page_number, url);
    counter!("shadliq_listing_pages_total").increment(1);

    match fetcher.fetch(&url).await {
        Ok(body) => {
            let page = parse_listing(&body, filter);
            info!("Found {} venue links on page {}", page.urls.len(), page_number);
            page
        }
        Err(e) => {
            counter!("shadliq_fetch_errors_total", "kind" => "listing").increment(1);
            warn!("Error scraping listing page {}: {}", page_number, e);
            ListingPage::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_PAGE: &str = r#"<html><body>
      <nav>
        <a href="/az/">Ana səhifə</a>
        <a href="/az/elaqe/">Əlaqə</a>
        <a href="/az/saray-restoranlar/2/">2</a>
        <a href="/az/gelinlikler/">Gəlinliklər</a>
        <a href="https://facebook.com/shadliq">fb</a>
      </nav>
      <div class="block_similar">
        <div class="block_title">
          <a href="/az/neolit-hall/">Neolit Hall</a>
          <p class="address-place">50-70 AZN</p>
          <p><i class="fa fa-map-marker"></i> Xətai</p>
        </div>
      </div>
      <div class="block_similar">
        <div class="block_title">
          <a href="https://shadliq.az/az/xan-sarayi/">Xan Sarayı</a>
        </div>
      </div>
      <div class="block_similar"><span>no title</span></div>
      <a href="/az/neolit-hall/">duplicate</a>
      <a href="/az/gulustan/?ref=home">query</a>
      <a href="/az/ag-saray/">Ağ Saray</a>
    </body></html>"#;

    fn filter() -> LinkFilter {
        let config = Config::default();
        LinkFilter::from_config(&config).unwrap()
    }

    #[test]
    fn test_structural_cards_then_scan() {
        let page = parse_listing(LISTING_PAGE, &filter());
        assert_eq!(
            page.urls,
            vec![
                "https://shadliq.az/az/neolit-hall/",
                "https://shadliq.az/az/xan-sarayi/",
                "https://shadliq.az/az/ag-saray/",
            ]
        );
        assert_eq!(page.hints.len(), 2);
        assert_eq!(page.hints[0].1.listing_price, "50-70");
        assert_eq!(page.hints[0].1.listing_location, "Xətai");
        assert_eq!(page.hints[1].1, ListingHint::default());
    }

    #[test]
    fn test_scan_finds_links_without_cards() {
        let html = r#"<body><a href="/az/ag-saray/">a</a><a href="/az/ag-saray/">b</a></body>"#;
        let page = parse_listing(html, &filter());
        assert_eq!(page.urls, vec!["https://shadliq.az/az/ag-saray/"]);
        assert!(page.hints.is_empty());
    }

    #[test]
    fn test_excluded_keywords_never_pass() {
        let filter = filter();
        let page = parse_listing(LISTING_PAGE, &filter);
        for url in &page.urls {
            for keyword in Config::default().excluded_keywords() {
                assert!(!url.contains(&keyword), "{url} contains {keyword}");
            }
        }
        assert_eq!(filter.qualify("/az/toy-masini/abc/"), None);
        assert_eq!(filter.qualify("/en/some-hall/"), None);
        assert_eq!(filter.qualify("/az/"), None);
        assert_eq!(filter.qualify("https://other.az/az/hall/"), None);
        assert_eq!(filter.qualify("/az/page/3/"), None);
    }
}
