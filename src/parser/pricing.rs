//! Price, capacity and view-count rules.

use super::text::{element_text, non_empty, selector};
use super::DetailPage;
use crate::constants::{VIEWS_CUSTOMER_MARKER, VIEWS_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

static ADDRESS_INFO: Lazy<Selector> = Lazy::new(|| selector("div.address_info"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| selector("p"));
static STRONG: Lazy<Selector> = Lazy::new(|| selector("strong"));

/// A number immediately followed by one of the currency spellings.
static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:AZN|azn|₼)").expect("price regex"));
static CAPACITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*[-–]\s*(\d+)\s*(?:nəfər|person|guest)").expect("capacity regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capacity {
    pub min: String,
    pub max: String,
}

/// Price captured from the listing card, when the venue came with one.
pub fn price_from_hint(page: &DetailPage<'_>) -> Option<String> {
    page.hint.and_then(|hint| non_empty(hint.listing_price.clone()))
}

pub fn price_from_address_info(page: &DetailPage<'_>) -> Option<String> {
    let info = page.document.select(&ADDRESS_INFO).next()?;
    first_price(&info.text().collect::<String>())
}

pub fn price_from_title(page: &DetailPage<'_>) -> Option<String> {
    let title = page.document.select(&TITLE).next()?;
    first_price(&element_text(&title))
}

pub fn first_price(text: &str) -> Option<String> {
    PRICE_RE.captures(text).map(|c| c[1].to_string())
}

pub fn capacity_from_text(page: &DetailPage<'_>) -> Option<Capacity> {
    CAPACITY_RE.captures(&page.text).map(|c| Capacity {
        min: c[1].to_string(),
        max: c[2].to_string(),
    })
}

/// Digits of the `<strong>` inside the first "customer views" paragraph.
pub fn views_from_counter(page: &DetailPage<'_>) -> Option<String> {
    let paragraph = page.document.select(&PARAGRAPHS).find(|p| {
        let text = p.text().collect::<String>().to_lowercase();
        text.contains(VIEWS_CUSTOMER_MARKER) && text.contains(VIEWS_MARKER)
    })?;
    let strong = paragraph.select(&STRONG).next()?;
    let digits: String = element_text(&strong)
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    non_empty(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use crate::types::ListingHint;
    use url::Url;

    const ADDRESS_INFO_75: &str = r#"<html><head><title>Gülüstan 90 AZN</title></head><body>
        <div class="address_info"><p>Qiymət: 75 AZN / nəfər</p></div></body></html>"#;

    fn price_of(html: &str, hint: Option<&ListingHint>) -> Option<String> {
        let base = Url::parse("https://shadliq.az").unwrap();
        let limits = LimitsConfig::default();
        let page = DetailPage::parse("u", html, &base, hint, &limits);
        super::super::first_match(&page, super::super::PRICE_RULES)
    }

    #[test]
    fn test_address_info_price_without_hint() {
        assert_eq!(price_of(ADDRESS_INFO_75, None).as_deref(), Some("75"));
    }

    #[test]
    fn test_hint_takes_precedence() {
        let hint = ListingHint {
            listing_price: "60".into(),
            listing_location: String::new(),
        };
        assert_eq!(price_of(ADDRESS_INFO_75, Some(&hint)).as_deref(), Some("60"));
    }

    #[test]
    fn test_empty_hint_falls_through() {
        let hint = ListingHint::default();
        assert_eq!(price_of(ADDRESS_INFO_75, Some(&hint)).as_deref(), Some("75"));
    }

    #[test]
    fn test_title_price_fallback() {
        let html = "<html><head><title>Gülüstan 90 ₼ | Shadliq</title></head><body></body></html>";
        assert_eq!(price_of(html, None).as_deref(), Some("90"));
    }

    #[test]
    fn test_currency_spellings() {
        assert_eq!(first_price("from 45azn").as_deref(), Some("45"));
        assert_eq!(first_price("50 ₼").as_deref(), Some("50"));
        assert_eq!(first_price("50 USD"), None);
    }

    #[test]
    fn test_views_requires_both_markers() {
        let base = Url::parse("https://shadliq.az").unwrap();
        let limits = LimitsConfig::default();
        let html = "<body><p>Baxış: <strong>5</strong></p>\
                    <p>Müştəri Baxış Sayı <strong>48 210</strong></p></body>";
        let page = DetailPage::parse("u", html, &base, None, &limits);
        assert_eq!(views_from_counter(&page).as_deref(), Some("48210"));
    }
}
