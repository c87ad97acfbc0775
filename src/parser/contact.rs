//! Name, phone, email, address and outbound link rules.

use super::text::{absolutize, element_text, join_sorted, non_empty, selector};
use super::DetailPage;
use crate::constants::{EMAIL_PROTECTION_PREFIX, SOCIAL_LINKS_CAP, SOCIAL_NETWORKS};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use std::collections::HashSet;

static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static TEL_LINKS: Lazy<Selector> = Lazy::new(|| selector(r#"a[href^="tel:"]"#));
static MAILTO_LINKS: Lazy<Selector> = Lazy::new(|| selector(r#"a[href^="mailto:"]"#));
static MAP_MARKER: Lazy<Selector> = Lazy::new(|| selector("i.fa-map-marker"));
static SCHEMA_ADDRESS: Lazy<Selector> = Lazy::new(|| selector(r#"[itemprop="address"]"#));
static LINKS: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

/// Local phone shape: optional country code, then grouped digits.
pub static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?994|0)[-\s]?\d{2}[-\s]?\d{3}[-\s]?\d{2}[-\s]?\d{2}").expect("phone regex")
});
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email regex")
});
/// Trailing "customer views" counter glued onto the address line.
static VIEWS_PHRASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Müştəri\s+Baxış\s+Sayı.*").expect("views phrase regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

pub fn name_from_heading(page: &DetailPage<'_>) -> Option<String> {
    let h1 = page.document.select(&H1).next()?;
    non_empty(element_text(&h1))
}

/// `<title>` with the trailing site name cut at the first `|`.
pub fn name_from_title(page: &DetailPage<'_>) -> Option<String> {
    let title = page.document.select(&TITLE).next()?;
    let text = element_text(&title);
    let name = text.split('|').next().unwrap_or_default().trim().to_string();
    non_empty(name)
}

pub fn phones_from_links(page: &DetailPage<'_>) -> Option<String> {
    let phones = page
        .document
        .select(&TEL_LINKS)
        .filter_map(|link| link.value().attr("href"))
        .map(|href| href.trim_start_matches("tel:").trim().to_string())
        .filter(|phone| phone.chars().count() > 5);
    non_empty(join_sorted(phones, ", "))
}

pub fn phones_from_text(page: &DetailPage<'_>) -> Option<String> {
    let phones = PHONE_RE.find_iter(&page.text).map(|m| m.as_str().trim());
    non_empty(join_sorted(phones, ", "))
}

pub fn emails_from_links(page: &DetailPage<'_>) -> Option<String> {
    let emails = page
        .document
        .select(&MAILTO_LINKS)
        .filter_map(|link| link.value().attr("href"))
        .map(|href| {
            href.trim_start_matches("mailto:")
                .replace(EMAIL_PROTECTION_PREFIX, "")
                .trim()
                .to_string()
        })
        .filter(|email| email.contains('@'));
    non_empty(join_sorted(emails, ", "))
}

pub fn emails_from_text(page: &DetailPage<'_>) -> Option<String> {
    let emails = EMAIL_RE.find_iter(&page.text).map(|m| m.as_str());
    non_empty(join_sorted(emails, ", "))
}

/// Text of the element holding the map-marker icon, minus the view counter
/// and any phone number that shares the line.
pub fn address_near_map_marker(page: &DetailPage<'_>) -> Option<String> {
    let marker = page.document.select(&MAP_MARKER).next()?;
    let parent = marker.parent().and_then(scraper::ElementRef::wrap)?;
    non_empty(clean_address(&element_text(&parent)))
}

pub fn address_from_schema(page: &DetailPage<'_>) -> Option<String> {
    let element = page.document.select(&SCHEMA_ADDRESS).next()?;
    non_empty(clean_address(&element_text(&element)))
}

fn is_social(href: &str) -> bool {
    let href = href.to_lowercase();
    SOCIAL_NETWORKS.iter().any(|network| href.contains(network))
}

/// First absolute link leaving the site that is not a social profile.
pub fn website_from_links(page: &DetailPage<'_>) -> Option<String> {
    page.document
        .select(&LINKS)
        .filter_map(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
        .filter(|href| !is_social(href))
        .filter_map(|href| absolutize(page.base, href))
        .find(|url| url.host_str().is_some() && url.host_str() != page.base.host_str())
        .map(String::from)
}

/// Social profile links in page order, deduplicated and capped.
pub fn social_links(page: &DetailPage<'_>) -> Option<String> {
    let mut seen = HashSet::new();
    let links: Vec<&str> = page
        .document
        .select(&LINKS)
        .filter_map(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_social(href) && seen.insert(*href))
        .take(SOCIAL_LINKS_CAP)
        .collect();
    non_empty(links.join("; "))
}

pub fn clean_address(raw: &str) -> String {
    let without_views = VIEWS_PHRASE_RE.replace(raw, "");
    let without_phones = PHONE_RE.replace_all(&without_views, "");
    WHITESPACE_RE
        .replace_all(&without_phones, " ")
        .trim()
        .trim_end_matches(',')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use url::Url;

    fn with_page<T>(html: &str, f: impl FnOnce(&DetailPage<'_>) -> T) -> T {
        let base = Url::parse("https://shadliq.az").unwrap();
        let limits = LimitsConfig::default();
        let page = DetailPage::parse("u", html, &base, None, &limits);
        f(&page)
    }

    #[test]
    fn test_name_falls_back_to_title() {
        let html = "<html><head><title>Xan Sarayı | Shadliq.az</title></head><body></body></html>";
        with_page(html, |page| {
            assert_eq!(name_from_heading(page), None);
            assert_eq!(name_from_title(page).as_deref(), Some("Xan Sarayı"));
        });
    }

    #[test]
    fn test_phone_text_fallback_is_sorted_and_unique() {
        let html = "<body><p>Əlaqə: 050 555 12 34, +994 12 440 11 22, 050 555 12 34</p></body>";
        with_page(html, |page| {
            assert_eq!(phones_from_links(page), None);
            assert_eq!(
                phones_from_text(page).as_deref(),
                Some("+994 12 440 11 22, 050 555 12 34")
            );
        });
    }

    #[test]
    fn test_short_tel_links_are_ignored() {
        let html = r#"<body><a href="tel:123">x</a><a href="tel: 0505551234 ">y</a></body>"#;
        with_page(html, |page| {
            assert_eq!(phones_from_links(page).as_deref(), Some("0505551234"));
        });
    }

    #[test]
    fn test_email_text_fallback() {
        let html = "<body><p>Yazın: sales@hall.az və ya info@hall.az</p></body>";
        with_page(html, |page| {
            assert_eq!(emails_from_links(page), None);
            assert_eq!(emails_from_text(page).as_deref(), Some("info@hall.az, sales@hall.az"));
        });
    }

    #[test]
    fn test_schema_address_fallback() {
        let html = r#"<body><span itemprop="address">Nərimanov r., Təbriz küç. 5</span></body>"#;
        with_page(html, |page| {
            assert_eq!(address_near_map_marker(page), None);
            assert_eq!(address_from_schema(page).as_deref(), Some("Nərimanov r., Təbriz küç. 5"));
        });
    }

    #[test]
    fn test_website_skips_own_host_and_social() {
        let html = r#"<body>
            <a href="https://shadliq.az/az/other/">own</a>
            <a href="/az/relative/">relative</a>
            <a href="https://www.facebook.com/hall">fb</a>
            <a href="https://xansarayi.az/">site</a>
            <a href="https://example.org/">later</a>
        </body>"#;
        with_page(html, |page| {
            assert_eq!(website_from_links(page).as_deref(), Some("https://xansarayi.az/"));
        });
    }

    #[test]
    fn test_social_links_deduplicated_and_capped() {
        let networks = ["facebook", "Instagram", "twitter", "youtube", "linkedin", "facebook"];
        let links: String = networks
            .iter()
            .enumerate()
            .map(|(i, n)| format!(r#"<a href="https://{n}.com/hall{}">x</a>"#, i % 5))
            .collect();
        let html = format!(
            r#"<body><a href="https://facebook.com/hall0">dup</a>{links}<a href="https://hall.az">site</a></body>"#
        );
        with_page(&html, |page| {
            let social = social_links(page).unwrap();
            let parts: Vec<&str> = social.split("; ").collect();
            assert_eq!(parts.len(), 5);
            assert_eq!(parts[0], "https://facebook.com/hall0");
            assert_eq!(parts[1], "https://Instagram.com/hall1");
        });
        with_page("<body><a href=\"https://hall.az\">x</a></body>", |page| {
            assert_eq!(social_links(page), None);
        });
    }

    #[test]
    fn test_clean_address_strips_views_and_phone() {
        assert_eq!(
            clean_address("Yasamal r., Şərifzadə 7 055-222-33-44 Müştəri Baxış Sayı: 4500"),
            "Yasamal r., Şərifzadə 7"
        );
    }
}
