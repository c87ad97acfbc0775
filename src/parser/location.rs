//! Coordinates embedded in inline scripts.

use super::text::{script_text, selector};
use super::DetailPage;
use crate::constants::{COORDINATES_GLOBAL, MAP_LIBRARY};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

static SCRIPTS: Lazy<Selector> = Lazy::new(|| selector("script"));
static LATITUDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'latitude'\s*:\s*'([^']+)'").expect("latitude regex"));
static LONGITUDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'longitude'\s*:\s*'([^']+)'").expect("longitude regex"));
static COORDINATE_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*(-?[0-9.]+),\s*(-?[0-9.]+)\s*\]").expect("coordinate pair regex"));

/// Decimal strings as they appear in the page; either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

/// `'latitude':'…'` / `'longitude':'…'` inside the site's global config object.
/// Only the first script carrying the object is read.
pub fn coordinates_from_globals(page: &DetailPage<'_>) -> Option<Coordinates> {
    let script = page
        .document
        .select(&SCRIPTS)
        .map(|s| script_text(&s))
        .find(|body| body.contains(COORDINATES_GLOBAL))?;

    let capture = |re: &Regex| {
        re.captures(&script)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default()
    };
    let coordinates = Coordinates {
        latitude: capture(&*LATITUDE_RE),
        longitude: capture(&*LONGITUDE_RE),
    };
    if coordinates.latitude.is_empty() && coordinates.longitude.is_empty() {
        None
    } else {
        Some(coordinates)
    }
}

/// First `[lat, lon]` pair in a map-library initialization script.
pub fn coordinates_from_map_init(page: &DetailPage<'_>) -> Option<Coordinates> {
    page.document
        .select(&SCRIPTS)
        .map(|s| script_text(&s))
        .filter(|body| body.contains(MAP_LIBRARY))
        .find_map(|body| {
            COORDINATE_PAIR_RE.captures(&body).map(|c| Coordinates {
                latitude: c[1].to_string(),
                longitude: c[2].to_string(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use url::Url;

    fn parse(html: &str) -> (Option<Coordinates>, Option<Coordinates>) {
        let base = Url::parse("https://shadliq.az").unwrap();
        let limits = LimitsConfig::default();
        let page = DetailPage::parse("u", html, &base, None, &limits);
        (coordinates_from_globals(&page), coordinates_from_map_init(&page))
    }

    #[test]
    fn test_globals_object() {
        let (globals, _) = parse(
            "<script>var ae_globals = {'latitude' : '40.37', 'longitude':'49.83'};</script>",
        );
        assert_eq!(
            globals,
            Some(Coordinates {
                latitude: "40.37".into(),
                longitude: "49.83".into()
            })
        );
    }

    #[test]
    fn test_map_init_pair_fallback() {
        let (globals, map) = parse(
            "<script>ymaps.ready(function () { new ymaps.Map('map', {center: [40.4093, 49.8671], zoom: 15}); });</script>",
        );
        assert_eq!(globals, None);
        let map = map.unwrap();
        assert_eq!(map.latitude, "40.4093");
        assert_eq!(map.longitude, "49.8671");
    }

    #[test]
    fn test_pair_outside_map_script_is_ignored() {
        let (_, map) = parse("<script>var sizes = [1.5, 2.5];</script>");
        assert_eq!(map, None);
    }
}
