//! Gallery image URLs, upgraded from thumbnails to full resolution.

use super::text::{absolutize, class_matches, non_empty, selector};
use super::DetailPage;
use crate::constants::{GALLERY_CAP, UPLOAD_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashSet;

static GALLERY_CONTAINERS: Lazy<Selector> = Lazy::new(|| selector("div, section"));
static IMAGES: Lazy<Selector> = Lazy::new(|| selector("img[src]"));
static GALLERY_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("gallery|carousel").expect("gallery class regex"));

const THUMB_SEGMENT: &str = "/thumbs/";
const THUMB_SUFFIX: &str = "-270.jpg";
const FULL_SUFFIX: &str = "-1200.jpg";

/// Upload images inside the first gallery or carousel container.
pub fn images_from_gallery(page: &DetailPage<'_>) -> Option<String> {
    let gallery = page
        .document
        .select(&GALLERY_CONTAINERS)
        .find(|el| class_matches(el, &GALLERY_CLASS_RE))?;
    let sources = gallery
        .select(&IMAGES)
        .take(GALLERY_CAP)
        .filter_map(|img| upload_source(&img));
    render(page, sources)
}

/// Any upload image on the page.
pub fn images_from_uploads(page: &DetailPage<'_>) -> Option<String> {
    let sources = page
        .document
        .select(&IMAGES)
        .filter_map(|img| upload_source(&img));
    render(page, sources)
}

fn upload_source<'a>(img: &ElementRef<'a>) -> Option<&'a str> {
    img.value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty() && src.contains(UPLOAD_MARKER))
}

/// Absolute, full-resolution, deduplicated in first-seen order, capped.
fn render<'s>(page: &DetailPage<'_>, sources: impl Iterator<Item = &'s str>) -> Option<String> {
    let mut seen = HashSet::new();
    let images: Vec<String> = sources
        .filter_map(|src| absolutize(page.base, src))
        .map(|url| full_resolution(url.as_str()))
        .filter(|url| seen.insert(url.clone()))
        .take(page.limits.gallery_cap)
        .collect();
    non_empty(images.join("; "))
}

pub fn full_resolution(url: &str) -> String {
    url.replace(THUMB_SEGMENT, "/").replace(THUMB_SUFFIX, FULL_SUFFIX)
}
