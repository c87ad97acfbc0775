//! Free-text rules: halls, event types, description, services.

use super::text::{
    class_matches, element_text, join_sorted, non_empty, selector, truncate_chars, visible_text_nodes,
};
use super::DetailPage;
use crate::constants::{
    DESCRIPTION_PARAGRAPHS_KEPT, DESCRIPTION_PARAGRAPHS_SCANNED, DESCRIPTION_PARAGRAPH_MIN_CHARS,
    EVENTS_HEADER, EVENT_KEYWORDS, HALLS_HEADER, META_DESCRIPTION_MAX_CHARS, SERVICES_CAP,
    SERVICE_ITEMS_PER_LIST, SERVICE_ITEM_MAX_CHARS, SERVICE_LISTS_CAP, WORKING_HOURS_MAX_CHARS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

static DIVS: Lazy<Selector> = Lazy::new(|| selector("div"));
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| selector("p"));
static LISTS: Lazy<Selector> = Lazy::new(|| selector("ul"));
static LIST_ITEMS: Lazy<Selector> = Lazy::new(|| selector("li"));
static META_DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="description"]"#));
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:description"]"#));
static META_PROPERTY: Lazy<Selector> = Lazy::new(|| selector("meta[property]"));

static CONTENT_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("single-detail|content|description").expect("content class regex"));
static SERVICE_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("service|amenity|feature").expect("service class regex"));
/// Paragraphs that are really the address/phone/views block.
static BOILERPLATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Müştəri|Baxış|tel:|@)").expect("boilerplate regex"));
static HALLS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{HALLS_HEADER}[:\s]*([^\n]+(?:\n[^\n]+){{0,3}})")).expect("halls regex")
});
/// The events header and the rest of its line; following lines are kept.
static EVENTS_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{EVENTS_HEADER}[^\n]*")).expect("events line regex")
});
static WORKING_HOURS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)iş saatı|working hour|açıq").expect("working hours regex"));
static PERIOD_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.+").expect("period regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Up to four lines after the halls header. The events header is cut to the end
/// of its own line.
pub fn hall_names_from_text(page: &DetailPage<'_>) -> Option<String> {
    let captures = HALLS_RE.captures(&page.text)?;
    let halls = EVENTS_LINE_RE.replace_all(captures[1].trim(), "");
    let halls = PERIOD_RUN_RE.replace_all(halls.trim(), ", ");
    let halls = WHITESPACE_RE.replace_all(&halls, " ");
    let halls = halls.trim().trim_end_matches(',').trim();
    non_empty(truncate_chars(halls, page.limits.hall_names_max))
}

/// The first text node that mentions opening hours, whole.
pub fn working_hours_from_text(page: &DetailPage<'_>) -> Option<String> {
    visible_text_nodes(&page.document)
        .find(|text| WORKING_HOURS_RE.is_match(text))
        .and_then(|text| non_empty(truncate_chars(text.trim(), WORKING_HOURS_MAX_CHARS)))
}

pub fn event_types_from_text(page: &DetailPage<'_>) -> Option<String> {
    let haystack = page.text.to_lowercase();
    let found = EVENT_KEYWORDS
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .copied();
    non_empty(join_sorted(found, ", "))
}

/// The first content container's substantive paragraphs.
pub fn description_from_container(page: &DetailPage<'_>) -> Option<String> {
    let container = page
        .document
        .select(&DIVS)
        .find(|div| class_matches(div, &CONTENT_CLASS_RE))?;

    let parts: Vec<String> = container
        .select(&PARAGRAPHS)
        .take(DESCRIPTION_PARAGRAPHS_SCANNED)
        .map(|p| element_text(&p))
        .filter(|text| {
            text.chars().count() > DESCRIPTION_PARAGRAPH_MIN_CHARS && !BOILERPLATE_RE.is_match(text)
        })
        .take(DESCRIPTION_PARAGRAPHS_KEPT)
        .collect();
    non_empty(truncate_chars(&parts.join(" | "), page.limits.description_max))
}

pub fn description_from_og(page: &DetailPage<'_>) -> Option<String> {
    let meta = page.document.select(&OG_DESCRIPTION).next()?;
    let content = meta.value().attr("content")?;
    non_empty(truncate_chars(content.trim(), page.limits.description_max))
}

/// Any Open Graph or article meta tag with content.
pub fn description_from_social_meta(page: &DetailPage<'_>) -> Option<String> {
    page.document
        .select(&META_PROPERTY)
        .filter(|meta| {
            meta.value()
                .attr("property")
                .is_some_and(|p| p.contains("og:") || p.contains("article:"))
        })
        .filter_map(|meta| meta.value().attr("content"))
        .find_map(|content| non_empty(truncate_chars(content.trim(), page.limits.description_max)))
}

pub fn meta_description(page: &DetailPage<'_>) -> Option<String> {
    let meta = page.document.select(&META_DESCRIPTION).next()?;
    let content = meta.value().attr("content")?;
    non_empty(truncate_chars(content.trim(), META_DESCRIPTION_MAX_CHARS))
}

pub fn services_from_lists(page: &DetailPage<'_>) -> Option<String> {
    let services: Vec<String> = page
        .document
        .select(&LISTS)
        .filter(|ul| class_matches(ul, &SERVICE_CLASS_RE))
        .take(SERVICE_LISTS_CAP)
        .flat_map(|ul| {
            ul.select(&LIST_ITEMS)
                .take(SERVICE_ITEMS_PER_LIST)
                .map(|li| element_text(&li))
                .collect::<Vec<_>>()
        })
        .filter(|item| !item.is_empty() && item.chars().count() < SERVICE_ITEM_MAX_CHARS)
        .take(SERVICES_CAP)
        .collect();
    non_empty(services.join("; "))
}
