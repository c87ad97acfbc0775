//! Detail-page field extraction.
//!
//! Every field is resolved by an ordered list of rules. Each rule looks at the
//! parsed page and returns `Some(value)` only for a non-empty result; the first
//! rule that answers wins. Fields never depend on one another, so an empty or
//! failed field leaves its siblings untouched.

pub mod contact;
pub mod content;
pub mod gallery;
pub mod location;
pub mod pricing;
pub mod text;

use crate::config::LimitsConfig;
use crate::types::{ListingHint, VenueRecord};
use scraper::Html;
use tracing::debug;
use url::Url;

pub use location::Coordinates;
pub use pricing::Capacity;

/// A parsed detail page plus the context its rules need.
pub struct DetailPage<'a> {
    pub url: &'a str,
    pub base: &'a Url,
    pub document: Html,
    /// Visible text of the whole page, computed once.
    pub text: String,
    pub hint: Option<&'a ListingHint>,
    pub limits: &'a LimitsConfig,
}

pub type Rule<T> = fn(&DetailPage<'_>) -> Option<T>;

/// Runs rules in priority order and keeps the first answer.
pub fn first_match<T>(page: &DetailPage<'_>, rules: &[Rule<T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule(page))
}

const NAME_RULES: &[Rule<String>] = &[contact::name_from_heading, contact::name_from_title];
const PHONE_RULES: &[Rule<String>] = &[contact::phones_from_links, contact::phones_from_text];
const EMAIL_RULES: &[Rule<String>] = &[contact::emails_from_links, contact::emails_from_text];
const ADDRESS_RULES: &[Rule<String>] =
    &[contact::address_near_map_marker, contact::address_from_schema];
const COORDINATE_RULES: &[Rule<Coordinates>] =
    &[location::coordinates_from_globals, location::coordinates_from_map_init];
const PRICE_RULES: &[Rule<String>] = &[
    pricing::price_from_hint,
    pricing::price_from_address_info,
    pricing::price_from_title,
];
const CAPACITY_RULES: &[Rule<Capacity>] = &[pricing::capacity_from_text];
const VIEWS_RULES: &[Rule<String>] = &[pricing::views_from_counter];
const HALL_RULES: &[Rule<String>] = &[content::hall_names_from_text];
const EVENT_RULES: &[Rule<String>] = &[content::event_types_from_text];
const DESCRIPTION_RULES: &[Rule<String>] = &[
    content::description_from_container,
    content::description_from_og,
    content::description_from_social_meta,
];
const META_DESCRIPTION_RULES: &[Rule<String>] = &[content::meta_description];
const SERVICE_RULES: &[Rule<String>] = &[content::services_from_lists];
const GALLERY_RULES: &[Rule<String>] = &[gallery::images_from_gallery, gallery::images_from_uploads];
const WORKING_HOURS_RULES: &[Rule<String>] = &[content::working_hours_from_text];
const WEBSITE_RULES: &[Rule<String>] = &[contact::website_from_links];
const SOCIAL_RULES: &[Rule<String>] = &[contact::social_links];

impl<'a> DetailPage<'a> {
    pub fn parse(
        url: &'a str,
        html: &str,
        base: &'a Url,
        hint: Option<&'a ListingHint>,
        limits: &'a LimitsConfig,
    ) -> Self {
        let document = Html::parse_document(html);
        let text = text::visible_text(&document);
        Self {
            url,
            base,
            document,
            text,
            hint,
            limits,
        }
    }

    /// Runs every field rule and assembles the record.
    pub fn extract(&self) -> VenueRecord {
        let mut record = VenueRecord::with_hint(self.url, self.hint.cloned());

        record.name = first_match(self, NAME_RULES).unwrap_or_default();
        record.phone = first_match(self, PHONE_RULES).unwrap_or_default();
        record.email = first_match(self, EMAIL_RULES).unwrap_or_default();
        record.address = first_match(self, ADDRESS_RULES).unwrap_or_default();

        if let Some(coordinates) = first_match(self, COORDINATE_RULES) {
            record.latitude = coordinates.latitude;
            record.longitude = coordinates.longitude;
        }

        record.price_per_person = first_match(self, PRICE_RULES).unwrap_or_default();

        if let Some(capacity) = first_match(self, CAPACITY_RULES) {
            record.capacity_min = capacity.min;
            record.capacity_max = capacity.max;
        }

        record.views = first_match(self, VIEWS_RULES).unwrap_or_default();
        record.hall_names = first_match(self, HALL_RULES).unwrap_or_default();
        record.event_types = first_match(self, EVENT_RULES).unwrap_or_default();
        record.description = first_match(self, DESCRIPTION_RULES).unwrap_or_default();
        record.meta_description = first_match(self, META_DESCRIPTION_RULES).unwrap_or_default();
        record.services = first_match(self, SERVICE_RULES).unwrap_or_default();
        record.gallery_images = first_match(self, GALLERY_RULES).unwrap_or_default();
        record.working_hours = first_match(self, WORKING_HOURS_RULES).unwrap_or_default();
        record.website = first_match(self, WEBSITE_RULES).unwrap_or_default();
        record.social_media = first_match(self, SOCIAL_RULES).unwrap_or_default();

        debug!(
            url = %self.url,
            name = %record.name,
            price = %record.price_per_person,
            "Extracted venue fields"
        );
        record
    }
}

/// Parses a detail page body into a record.
pub fn extract_venue(
    url: &str,
    html: &str,
    base: &Url,
    hint: Option<&ListingHint>,
    limits: &LimitsConfig,
) -> VenueRecord {
    DetailPage::parse(url, html, base, hint, limits).extract()
}
