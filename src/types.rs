use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One venue's flattened field-to-value mapping. Every field is always present;
/// a value that could not be extracted is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub url: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub location_short: String,
    pub latitude: String,
    pub longitude: String,
    pub price_per_person: String,
    pub views: String,
    pub description: String,
    pub hall_names: String,
    pub services: String,
    pub event_types: String,
    pub gallery_images: String,
    pub meta_description: String,
    pub capacity_min: String,
    pub capacity_max: String,
    pub working_hours: String,
    pub website: String,
    pub social_media: String,
}

impl VenueRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Seeds the listing-page price and location before the detail page is read.
    pub fn with_hint(url: impl Into<String>, hint: Option<ListingHint>) -> Self {
        let mut record = Self::new(url);
        if let Some(hint) = hint {
            record.price_per_person = hint.listing_price;
            record.location_short = hint.listing_location;
        }
        record
    }

    /// Value of a named output column; unknown columns read as empty.
    pub fn get(&self, column: &str) -> &str {
        match column {
            "url" => &self.url,
            "name" => &self.name,
            "phone" => &self.phone,
            "email" => &self.email,
            "address" => &self.address,
            "location_short" => &self.location_short,
            "latitude" => &self.latitude,
            "longitude" => &self.longitude,
            "price_per_person" => &self.price_per_person,
            "views" => &self.views,
            "description" => &self.description,
            "hall_names" => &self.hall_names,
            "services" => &self.services,
            "event_types" => &self.event_types,
            "gallery_images" => &self.gallery_images,
            "meta_description" => &self.meta_description,
            "capacity_min" => &self.capacity_min,
            "capacity_max" => &self.capacity_max,
            "working_hours" => &self.working_hours,
            "website" => &self.website,
            "social_media" => &self.social_media,
            _ => "",
        }
    }

    pub fn row<'a>(&'a self, columns: &[&str]) -> Vec<&'a str> {
        columns.iter().map(|c| self.get(c)).collect()
    }
}

/// Price and location snippets captured from a listing card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingHint {
    pub listing_price: String,
    pub listing_location: String,
}

/// Venue URLs found on one listing page, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub urls: Vec<String>,
    pub hints: Vec<(String, ListingHint)>,
}

/// Source of page bodies. The crawl only ever issues GETs, one at a time.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COLUMNS;

    #[test]
    fn test_new_record_has_every_column() {
        let record = VenueRecord::new("https://shadliq.az/az/some-hall/");
        let row = record.row(&COLUMNS);
        assert_eq!(row.len(), 16);
        assert_eq!(row[0], "https://shadliq.az/az/some-hall/");
        assert!(row[1..].iter().all(|v| v.is_empty()));
    }

    #[test]
    fn test_hint_seeds_price_and_location() {
        let hint = ListingHint {
            listing_price: "60".into(),
            listing_location: "Xətai".into(),
        };
        let record = VenueRecord::with_hint("u", Some(hint));
        assert_eq!(record.get("price_per_person"), "60");
        assert_eq!(record.get("location_short"), "Xətai");
    }
}
