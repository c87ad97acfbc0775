//! Chart datasets computed from the crawl's CSV output.
//!
//! Each dataset is an independent, stateless transform of the same table.
//! Rendering is left to whatever plotting front-end reads the JSON.

pub mod stats;

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::info;

const PRICE_BINS: [f64; 7] = [0.0, 40.0, 60.0, 80.0, 100.0, 120.0, 150.0];
const PRICE_CATEGORIES: [(&str, f64); 4] = [
    ("Budget (≤40)", 40.0),
    ("Affordable (41-60)", 60.0),
    ("Mid-range (61-80)", 80.0),
    ("Premium (81-100)", 100.0),
];
const PRICE_CATEGORY_LUXURY: &str = "Luxury (>100)";
const VIEWS_BINS: [(&str, f64, f64); 5] = [
    ("<10K", 0.0, 10_000.0),
    ("10K-25K", 10_000.0, 25_000.0),
    ("25K-50K", 25_000.0, 50_000.0),
    ("50K-100K", 50_000.0, 100_000.0),
    (">100K", 100_000.0, 200_000.0),
];
const COMPLETENESS_FIELDS: [&str; 11] = [
    "name",
    "phone",
    "email",
    "address",
    "price_per_person",
    "views",
    "latitude",
    "longitude",
    "description",
    "hall_names",
    "gallery_images",
];
const TOP_VIEWS: usize = 20;
const TOP_LOCATIONS: usize = 15;
const TOP_EVENT_TYPES: usize = 8;
const TOP_PRICE_LOCATIONS: usize = 8;
const MIN_LOCATION_SAMPLES: usize = 3;

/// One CSV row, with the numeric columns coerced. Unparseable numbers are missing.
#[derive(Debug, Clone, Default)]
pub struct VenueRow {
    pub fields: HashMap<String, String>,
    pub price: Option<f64>,
    pub views: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl VenueRow {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

fn numeric(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn load_table<R: Read>(reader: R) -> Result<Vec<VenueRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        let get = |name: &str| fields.get(name).and_then(|v| numeric(v));
        rows.push(VenueRow {
            price: get("price_per_person"),
            views: get("views"),
            latitude: get("latitude"),
            longitude: get("longitude"),
            fields,
        });
    }
    Ok(rows)
}

pub fn load_table_from_path(path: &Path) -> Result<Vec<VenueRow>> {
    load_table(fs::File::open(path)?)
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PriceDistribution {
    pub bins: Vec<HistogramBin>,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RankedVenue {
    pub name: String,
    pub views: f64,
    pub price: Option<f64>,
    pub price_tier: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub price: Option<f64>,
    pub views: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PriceViews {
    pub points: Vec<(f64, f64)>,
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
    pub correlation: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FieldCompleteness {
    pub field: String,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct LocationPrices {
    pub location: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct ChartReport {
    pub generated_at: DateTime<Utc>,
    pub total_venues: usize,
    pub price_distribution: PriceDistribution,
    pub price_categories: Vec<LabelCount>,
    pub top_venues_by_views: Vec<RankedVenue>,
    pub geographic_distribution: Vec<GeoPoint>,
    pub price_vs_views: PriceViews,
    pub location_distribution: Vec<LabelCount>,
    pub event_types: Vec<LabelCount>,
    pub data_completeness: Vec<FieldCompleteness>,
    pub price_by_location: Vec<LocationPrices>,
    pub popularity_distribution: Vec<LabelCount>,
}

impl ChartReport {
    pub fn build(rows: &[VenueRow]) -> Self {
        Self {
            generated_at: Utc::now(),
            total_venues: rows.len(),
            price_distribution: price_distribution(rows),
            price_categories: price_categories(rows),
            top_venues_by_views: top_venues_by_views(rows),
            geographic_distribution: geographic_distribution(rows),
            price_vs_views: price_vs_views(rows),
            location_distribution: location_distribution(rows),
            event_types: event_types(rows),
            data_completeness: data_completeness(rows),
            price_by_location: price_by_location(rows),
            popularity_distribution: popularity_distribution(rows),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        info!("Chart datasets written to {}", path.display());
        Ok(())
    }

    pub fn log_summary(&self) {
        let prices = &self.price_distribution;
        info!("Total venues analyzed: {}", self.total_venues);
        if let (Some(min), Some(max), Some(mean)) = (prices.min, prices.max, prices.mean) {
            info!("Price range: {:.0} - {:.0} AZN, average {:.1} AZN", min, max, mean);
        }
        if let Some(top) = self.price_categories.first() {
            info!("Most common price range: {}", top.label);
        }
        if let Some(correlation) = self.price_vs_views.correlation {
            info!("Price/views correlation: {:.3}", correlation);
        }
        if let Some(top) = self.location_distribution.first() {
            info!("Most popular location: {}", top.label);
        }
    }
}

fn prices(rows: &[VenueRow]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.price).collect()
}

pub fn price_distribution(rows: &[VenueRow]) -> PriceDistribution {
    let values = prices(rows);
    let last = PRICE_BINS.len() - 2;
    let bins = PRICE_BINS
        .windows(2)
        .enumerate()
        .map(|(i, edge)| {
            let (lower, upper) = (edge[0], edge[1]);
            // Half-open bins, except the last one which includes its upper edge.
            let count = values
                .iter()
                .filter(|&&v| v >= lower && (v < upper || (i == last && v == upper)))
                .count();
            HistogramBin { lower, upper, count }
        })
        .collect();
    let sorted = stats::sorted(&values);
    PriceDistribution {
        bins,
        count: values.len(),
        mean: stats::mean(&values),
        median: stats::quantile(&sorted, 0.5),
        min: sorted.first().copied(),
        max: sorted.last().copied(),
    }
}

fn price_category(price: f64) -> &'static str {
    PRICE_CATEGORIES
        .iter()
        .find(|(_, ceiling)| price <= *ceiling)
        .map(|(label, _)| *label)
        .unwrap_or(PRICE_CATEGORY_LUXURY)
}

pub fn price_categories(rows: &[VenueRow]) -> Vec<LabelCount> {
    ranked_counts(prices(rows).into_iter().map(price_category), usize::MAX)
}

fn price_tier(price: Option<f64>) -> &'static str {
    match price {
        Some(p) if p <= 50.0 => "budget",
        Some(p) if p <= 80.0 => "mid-range",
        Some(_) => "premium",
        None => "unknown",
    }
}

/// Most viewed first.
pub fn top_venues_by_views(rows: &[VenueRow]) -> Vec<RankedVenue> {
    let mut viewed: Vec<&VenueRow> = rows.iter().filter(|r| r.views.is_some()).collect();
    viewed.sort_by(|a, b| b.views.unwrap_or(0.0).total_cmp(&a.views.unwrap_or(0.0)));
    viewed
        .into_iter()
        .take(TOP_VIEWS)
        .map(|r| RankedVenue {
            name: r.field("name").to_string(),
            views: r.views.unwrap_or(0.0),
            price: r.price,
            price_tier: price_tier(r.price),
        })
        .collect()
}

pub fn geographic_distribution(rows: &[VenueRow]) -> Vec<GeoPoint> {
    rows.iter()
        .filter_map(|r| {
            Some(GeoPoint {
                longitude: r.longitude?,
                latitude: r.latitude?,
                price: r.price,
                views: r.views,
            })
        })
        .collect()
}

pub fn price_vs_views(rows: &[VenueRow]) -> PriceViews {
    let points: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|r| Some((r.price?, r.views?)))
        .collect();
    let fit = stats::linear_fit(&points);
    PriceViews {
        slope: fit.map(|f| f.0),
        intercept: fit.map(|f| f.1),
        correlation: stats::pearson(&points),
        points,
    }
}

pub fn location_distribution(rows: &[VenueRow]) -> Vec<LabelCount> {
    let locations = rows
        .iter()
        .map(|r| r.field("location_short").trim())
        .filter(|l| !l.is_empty());
    ranked_counts(locations, TOP_LOCATIONS)
}

pub fn event_types(rows: &[VenueRow]) -> Vec<LabelCount> {
    let events = rows
        .iter()
        .flat_map(|r| r.field("event_types").split(','))
        .map(str::trim)
        .filter(|e| !e.is_empty());
    ranked_counts(events, TOP_EVENT_TYPES)
}

pub fn data_completeness(rows: &[VenueRow]) -> Vec<FieldCompleteness> {
    if rows.is_empty() {
        return Vec::new();
    }
    let mut completeness: Vec<FieldCompleteness> = COMPLETENESS_FIELDS
        .iter()
        .map(|&field| {
            let filled = rows.iter().filter(|r| !r.field(field).trim().is_empty()).count();
            FieldCompleteness {
                field: field.to_string(),
                percent: filled as f64 / rows.len() as f64 * 100.0,
            }
        })
        .collect();
    completeness.sort_by(|a, b| a.percent.total_cmp(&b.percent));
    completeness
}

/// Box statistics for locations with enough priced venues.
pub fn price_by_location(rows: &[VenueRow]) -> Vec<LocationPrices> {
    let mut by_location: HashMap<&str, Vec<f64>> = HashMap::new();
    for row in rows {
        let location = row.field("location_short").trim();
        if let (Some(price), false) = (row.price, location.is_empty()) {
            by_location.entry(location).or_default().push(price);
        }
    }

    let mut groups: Vec<(&str, Vec<f64>)> = by_location
        .into_iter()
        .filter(|(_, prices)| prices.len() >= MIN_LOCATION_SAMPLES)
        .collect();
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    groups
        .into_iter()
        .take(TOP_PRICE_LOCATIONS)
        .filter_map(|(location, prices)| {
            let sorted = stats::sorted(&prices);
            Some(LocationPrices {
                location: location.to_string(),
                count: sorted.len(),
                min: *sorted.first()?,
                q1: stats::quantile(&sorted, 0.25)?,
                median: stats::quantile(&sorted, 0.5)?,
                q3: stats::quantile(&sorted, 0.75)?,
                max: *sorted.last()?,
            })
        })
        .collect()
}

/// Right-closed view bins; every bin is reported, empty or not.
pub fn popularity_distribution(rows: &[VenueRow]) -> Vec<LabelCount> {
    VIEWS_BINS
        .iter()
        .map(|&(label, lower, upper)| LabelCount {
            label: label.to_string(),
            count: rows
                .iter()
                .filter_map(|r| r.views)
                .filter(|&v| v > lower && v <= upper)
                .count(),
        })
        .collect()
}

/// Frequency table, most frequent first, ties broken alphabetically.
fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>, limit: usize) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
url,name,phone,location_short,latitude,longitude,price_per_person,views,event_types
u1,Alpha,+1,Xətai,40.40,49.86,35,5000,\"Nişan, Toy\"
u2,Beta,,Xətai,40.41,49.87,55,12000,Toy
u3,Gamma,+2,Xətai,,,75,30000,
u4,Delta,,Yasamal,40.38,49.80,50-70,60000,Toy
u5,Eps,,,abc,49.81,150,,\"Ad günü\"
";

    fn rows() -> Vec<VenueRow> {
        load_table(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_numeric_coercion() {
        let rows = rows();
        assert_eq!(rows[0].price, Some(35.0));
        assert_eq!(rows[3].price, None);
        assert_eq!(rows[4].latitude, None);
        assert_eq!(rows[4].views, None);
    }

    #[test]
    fn test_price_histogram_and_categories() {
        let rows = rows();
        let dist = price_distribution(&rows);
        assert_eq!(dist.count, 4);
        let counts: Vec<usize> = dist.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 0, 0, 1]);
        assert_eq!(dist.median, Some(65.0));

        let categories = price_categories(&rows);
        assert_eq!(categories.len(), 4);
        assert!(categories.iter().all(|c| c.count == 1));
        assert!(categories.iter().any(|c| c.label == "Luxury (>100)"));
    }

    #[test]
    fn test_top_views_descending() {
        let top = top_venues_by_views(&rows());
        let names: Vec<&str> = top.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Delta", "Gamma", "Beta", "Alpha"]);
        assert_eq!(top[0].price_tier, "unknown");
        assert_eq!(top[3].price_tier, "budget");
    }

    #[test]
    fn test_geo_points_need_both_coordinates() {
        assert_eq!(geographic_distribution(&rows()).len(), 3);
    }

    #[test]
    fn test_locations_and_events() {
        let rows = rows();
        assert_eq!(
            location_distribution(&rows),
            vec![
                LabelCount { label: "Xətai".into(), count: 3 },
                LabelCount { label: "Yasamal".into(), count: 1 },
            ]
        );
        let events = event_types(&rows);
        assert_eq!(events[0], LabelCount { label: "Toy".into(), count: 3 });
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_price_by_location_needs_three_samples() {
        let groups = price_by_location(&rows());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].location, "Xətai");
        assert_eq!(groups[0].median, 55.0);
    }

    #[test]
    fn test_popularity_bins() {
        let counts: Vec<usize> = popularity_distribution(&rows()).iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_completeness_percentages() {
        let completeness = data_completeness(&rows());
        let phone = completeness.iter().find(|c| c.field == "phone").unwrap();
        assert!((phone.percent - 40.0).abs() < 1e-9);
        let email = completeness.iter().find(|c| c.field == "email").unwrap();
        assert_eq!(email.percent, 0.0);
    }
}
