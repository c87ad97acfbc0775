use crate::config::Config;
use crate::error::Result;
use crate::listing::{crawl_listing_page, LinkFilter};
use crate::parser::extract_venue;
use crate::storage::RecordSink;
use crate::types::{ListingHint, PageFetcher, VenueRecord};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Result of a complete crawl.
#[derive(Debug, Serialize)]
pub struct CrawlSummary {
    pub pages_crawled: u32,
    pub unique_venues: usize,
    pub records_written: usize,
    pub checkpoints_written: usize,
    pub failed_venues: usize,
    pub output_file: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Owns everything one crawl mutates: the hint cache filled by the listing
/// stage and drained by the detail stage, and the record sink.
pub struct CrawlSession<F: PageFetcher> {
    fetcher: F,
    config: Config,
    filter: LinkFilter,
    hints: HashMap<String, ListingHint>,
    sink: RecordSink,
    failed_venues: usize,
}

impl<F: PageFetcher> CrawlSession<F> {
    pub fn new(fetcher: F, config: Config) -> Result<Self> {
        config.validate()?;
        let filter = LinkFilter::from_config(&config)?;
        let sink = RecordSink::new(config.columns(), &config.output);
        Ok(Self {
            fetcher,
            config,
            filter,
            hints: HashMap::new(),
            sink,
            failed_venues: 0,
        })
    }

    pub fn sink(&self) -> &RecordSink {
        &self.sink
    }

    pub fn pending_hints(&self) -> usize {
        self.hints.len()
    }

    /// Stage 1: every listing page in range, URLs in first-seen order.
    #[instrument(skip(self))]
    pub async fn collect_venue_urls(&mut self) -> Vec<String> {
        let mut urls = Vec::new();
        let mut seen = HashSet::new();

        for page_number in self.config.site.first_page..=self.config.site.last_page {
            let page = crawl_listing_page(&self.fetcher, &self.config, &self.filter, page_number).await;
            for (url, hint) in page.hints {
                self.hints.entry(url).or_insert(hint);
            }
            urls.extend(page.urls.into_iter().filter(|u| seen.insert(u.clone())));
            pause(self.config.listing_delay()).await;
        }

        info!("Total unique venues found: {}", urls.len());
        info!("Listing data collected for: {} venues", self.hints.len());
        urls
    }

    /// Fetches one detail page. Never fails: a page that cannot be fetched
    /// yields the hint-seeded record with every other field empty.
    #[instrument(skip(self))]
    pub async fn scrape_venue(&mut self, url: &str) -> VenueRecord {
        let hint = self.hints.remove(url);
        info!("Scraping venue: {}", url);

        let record = match self.fetcher.fetch(url).await {
            Ok(body) => extract_venue(url, &body, self.filter.base(), hint.as_ref(), &self.config.limits),
            Err(e) => {
                self.failed_venues += 1;
                counter!("shadliq_fetch_errors_total", "kind" => "detail").increment(1);
                warn!("Error scraping venue {}: {}", url, e);
                VenueRecord::with_hint(url, hint)
            }
        };
        counter!("shadliq_venues_scraped_total").increment(1);
        pause(self.config.detail_delay()).await;
        record
    }

    /// Stage 2 plus the final save.
    pub async fn run(mut self) -> Result<CrawlSummary> {
        let started_at = Utc::now();
        info!("Starting crawl of {}", self.config.site.base_url);

        let urls = self.collect_venue_urls().await;
        let total = urls.len();
        for (i, url) in urls.iter().enumerate() {
            info!("[{}/{}]", i + 1, total);
            let record = self.scrape_venue(url).await;
            self.sink.push(record);
        }
        if !self.hints.is_empty() {
            warn!("{} listing hints were never consumed", self.hints.len());
            self.hints.clear();
        }

        info!("Scraping completed! Total venues scraped: {}", self.sink.records().len());
        self.sink.finish()?;

        Ok(CrawlSummary {
            pages_crawled: self.config.site.last_page - self.config.site.first_page + 1,
            unique_venues: total,
            records_written: self.sink.records().len(),
            checkpoints_written: self.sink.checkpoints_written(),
            failed_venues: self.failed_venues,
            output_file: self.sink.output_path().display().to_string(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
