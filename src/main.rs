use anyhow::Context;
use clap::{Parser, Subcommand};
use shadliq_scraper::config::Config;
use shadliq_scraper::http_client::ReqwestFetcher;
use shadliq_scraper::listing::LinkFilter;
use shadliq_scraper::logging;
use shadliq_scraper::parser::extract_venue;
use shadliq_scraper::pipeline::CrawlSession;
use shadliq_scraper::report::{self, ChartReport};
use shadliq_scraper::types::PageFetcher;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "shadliq_scraper")]
#[command(about = "Venue directory scraper for shadliq.az")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (overrides $SCRAPER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the listing pages and every venue they link to, then write the CSV
    Crawl {
        #[arg(long)]
        first_page: Option<u32>,
        #[arg(long)]
        last_page: Option<u32>,
        /// Final CSV path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Checkpoint CSV path
        #[arg(long)]
        checkpoint: Option<PathBuf>,
        /// Append capacity_min/capacity_max columns
        #[arg(long)]
        include_capacity: bool,
        /// Append working_hours/website/social_media columns
        #[arg(long)]
        include_contact_extras: bool,
    },
    /// Print the venue URLs found on a range of listing pages
    Listing {
        #[arg(long)]
        first_page: Option<u32>,
        #[arg(long)]
        last_page: Option<u32>,
    },
    /// Scrape a single venue page and print the record as JSON
    Detail {
        #[arg(long)]
        url: String,
    },
    /// Compute chart datasets from a crawl CSV
    Report {
        #[arg(long, default_value = "output/shadliq_venues.csv")]
        input: PathBuf,
        #[arg(long, default_value = "output/shadliq_report.json")]
        output: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

fn apply_page_range(config: &mut Config, first: Option<u32>, last: Option<u32>) -> anyhow::Result<()> {
    if let Some(first) = first {
        config.site.first_page = first;
    }
    if let Some(last) = last {
        config.site.last_page = last;
    }
    anyhow::ensure!(
        config.site.first_page <= config.site.last_page,
        "first page {} is after last page {}",
        config.site.first_page,
        config.site.last_page
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Crawl {
            first_page,
            last_page,
            output,
            checkpoint,
            include_capacity,
            include_contact_extras,
        } => {
            apply_page_range(&mut config, first_page, last_page)?;
            if let Some(output) = output {
                config.output.output_path = output;
            }
            if let Some(checkpoint) = checkpoint {
                config.output.checkpoint_path = checkpoint;
            }
            config.output.include_capacity |= include_capacity;
            config.output.include_contact_extras |= include_contact_extras;

            let fetcher = ReqwestFetcher::new(&config.http)?;
            let session = CrawlSession::new(fetcher, config)?;
            match session.run().await {
                Ok(summary) => {
                    info!("Crawl finished");
                    println!("\n📊 Crawl results:");
                    println!("   Pages crawled: {}", summary.pages_crawled);
                    println!("   Unique venues: {}", summary.unique_venues);
                    println!("   Records written: {}", summary.records_written);
                    println!("   Checkpoints: {}", summary.checkpoints_written);
                    println!("   Failed venue fetches: {}", summary.failed_venues);
                    println!("   Output file: {}", summary.output_file);
                }
                Err(e) => {
                    error!("Crawl failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Listing {
            first_page,
            last_page,
        } => {
            apply_page_range(&mut config, first_page, last_page)?;
            let fetcher = ReqwestFetcher::new(&config.http)?;
            let mut session = CrawlSession::new(fetcher, config)?;
            for url in session.collect_venue_urls().await {
                println!("{url}");
            }
        }
        Commands::Detail { url } => {
            let fetcher = ReqwestFetcher::new(&config.http)?;
            let filter = LinkFilter::from_config(&config)?;
            let body = fetcher
                .fetch(&url)
                .await
                .with_context(|| format!("fetching {url}"))?;
            let record = extract_venue(&url, &body, filter.base(), None, &config.limits);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Report { input, output } => {
            let rows = report::load_table_from_path(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let chart_report = ChartReport::build(&rows);
            chart_report.log_summary();
            chart_report.write_json(&output)?;
            println!("✅ Chart datasets written to {}", output.display());
        }
    }
    Ok(())
}
