use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use series_core::config::{DEFAULT_BASE_URL, DEFAULT_ENRICH_LIMIT, DEFAULT_LISTING_URL, DEFAULT_YEAR};
use series_core::parser::MAX_EPISODES;
use series_core::{ClientConfig, Pacing, ScraperConfig};

/// Scrape the series listing and merge new series and episodes into the local catalog.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Site origin used to absolutize relative links.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// First listing page URL; later pages add `page=N`.
    #[arg(long, default_value = DEFAULT_LISTING_URL)]
    pub listing_url: String,

    /// Year stamped on extracted series.
    #[arg(long, default_value = DEFAULT_YEAR)]
    pub year: String,

    /// First listing page to fetch (1-based).
    #[arg(long, default_value_t = 1)]
    pub start_page: u32,

    /// Last listing page to fetch (inclusive).
    #[arg(long, default_value_t = 5)]
    pub end_page: u32,

    /// Maximum episodes extracted per series.
    #[arg(long, default_value_t = MAX_EPISODES)]
    pub max_episodes: usize,

    /// Number of series whose episodes are extracted.
    #[arg(long, default_value_t = DEFAULT_ENRICH_LIMIT, conflicts_with = "all_series")]
    pub max_series: usize,

    /// Extract episodes for every discovered series.
    #[arg(long)]
    pub all_series: bool,

    /// Delay between listing pages.
    #[arg(long, default_value_t = 2000)]
    pub page_delay_ms: u64,

    /// Delay between episode page fetches.
    #[arg(long, default_value_t = 300)]
    pub episode_delay_ms: u64,

    /// Delay between series.
    #[arg(long, default_value_t = 1000)]
    pub series_delay_ms: u64,

    /// Per-request timeout.
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Upper bound on request rate (0 disables the limiter).
    #[arg(long, default_value_t = 5.0)]
    pub requests_per_second: f64,

    /// Abort extraction after this many seconds without touching the catalog.
    #[arg(long)]
    pub run_timeout_secs: Option<u64>,

    /// Catalog file.
    #[arg(long, default_value = "series_data.json")]
    pub data_file: PathBuf,

    /// Stats file written after each run.
    #[arg(long, default_value = "stats.json")]
    pub stats_file: PathBuf,

    /// More log output (-v debug, -vv trace); `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn scraper_config(&self) -> ScraperConfig {
        ScraperConfig {
            base_url: self.base_url.clone(),
            listing_url: self.listing_url.clone(),
            year: self.year.clone(),
            start_page: self.start_page,
            end_page: self.end_page,
            max_episodes: self.max_episodes,
            enrich_limit: (!self.all_series).then_some(self.max_series),
            pacing: Pacing {
                page_delay: Duration::from_millis(self.page_delay_ms),
                episode_delay: Duration::from_millis(self.episode_delay_ms),
                series_delay: Duration::from_millis(self.series_delay_ms),
            },
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            requests_per_second: self.requests_per_second,
            timeout_secs: self.timeout_secs,
            ..ClientConfig::default()
        }
    }
}
