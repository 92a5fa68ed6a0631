//! Run configuration
//!
//! Defaults target the 2026 Arabic series listing; every value can be
//! overridden by the command line.

use std::time::Duration;

use crate::parser::MAX_EPISODES;

/// Site origin used to absolutize relative links
pub const DEFAULT_BASE_URL: &str = "https://ak.sv";

/// Listing query for the 2026 Arabic series section
pub const DEFAULT_LISTING_URL: &str =
    "https://ak.sv/series?section=29&category=87&rating=0&year=2026&language=1&formats=0&quality=0";

/// Year stamped on extracted series
pub const DEFAULT_YEAR: &str = "2026";

/// Number of series enriched with episodes per run
pub const DEFAULT_ENRICH_LIMIT: usize = 10;

/// Fixed delays between sequential fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between listing pages
    pub page_delay: Duration,
    /// Between episode page fetches within a series
    pub episode_delay: Duration,
    /// Between series
    pub series_delay: Duration,
}

impl Pacing {
    /// No delays at all (tests, local mirrors).
    pub fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            episode_delay: Duration::ZERO,
            series_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(2),
            episode_delay: Duration::from_millis(300),
            series_delay: Duration::from_secs(1),
        }
    }
}

/// Configuration for one scrape-and-merge run
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Site origin (default: https://ak.sv)
    pub base_url: String,
    /// First listing page; later pages add `page=N`
    pub listing_url: String,
    pub year: String,
    /// First listing page to fetch, 1-based (default: 1)
    pub start_page: u32,
    /// Last listing page to fetch, inclusive (default: 5)
    pub end_page: u32,
    /// Episode cap per series (default: 30)
    pub max_episodes: usize,
    /// How many series get episodes extracted; `None` means all
    pub enrich_limit: Option<usize>,
    pub pacing: Pacing,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            year: DEFAULT_YEAR.to_string(),
            start_page: 1,
            end_page: 5,
            max_episodes: MAX_EPISODES,
            enrich_limit: Some(DEFAULT_ENRICH_LIMIT),
            pacing: Pacing::default(),
        }
    }
}

impl ScraperConfig {
    /// Listing pages covered by this run.
    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.start_page.max(1)..=self.end_page
    }

    /// Referer header value for the configured origin.
    pub fn referer(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}
