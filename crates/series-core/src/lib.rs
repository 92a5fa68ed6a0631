//! Series catalog scraper core library
//!
//! This crate discovers serialized video content from a paginated listing
//! site and keeps a durable, incrementally merged local catalog.
//!
//! # Features
//! - Selector chains that tolerate several revisions of the site markup
//! - Listing, episode and media extraction with per-item failure isolation
//! - Idempotent reconciliation keyed by series URL and episode number
//! - Atomic JSON persistence of the catalog and run stats
//! - Rate-limited HTTP client with fixed pacing between fetches

pub mod client;
pub mod config;
pub mod error;
pub mod parser;
pub mod reconcile;
pub mod scraper;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use client::{ClientConfig, Fetcher, RateLimiter, SiteClient};
pub use config::{Pacing, ScraperConfig};
pub use error::{ErrorKind, Extracted, Result, ScrapeError};
pub use reconcile::{reconcile, reconcile_at};
pub use scraper::{ListingBatch, PreparedRun, SeriesScraper};
pub use store::{CatalogStore, JsonCatalogStore, JsonStatsSink, StatsSink};
pub use types::{Catalog, EpisodeRecord, MergeSummary, RunReport, RunStats, SeriesRecord};
