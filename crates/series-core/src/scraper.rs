//! Main scraper API
//!
//! This module combines the fetcher with the parsers and the reconciler:
//! listing pages are turned into series, the first few series are enriched
//! with episodes and watch URLs, and the batch is merged into the stored
//! catalog in a single load-merge-save cycle.

use std::time::Duration;

use chrono::Utc;

use crate::client::{ClientConfig, Fetcher, SiteClient};
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::parser::{page_url, parse_episode_links, parse_listing, MediaResolver};
use crate::reconcile::reconcile;
use crate::store::{CatalogStore, StatsSink};
use crate::types::{Catalog, EpisodeRecord, MergeSummary, RunReport, RunStats, SeriesRecord};

/// Series extracted from the listing pages of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingBatch {
    pub series: Vec<SeriesRecord>,
    /// Listing pages whose content was retrieved
    pub pages_scraped: u32,
}

/// Scraper for the listing site
///
/// Sequential by design: one page, series or episode at a time, with the
/// configured pacing between fetches. Nothing is persisted until the whole
/// batch has been extracted.
///
/// # Example
/// ```no_run
/// use series_core::{JsonCatalogStore, JsonStatsSink, ScraperConfig, SeriesScraper};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let scraper = SeriesScraper::new(ScraperConfig::default())?;
///     let store = JsonCatalogStore::new("series_data.json");
///     let stats = JsonStatsSink::new("stats.json");
///
///     let report = scraper.run(&store, &stats).await?;
///     println!("{} new series", report.summary.series_added);
///     Ok(())
/// }
/// ```
pub struct SeriesScraper<F = SiteClient> {
    fetcher: F,
    config: ScraperConfig,
    media: MediaResolver,
}

impl SeriesScraper<SiteClient> {
    /// Create a scraper with the default client settings.
    ///
    /// The client's referer is set to the configured site origin.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        Self::with_client_config(config, ClientConfig::default())
    }

    /// Create a scraper with custom client settings.
    pub fn with_client_config(config: ScraperConfig, mut client: ClientConfig) -> Result<Self> {
        if client.referer.is_none() {
            client.referer = Some(config.referer());
        }
        let fetcher = SiteClient::with_config(client)?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: Fetcher> SeriesScraper<F> {
    /// Create a scraper over any fetcher.
    ///
    /// This is useful for testing or when pages come from somewhere other
    /// than the live site.
    pub fn with_fetcher(fetcher: F, config: ScraperConfig) -> Self {
        let media = MediaResolver::new(&config.base_url);
        Self {
            fetcher,
            config,
            media,
        }
    }

    /// Replace the media resolver (for a different strategy order).
    pub fn with_media_resolver(mut self, media: MediaResolver) -> Self {
        self.media = media;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetch a page, logging and swallowing failures.
    async fn fetch_content(&self, url: &str) -> Option<String> {
        match self.fetcher.fetch(url).await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!(url, error = %e, "fetch failed");
                None
            }
        }
    }

    /// Scrape one listing page.
    ///
    /// # Returns
    /// * `Some(series)` when the page was retrieved (possibly with no cards)
    /// * `None` when the fetch failed
    pub async fn scrape_page(&self, page: u32) -> Option<Vec<SeriesRecord>> {
        let url = page_url(&self.config.listing_url, page);
        let html = self.fetch_content(&url).await?;
        let series = parse_listing(&html, page, &self.config.base_url, &self.config.year);
        tracing::info!(page, series = series.len(), "listing page scraped");
        Some(series)
    }

    /// Scrape every configured listing page in order.
    pub async fn scrape_listing_pages(&self) -> ListingBatch {
        let mut batch = ListingBatch::default();
        let pages = self.config.pages();
        let last = *pages.end();

        for page in pages {
            match self.scrape_page(page).await {
                Some(series) => {
                    batch.pages_scraped += 1;
                    batch.series.extend(series);
                }
                None => tracing::warn!(page, "listing page skipped"),
            }

            if page < last {
                pause(self.config.pacing.page_delay).await;
            }
        }

        tracing::info!(
            pages = batch.pages_scraped,
            series = batch.series.len(),
            "listing complete"
        );
        batch
    }

    /// Resolve the watch URL of one episode page.
    ///
    /// A failed fetch yields `None`, the same as a page without media.
    pub async fn resolve_watch_url(&self, episode_url: &str) -> Option<String> {
        let content = self.fetch_content(episode_url).await;
        self.media.resolve(content.as_deref())
    }

    /// Extract up to `max_episodes` episodes from a series page.
    ///
    /// Episodes are numbered by their position among the links that could
    /// be extracted. A failed series fetch yields no episodes.
    pub async fn extract_episodes(&self, series_url: &str) -> Vec<EpisodeRecord> {
        let Some(html) = self.fetch_content(series_url).await else {
            return Vec::new();
        };
        let links = parse_episode_links(&html, &self.config.base_url, self.config.max_episodes);

        let mut episodes = Vec::with_capacity(links.len());
        for (index, url) in links.into_iter().enumerate() {
            if index > 0 {
                pause(self.config.pacing.episode_delay).await;
            }

            let number = index as u32 + 1;
            let watch_url = self.resolve_watch_url(&url).await;
            match &watch_url {
                Some(found) => tracing::debug!(number, watch_url = %found, "episode resolved"),
                None => tracing::debug!(number, url = %url, "episode has no watch url"),
            }

            episodes.push(EpisodeRecord {
                number,
                title: EpisodeRecord::label(number),
                url,
                watch_url,
                added_date: Utc::now(),
            });
        }

        episodes
    }

    /// Attach episodes to the leading series of a batch.
    ///
    /// Only the first `enrich_limit` series are processed; the rest keep
    /// their empty episode lists.
    pub async fn enrich(&self, series: &mut [SeriesRecord]) {
        let limit = self
            .config
            .enrich_limit
            .unwrap_or(series.len())
            .min(series.len());

        tracing::info!(limit, total = series.len(), "extracting episodes");

        for (index, record) in series.iter_mut().take(limit).enumerate() {
            if index > 0 {
                pause(self.config.pacing.series_delay).await;
            }

            record.episodes = self.extract_episodes(&record.url).await;
            tracing::info!(
                progress = %format!("{}/{}", index + 1, limit),
                title = %truncate(&record.title, 50),
                episodes = record.episodes.len(),
                "series enriched"
            );
        }
    }

    /// Scrape listing pages and enrich the result.
    pub async fn collect(&self) -> ListingBatch {
        let mut batch = self.scrape_listing_pages().await;
        self.enrich(&mut batch.series).await;
        batch
    }

    /// Collect a batch and merge it into the stored catalog in memory.
    ///
    /// Nothing is written; dropping the returned merge leaves the stored
    /// catalog as it was.
    pub async fn prepare(&self, store: &dyn CatalogStore) -> PreparedRun {
        let batch = self.collect().await;

        let catalog = store.load().await;
        let (catalog, summary) = reconcile(catalog, batch.series);

        PreparedRun {
            catalog,
            summary,
            pages_scraped: batch.pages_scraped,
            source_url: self.config.listing_url.clone(),
        }
    }

    /// Full run: [`SeriesScraper::prepare`] followed by [`PreparedRun::commit`].
    ///
    /// # Errors
    /// Only a failed catalog save is returned; a failed stats write is logged.
    pub async fn run(&self, store: &dyn CatalogStore, stats: &dyn StatsSink) -> Result<RunReport> {
        self.prepare(store).await.commit(store, stats).await
    }
}

/// A merged catalog that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRun {
    pub catalog: Catalog,
    pub summary: MergeSummary,
    pub pages_scraped: u32,
    source_url: String,
}

impl PreparedRun {
    /// Save the catalog, then publish stats.
    ///
    /// # Errors
    /// Only a failed catalog save is returned; a failed stats write is logged.
    pub async fn commit(self, store: &dyn CatalogStore, stats: &dyn StatsSink) -> Result<RunReport> {
        if let Err(e) = store.save(&self.catalog).await {
            tracing::error!(error = %e, "failed to save catalog");
            return Err(e);
        }

        let run_stats = RunStats::from_catalog(&self.catalog, self.pages_scraped, &self.source_url);
        if let Err(e) = stats.publish(&run_stats).await {
            tracing::warn!(error = %e, "failed to publish stats");
        }

        tracing::info!(
            total_series = run_stats.total_series,
            total_episodes = run_stats.total_episodes,
            with_watch_url = run_stats.episodes_with_watch_url,
            "run complete"
        );

        Ok(RunReport {
            summary: self.summary,
            stats: run_stats,
        })
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
