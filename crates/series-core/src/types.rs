//! Data types for the series catalog
//!
//! This module contains the records produced by extraction and the persisted
//! catalog root. All types serialize with camelCase field names; absent
//! optional values are written as `null` rather than omitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status marker written on every freshly extracted series.
pub const STATUS_ONGOING: &str = "ongoing";

/// One serialized show, identified by its canonical detail-page URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    /// Run-local identifier (`page{N}_{index}`)
    pub id: String,
    /// Display title with leaked numeric prefixes removed
    pub title: String,
    /// Absolute detail-page URL; the identity key
    pub url: String,
    /// Absolute thumbnail URL, or empty
    pub image_url: String,
    pub year: String,
    pub status: String,
    /// Episodes ordered as first captured, unique by `number`
    pub episodes: Vec<EpisodeRecord>,
    pub last_updated: DateTime<Utc>,
    /// Listing page the series was first seen on
    pub source_page: u32,
}

impl SeriesRecord {
    /// Number of episodes with a resolved watch URL.
    pub fn episodes_with_watch_url(&self) -> usize {
        self.episodes
            .iter()
            .filter(|episode| episode.watch_url.is_some())
            .count()
    }
}

/// One installment of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// 1-based ordinal, unique within the owning series
    pub number: u32,
    pub title: String,
    /// Absolute URL of the episode detail page
    pub url: String,
    /// Directly playable media URL, if one was resolved
    pub watch_url: Option<String>,
    pub added_date: DateTime<Utc>,
}

impl EpisodeRecord {
    /// Synthesized display label for an episode number.
    pub fn label(number: u32) -> String {
        format!("Episode {}", number)
    }
}

/// Persisted catalog root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    pub series: Vec<SeriesRecord>,
    /// Time of the most recent merge; `None` for a fresh catalog
    pub last_update: Option<DateTime<Utc>>,
    /// Always equal to `series.len()` after a merge
    pub total_series: usize,
}

impl Catalog {
    /// Total episodes across all series, computed from the current state.
    pub fn total_episodes(&self) -> usize {
        self.series.iter().map(|series| series.episodes.len()).sum()
    }

    /// Episodes across all series that carry a watch URL.
    pub fn episodes_with_watch_url(&self) -> usize {
        self.series
            .iter()
            .map(SeriesRecord::episodes_with_watch_url)
            .sum()
    }
}

/// Counts produced by one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    pub series_added: usize,
    pub episodes_added: usize,
}

/// Observational summary emitted after each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total_series: usize,
    pub total_episodes: usize,
    pub episodes_with_watch_url: usize,
    pub pages_scraped: u32,
    pub last_update: Option<DateTime<Utc>>,
    /// Listing URL the run was pointed at
    pub source_url: String,
}

impl RunStats {
    /// Derive stats from the catalog as it stands after a merge.
    pub fn from_catalog(catalog: &Catalog, pages_scraped: u32, source_url: &str) -> Self {
        Self {
            total_series: catalog.series.len(),
            total_episodes: catalog.total_episodes(),
            episodes_with_watch_url: catalog.episodes_with_watch_url(),
            pages_scraped,
            last_update: catalog.last_update,
            source_url: source_url.to_string(),
        }
    }
}

/// Result of a full run: what the merge added and the resulting stats.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub summary: MergeSummary,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(number: u32, watch_url: Option<&str>) -> EpisodeRecord {
        EpisodeRecord {
            number,
            title: EpisodeRecord::label(number),
            url: format!("https://example.test/episode/{}", number),
            watch_url: watch_url.map(str::to_string),
            added_date: Utc::now(),
        }
    }

    fn series(url: &str, episodes: Vec<EpisodeRecord>) -> SeriesRecord {
        SeriesRecord {
            id: "page1_0".to_string(),
            title: "Drama Show".to_string(),
            url: url.to_string(),
            image_url: String::new(),
            year: "2026".to_string(),
            status: STATUS_ONGOING.to_string(),
            episodes,
            last_updated: Utc::now(),
            source_page: 1,
        }
    }

    #[test]
    fn test_episode_label() {
        assert_eq!(EpisodeRecord::label(7), "Episode 7");
    }

    #[test]
    fn test_episode_serializes_absent_watch_url_as_null() {
        let json = serde_json::to_value(episode(1, None)).unwrap();
        assert!(json.get("watchUrl").unwrap().is_null());
        assert!(json.get("addedDate").is_some());
    }

    #[test]
    fn test_series_serialization_uses_camel_case() {
        let json = serde_json::to_value(series("https://example.test/series/1", vec![])).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("lastUpdated").is_some());
        assert_eq!(json.get("sourcePage").unwrap(), 1);
    }

    #[test]
    fn test_catalog_default_and_missing_fields() {
        let catalog: Catalog = serde_json::from_str("{}").unwrap();
        assert_eq!(catalog, Catalog::default());
        assert!(catalog.last_update.is_none());

        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json.get("lastUpdate").unwrap().is_null());
        assert_eq!(json.get("totalSeries").unwrap(), 0);
    }

    #[test]
    fn test_catalog_round_trip_is_lossless() {
        let catalog = Catalog {
            series: vec![series(
                "https://example.test/series/1",
                vec![episode(1, Some("https://cdn.test/1.m3u8")), episode(2, None)],
            )],
            last_update: Some(Utc::now()),
            total_series: 1,
        };
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn test_aggregates_are_derived() {
        let catalog = Catalog {
            series: vec![
                series(
                    "https://example.test/series/1",
                    vec![episode(1, Some("https://cdn.test/1.mp4")), episode(2, None)],
                ),
                series("https://example.test/series/2", vec![episode(1, None)]),
            ],
            last_update: None,
            total_series: 2,
        };
        assert_eq!(catalog.total_episodes(), 3);
        assert_eq!(catalog.episodes_with_watch_url(), 1);

        let stats = RunStats::from_catalog(&catalog, 5, "https://example.test/series");
        assert_eq!(stats.total_series, 2);
        assert_eq!(stats.total_episodes, 3);
        assert_eq!(stats.episodes_with_watch_url, 1);
        assert_eq!(stats.pages_scraped, 5);
    }
}
