//! Catalog reconciliation
//!
//! Merges a freshly extracted batch into the persisted catalog. Series are
//! identified by URL and episodes by number within their series; existing
//! records are never removed or rewritten, only appended to.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::parser::identity_key;
use crate::types::{Catalog, EpisodeRecord, MergeSummary, SeriesRecord};

/// Merge `batch` into `catalog` using the current time.
pub fn reconcile(catalog: Catalog, batch: Vec<SeriesRecord>) -> (Catalog, MergeSummary) {
    reconcile_at(catalog, batch, Utc::now())
}

/// Merge `batch` into `catalog`, stamping mutations with `now`.
///
/// Unseen series are appended wholesale. For known series, episodes whose
/// number is not present yet are appended in batch order and the series'
/// `last_updated` moves to `now`. `last_update` is set even when nothing was
/// added, and `total_series` is recomputed from the series list.
pub fn reconcile_at(
    mut catalog: Catalog,
    batch: Vec<SeriesRecord>,
    now: DateTime<Utc>,
) -> (Catalog, MergeSummary) {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(catalog.series.len());
    for (position, series) in catalog.series.iter().enumerate() {
        index
            .entry(identity_key(&series.url).to_string())
            .or_insert(position);
    }

    let mut summary = MergeSummary::default();

    for mut incoming in batch {
        let key = identity_key(&incoming.url).to_string();
        match index.get(&key).copied() {
            Some(position) => {
                let existing = &mut catalog.series[position];
                let added = append_new_episodes(&mut existing.episodes, incoming.episodes);
                if added > 0 {
                    existing.last_updated = now;
                    summary.episodes_added += added;
                    tracing::debug!(url = %existing.url, added, "appended episodes");
                }
            }
            None => {
                incoming.episodes = dedup_episodes(incoming.episodes);
                tracing::debug!(url = %incoming.url, episodes = incoming.episodes.len(), "new series");
                index.insert(key, catalog.series.len());
                catalog.series.push(incoming);
                summary.series_added += 1;
            }
        }
    }

    catalog.total_series = catalog.series.len();
    catalog.last_update = Some(now);

    tracing::info!(
        series_added = summary.series_added,
        episodes_added = summary.episodes_added,
        total_series = catalog.total_series,
        "catalog reconciled"
    );

    (catalog, summary)
}

fn append_new_episodes(existing: &mut Vec<EpisodeRecord>, incoming: Vec<EpisodeRecord>) -> usize {
    let mut known: HashSet<u32> = existing.iter().map(|episode| episode.number).collect();
    let before = existing.len();
    existing.extend(incoming.into_iter().filter(|episode| known.insert(episode.number)));
    existing.len() - before
}

fn dedup_episodes(episodes: Vec<EpisodeRecord>) -> Vec<EpisodeRecord> {
    let mut seen = HashSet::new();
    episodes
        .into_iter()
        .filter(|episode| seen.insert(episode.number))
        .collect()
}
