//! Episode list parser
//!
//! Parses a series detail page into the ordered list of episode page URLs.
//! Media resolution for each URL happens in the scraper, which owns fetching.

use std::sync::LazyLock;

use scraper::{ElementRef, Html};

use crate::error::Extracted;

use super::selector::{non_empty_attr, Query, SelectorChain};
use super::url::absolutize;

/// Maximum number of episodes taken from one series page.
pub const MAX_EPISODES: usize = 30;

static CANDIDATE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new([
        Query::tag("a").attr_contains("href", "/episode/"),
        Query::tag("div").class("Episode"),
        Query::tag("li").class("episode-item"),
        Query::tag("a").class("watch-episode"),
    ])
});

static NESTED_LINK: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new([Query::tag("a").attr("href")]));

/// Parse episode page URLs from a series detail page.
///
/// # Arguments
/// * `html` - Raw HTML content of the series page
/// * `base_url` - Site origin used to absolutize links
/// * `max` - Upper bound on returned URLs
///
/// # Returns
/// Absolute episode URLs in document order. Candidates without a usable link
/// are skipped and do not count towards `max`.
pub fn parse_episode_links(html: &str, base_url: &str, max: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let candidates = CANDIDATE_CHAIN.resolve(&document);

    tracing::debug!(
        candidates = candidates.elements.len(),
        layout = ?candidates.query_index,
        "resolved episode candidates"
    );

    let mut links = Vec::new();
    for (position, candidate) in candidates.elements.iter().enumerate() {
        if links.len() >= max {
            break;
        }
        match candidate_link(candidate) {
            Extracted::Found(href) => links.push(absolutize(&href, base_url)),
            Extracted::Skipped(reason) => {
                tracing::warn!(position, %reason, "skipping episode candidate");
            }
        }
    }

    links
}

fn candidate_link(candidate: &ElementRef) -> Extracted<String> {
    let href = if candidate.value().name() == "a" {
        non_empty_attr(candidate, "href")
    } else {
        NESTED_LINK
            .first_in(*candidate)
            .and_then(|link| non_empty_attr(&link, "href"))
    };

    match href {
        Some(href) => Extracted::Found(href),
        None => Extracted::skipped("episode candidate has no link"),
    }
}
