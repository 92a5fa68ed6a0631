//! Listing page parser
//!
//! Turns one catalog page into series records. Cards are located through a
//! selector chain ordered from the current site layout to generic grid
//! fallbacks; each card is extracted independently.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::error::Extracted;
use crate::types::{SeriesRecord, STATUS_ONGOING};

use super::selector::{element_text, non_empty_attr, Query, SelectorChain};
use super::url::absolutize;

/// Title used when a card has no heading-like element.
pub const UNKNOWN_TITLE: &str = "unknown";

static CARD_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new([
        Query::tag("div").class("MovieBlock"),
        Query::tag("div").class("SeriesCard"),
        Query::tag("article").class("movie-item"),
        Query::tag("div").class("col-lg-2 col-md-3 col-sm-4 col-6"),
        Query::tag("div").class("Thumb--GridItem"),
    ])
});

static TITLE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new([
        Query::tag("h3"),
        Query::tag("h4"),
        Query::tag("h5"),
        Query::tag("div").class("Title"),
        Query::tag("span").class("name"),
    ])
});

static LINK_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new([Query::tag("a").attr("href")]));

static IMAGE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| SelectorChain::new([Query::tag("img")]));

// Unicode-aware: titles carry Arabic-Indic digits and non-breaking spaces.
static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*:\s*").expect("ordinal prefix pattern"));

static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s]+").expect("numeric prefix pattern"));

/// Parse series cards from one listing page.
///
/// # Arguments
/// * `html` - Raw HTML content of the listing page
/// * `page` - 1-based page index, recorded on every series
/// * `base_url` - Site origin used to absolutize links and images
/// * `year` - Year stamped on every series
///
/// # Returns
/// Series in document order. A page without any recognised card yields an
/// empty list; cards without a link are skipped.
pub fn parse_listing(html: &str, page: u32, base_url: &str, year: &str) -> Vec<SeriesRecord> {
    let document = Html::parse_document(html);
    let cards = CARD_CHAIN.resolve(&document);

    tracing::debug!(
        page,
        cards = cards.elements.len(),
        layout = ?cards.query_index,
        "resolved listing cards"
    );

    let mut series = Vec::new();
    for (position, card) in cards.elements.iter().enumerate() {
        match parse_card(card, base_url) {
            Extracted::Found(draft) => {
                let id = format!("page{}_{}", page, series.len());
                series.push(draft.into_record(id, page, year));
            }
            Extracted::Skipped(reason) => {
                tracing::warn!(page, position, %reason, "skipping listing card");
            }
        }
    }

    series
}

/// Fields pulled out of a single card before run-level values are attached.
#[derive(Debug, Clone, PartialEq)]
struct CardDraft {
    title: String,
    url: String,
    image_url: String,
}

impl CardDraft {
    fn into_record(self, id: String, page: u32, year: &str) -> SeriesRecord {
        SeriesRecord {
            id,
            title: self.title,
            url: self.url,
            image_url: self.image_url,
            year: year.to_string(),
            status: STATUS_ONGOING.to_string(),
            episodes: Vec::new(),
            last_updated: Utc::now(),
            source_page: page,
        }
    }
}

fn parse_card(card: &ElementRef, base_url: &str) -> Extracted<CardDraft> {
    let Some(href) = LINK_CHAIN
        .first_in(*card)
        .and_then(|link| non_empty_attr(&link, "href"))
    else {
        return Extracted::skipped("card has no link");
    };

    let title = TITLE_CHAIN
        .first_in(*card)
        .map(|el| normalize_title(&element_text(&el)))
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let image_url = IMAGE_CHAIN
        .first_in(*card)
        .and_then(|img| non_empty_attr(&img, "src").or_else(|| non_empty_attr(&img, "data-src")))
        .map(|src| absolutize(&src, base_url))
        .unwrap_or_default();

    Extracted::Found(CardDraft {
        title,
        url: absolutize(&href, base_url),
        image_url,
    })
}

/// Strip numeric index artifacts from the start of a title.
///
/// # Examples
/// ```
/// use series_core::parser::normalize_title;
///
/// assert_eq!(normalize_title("45 : Breaking News"), "Breaking News");
/// assert_eq!(normalize_title("12 Drama Show"), "Drama Show");
/// assert_eq!(normalize_title("Drama Show"), "Drama Show");
/// ```
pub fn normalize_title(title: &str) -> String {
    let title = title.trim();
    let title = ORDINAL_PREFIX.replace(title, "");
    let title = NUMERIC_PREFIX.replace(&title, "");
    title.trim().to_string()
}

/// Listing URL for a 1-based page number.
///
/// The first page is the listing URL itself; later pages add a `page`
/// query parameter.
pub fn page_url(listing_url: &str, page: u32) -> String {
    if page <= 1 {
        return listing_url.to_string();
    }
    let separator = if listing_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", listing_url, separator, page)
}
