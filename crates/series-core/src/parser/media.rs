//! Media URL resolution for episode pages
//!
//! Strategies are tried in order and the first hit wins. The string-level
//! pattern scans run before anything parses the page, and streaming
//! manifests win over progressive downloads.

use std::sync::LazyLock;

use regex_lite::Regex;
use scraper::Html;

use super::selector::{non_empty_attr, Query, SelectorChain};
use super::url::absolutize;

// The extension must end the path: an optional query or fragment may follow,
// then a character that cannot continue a URL path, or the end of input.
static MANIFEST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(https?://[^\s"'<>]+\.(?:m3u8|mpd)(?:[?#][^\s"'<>]*)?)(?:[^\w./%~-]|$)"#)
        .expect("manifest url pattern")
});

static PROGRESSIVE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(https?://[^\s"'<>]+\.(?:mp4|webm|mkv)(?:[?#][^\s"'<>]*)?)(?:[^\w./%~-]|$)"#)
        .expect("progressive url pattern")
});

static FRAME_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new([Query::tag("iframe").attr("src")]));

static VIDEO_SOURCE_CHAIN: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new([Query::tag("source").attr("src")]));

static VIDEO_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| SelectorChain::new([Query::tag("video")]));

/// One way of finding a playable URL in an episode page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStrategy {
    /// Absolute `.m3u8` / `.mpd` URL anywhere in the raw content
    StreamManifest,
    /// Absolute `.mp4` / `.webm` / `.mkv` URL anywhere in the raw content
    ProgressiveDownload,
    /// `src` of the first embedded frame
    EmbeddedFrame,
    /// `src` of a `source` nested in a `video` element
    VideoSource,
}

impl MediaStrategy {
    /// Default evaluation order.
    pub const ORDER: [MediaStrategy; 4] = [
        MediaStrategy::StreamManifest,
        MediaStrategy::ProgressiveDownload,
        MediaStrategy::EmbeddedFrame,
        MediaStrategy::VideoSource,
    ];

    fn is_structural(self) -> bool {
        matches!(self, Self::EmbeddedFrame | Self::VideoSource)
    }

    fn apply(self, content: &str, document: Option<&Html>) -> Option<String> {
        match self {
            Self::StreamManifest => first_match(&MANIFEST_URL, content),
            Self::ProgressiveDownload => first_match(&PROGRESSIVE_URL, content),
            Self::EmbeddedFrame => {
                let document = document?;
                FRAME_CHAIN
                    .resolve(document)
                    .elements
                    .iter()
                    .find_map(|frame| non_empty_attr(frame, "src"))
            }
            Self::VideoSource => {
                let document = document?;
                VIDEO_CHAIN
                    .resolve(document)
                    .elements
                    .iter()
                    .find_map(|video| {
                        VIDEO_SOURCE_CHAIN
                            .resolve_in(*video)
                            .elements
                            .iter()
                            .find_map(|source| non_empty_attr(source, "src"))
                    })
            }
        }
    }
}

fn first_match(pattern: &Regex, content: &str) -> Option<String> {
    pattern
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolves a directly playable URL from raw episode page content.
///
/// # Example
/// ```
/// use series_core::parser::MediaResolver;
///
/// let resolver = MediaResolver::new("https://example.test");
/// let page = r#"<source src="https://cdn.test/a.mp4"> var hls = "https://cdn.test/a.m3u8";"#;
/// assert_eq!(resolver.resolve(Some(page)).as_deref(), Some("https://cdn.test/a.m3u8"));
/// assert_eq!(resolver.resolve(None), None);
/// ```
#[derive(Debug, Clone)]
pub struct MediaResolver {
    base_url: String,
    strategies: Vec<MediaStrategy>,
}

impl MediaResolver {
    /// Resolver with the default strategy order. Structural results are
    /// absolutized against `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            strategies: MediaStrategy::ORDER.to_vec(),
        }
    }

    /// Replace the strategy list.
    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = MediaStrategy>) -> Self {
        self.strategies = strategies.into_iter().collect();
        self
    }

    pub fn strategies(&self) -> &[MediaStrategy] {
        &self.strategies
    }

    /// Resolve a watch URL; `None` content means the page fetch failed.
    pub fn resolve(&self, content: Option<&str>) -> Option<String> {
        self.resolve_with_strategy(content).map(|(_, url)| url)
    }

    /// Like [`MediaResolver::resolve`], also reporting which strategy hit.
    pub fn resolve_with_strategy(&self, content: Option<&str>) -> Option<(MediaStrategy, String)> {
        let content = content?;
        let mut document: Option<Html> = None;

        for strategy in &self.strategies {
            if strategy.is_structural() && document.is_none() {
                document = Some(Html::parse_document(content));
            }
            if let Some(url) = strategy.apply(content, document.as_ref()) {
                return Some((*strategy, absolutize(&url, &self.base_url)));
            }
        }

        None
    }
}
