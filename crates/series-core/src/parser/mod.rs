//! HTML parsers for the listing site
//!
//! This module contains the structural extraction layer:
//! - `selector`: ordered selector chains with first-match semantics
//! - `listing`: parse catalog pages into series records
//! - `episodes`: parse series pages into episode page URLs
//! - `media`: resolve playable URLs from episode pages
//! - `url`: URL normalization against the site origin

pub mod episodes;
pub mod listing;
pub mod media;
pub mod selector;
pub mod url;

// Re-export main parsing functions
pub use episodes::{parse_episode_links, MAX_EPISODES};
pub use listing::{normalize_title, page_url, parse_listing, UNKNOWN_TITLE};
pub use media::{MediaResolver, MediaStrategy};
pub use selector::{Query, Resolved, SelectorChain};
pub use url::{absolutize, identity_key};
