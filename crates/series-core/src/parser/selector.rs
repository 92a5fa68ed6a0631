//! Ordered selector chains
//!
//! A chain is a priority list of structural queries. Resolving it returns the
//! matches of the first query that matches anything, so callers tolerate
//! several revisions of the site markup without branching on which one is live.

use scraper::{ElementRef, Html, Selector};

/// One structural query: a tag plus optional class and attribute constraints.
///
/// # Example
/// ```
/// use series_core::parser::Query;
///
/// let query = Query::tag("a").attr_contains("href", "/episode/");
/// assert_eq!(query.css(), "a[href*=\"/episode/\"]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<AttrConstraint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrConstraint {
    Present(String),
    Contains(String, String),
}

impl Query {
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: Vec::new(),
        }
    }

    /// Require a class. Whitespace separated input adds each class.
    pub fn class(mut self, class: &str) -> Self {
        self.classes
            .extend(class.split_whitespace().map(str::to_string));
        self
    }

    /// Require the attribute to be present.
    pub fn attr(mut self, name: &str) -> Self {
        self.attrs.push(AttrConstraint::Present(name.to_string()));
        self
    }

    /// Require the attribute value to contain `needle`.
    pub fn attr_contains(mut self, name: &str, needle: &str) -> Self {
        self.attrs
            .push(AttrConstraint::Contains(name.to_string(), needle.to_string()));
        self
    }

    /// Render the query as a CSS selector.
    pub fn css(&self) -> String {
        let mut css = self.tag.clone();
        for class in &self.classes {
            css.push('.');
            css.push_str(class);
        }
        for attr in &self.attrs {
            match attr {
                AttrConstraint::Present(name) => css.push_str(&format!("[{}]", name)),
                AttrConstraint::Contains(name, needle) => {
                    css.push_str(&format!("[{}*=\"{}\"]", name, needle.replace('"', "\\\"")))
                }
            }
        }
        css
    }
}

/// Matches produced by a chain, tagged with the query that produced them.
#[derive(Debug)]
pub struct Resolved<'a> {
    /// Index of the winning query, `None` when nothing matched
    pub query_index: Option<usize>,
    pub elements: Vec<ElementRef<'a>>,
}

impl<'a> Resolved<'a> {
    fn empty() -> Self {
        Self {
            query_index: None,
            elements: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Ordered list of compiled queries evaluated with short-circuit first-match.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    queries: Vec<(Query, Selector)>,
}

impl SelectorChain {
    /// Compile a chain. Queries that do not form a valid selector are
    /// dropped with a warning; the remaining order is preserved.
    pub fn new(queries: impl IntoIterator<Item = Query>) -> Self {
        let queries = queries
            .into_iter()
            .filter_map(|query| match Selector::parse(&query.css()) {
                Ok(selector) => Some((query, selector)),
                Err(e) => {
                    tracing::warn!(css = %query.css(), error = ?e, "dropping invalid selector");
                    None
                }
            })
            .collect();
        Self { queries }
    }

    /// Resolve against a whole document.
    pub fn resolve<'a>(&self, document: &'a Html) -> Resolved<'a> {
        self.resolve_in(document.root_element())
    }

    /// Resolve against the descendants of `scope`.
    pub fn resolve_in<'a>(&self, scope: ElementRef<'a>) -> Resolved<'a> {
        for (index, (_, selector)) in self.queries.iter().enumerate() {
            let elements: Vec<ElementRef<'a>> = scope.select(selector).collect();
            if !elements.is_empty() {
                return Resolved {
                    query_index: Some(index),
                    elements,
                };
            }
        }
        Resolved::empty()
    }

    /// First element of the first query that matches inside `scope`.
    pub fn first_in<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.queries
            .iter()
            .find_map(|(_, selector)| scope.select(selector).next())
    }
}

/// Collected text of an element, trimmed.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Non-empty, trimmed attribute value.
pub fn non_empty_attr(element: &ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SelectorChain {
        SelectorChain::new([
            Query::tag("div").class("MovieBlock"),
            Query::tag("article").class("movie-item"),
            Query::tag("div").class("Thumb--GridItem"),
        ])
    }

    #[test]
    fn test_query_css_rendering() {
        assert_eq!(Query::tag("div").class("MovieBlock").css(), "div.MovieBlock");
        assert_eq!(
            Query::tag("div").class("col-lg-2 col-6").css(),
            "div.col-lg-2.col-6"
        );
        assert_eq!(Query::tag("iframe").attr("src").css(), "iframe[src]");
    }

    #[test]
    fn test_resolve_returns_only_third_query_matches() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="Other">x</div>
                <div class="Thumb--GridItem" id="a">a</div>
                <div class="Thumb--GridItem" id="b">b</div>
            </body></html>"#,
        );
        let resolved = chain().resolve(&html);
        assert_eq!(resolved.query_index, Some(2));
        let ids: Vec<_> = resolved
            .elements
            .iter()
            .filter_map(|el| el.value().attr("id"))
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_resolve_short_circuits_on_first_success() {
        let html = Html::parse_document(
            r#"<div class="MovieBlock">one</div><article class="movie-item">two</article>"#,
        );
        let resolved = chain().resolve(&html);
        assert_eq!(resolved.query_index, Some(0));
        assert_eq!(resolved.elements.len(), 1);
        assert_eq!(element_text(&resolved.elements[0]), "one");
    }

    #[test]
    fn test_resolve_no_match_is_empty() {
        let html = Html::parse_document("<html><body><p>nothing</p></body></html>");
        let resolved = chain().resolve(&html);
        assert!(resolved.is_empty());
        assert_eq!(resolved.query_index, None);
    }

    #[test]
    fn test_first_in_respects_priority() {
        let html = Html::parse_document(
            r#"<div id="card"><span class="name">Span</span><h4>Heading</h4></div>"#,
        );
        let card = html
            .select(&Selector::parse("#card").unwrap())
            .next()
            .unwrap();
        let titles = SelectorChain::new([
            Query::tag("h3"),
            Query::tag("h4"),
            Query::tag("span").class("name"),
        ]);
        assert_eq!(element_text(&titles.first_in(card).unwrap()), "Heading");
    }

    #[test]
    fn test_non_empty_attr() {
        let html = Html::parse_document(r#"<a id="x" href="  " title="t">x</a>"#);
        let link = html.select(&Selector::parse("#x").unwrap()).next().unwrap();
        assert_eq!(non_empty_attr(&link, "href"), None);
        assert_eq!(non_empty_attr(&link, "title"), Some("t".to_string()));
        assert_eq!(non_empty_attr(&link, "missing"), None);
    }
}
