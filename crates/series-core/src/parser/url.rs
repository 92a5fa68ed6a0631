//! URL normalization against the site origin

/// Make `url` absolute relative to `base` (a scheme + host origin).
///
/// Empty input stays empty and URLs that already carry a scheme are returned
/// unchanged.
///
/// # Examples
/// ```
/// use series_core::parser::absolutize;
///
/// assert_eq!(absolutize("/series/42", "https://example.test"), "https://example.test/series/42");
/// assert_eq!(absolutize("https://cdn.test/a.jpg", "https://example.test"), "https://cdn.test/a.jpg");
/// assert_eq!(absolutize("", "https://example.test"), "");
/// ```
pub fn absolutize(url: &str, base: &str) -> String {
    let url = url.trim();
    if url.is_empty() || has_scheme(url) {
        return url.to_string();
    }

    let base = base.trim_end_matches('/');
    if let Some(rest) = url.strip_prefix("//") {
        let scheme = base.split("://").next().unwrap_or("https");
        return format!("{}://{}", scheme, rest);
    }
    if url.starts_with('/') {
        format!("{}{}", base, url)
    } else {
        format!("{}/{}", base, url)
    }
}

/// Identity key used to match series across runs.
pub fn identity_key(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

fn has_scheme(url: &str) -> bool {
    match url.find("://") {
        Some(idx) => {
            let scheme = &url[..idx];
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
