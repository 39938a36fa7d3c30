//! URL canonicalisation used to detect duplicate results.
//!
//! Two URLs that differ only in letter case of the host, default port,
//! fragment, trailing slash, query-parameter order or tracking parameters
//! refer to the same page and produce the same key.

use url::Url;

/// Query parameters that only track the click and never change the page.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "si",
    "feature",
];

/// Canonical form of `raw` for equality comparison.
///
/// Unparsable input is returned unchanged, so it still compares equal to
/// an identical string.
///
/// # Examples
///
/// ```
/// use docscout_search::orchestrator::url_normalize::normalize_url;
///
/// let a = normalize_url("https://Docs.Python.org/3/library/asyncio.html?utm_source=x#top");
/// let b = normalize_url("https://docs.python.org/3/library/asyncio.html");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw.trim()) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);

    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    // Url::parse already lowercases scheme and host.
    parsed.to_string()
}
