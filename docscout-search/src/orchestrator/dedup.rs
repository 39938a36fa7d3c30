//! Rank-preserving result deduplication.
//!
//! Providers occasionally return the same page twice (with and without a
//! trailing slash, or with tracking parameters). Only the first, highest
//! ranked occurrence is kept and ranks are renumbered so they stay dense.

use std::collections::HashSet;

use crate::types::SearchResult;

use super::url_normalize::normalize_url;

/// Drop results with an empty URL and later duplicates of the same page.
///
/// The relative order of the survivors is unchanged and their `rank` is
/// rewritten to `1..=n`.
pub fn dedupe_in_rank_order(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::with_capacity(results.len());

    results
        .into_iter()
        .filter(|r| !r.url.trim().is_empty())
        .filter(|r| seen.insert(normalize_url(&r.url)))
        .enumerate()
        .map(|(i, mut r)| {
            r.rank = i + 1;
            r
        })
        .collect()
}
