//! Query orchestration: ranked free-text search and filter-driven advanced
//! search over the in-memory index.
//!
//! Both paths are synchronous, re-entrant reads over an immutable index.
//! Advanced search ranks by nothing: every match carries the same fixed score
//! and results come back in the index's enumeration order.

use tracing::debug;

use crate::indexer::{IndexedRecord, SearchIndex};
use crate::interface::{FilterCriteria, SearchHit};
use crate::ranking::{rank, relevance_score};

/// Queries shorter than this are treated as "no search".
pub const MIN_QUERY_LEN: usize = 2;

/// Uniform score assigned to advanced-search matches.
pub const ADVANCED_MATCH_SCORE: u32 = 100;

/// Free-text search: score every indexed record, drop non-matches, sort by
/// descending relevance. A query under two characters returns nothing.
pub fn global_search(index: &SearchIndex, query: &str) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = index
        .iter()
        .filter_map(|entry| {
            let score = relevance_score(entry, &query);
            (score > 0).then(|| to_hit(entry, score))
        })
        .collect();
    rank(&mut hits);
    debug!(query = %query, hits = hits.len(), "global search");
    hits
}

/// Filter-driven search: every record passing the criteria is returned with
/// the uniform score, in enumeration order.
pub fn advanced_search(index: &SearchIndex, criteria: &FilterCriteria) -> Vec<SearchHit> {
    let hits: Vec<SearchHit> = index
        .iter()
        .filter(|entry| matches_filters(entry, criteria))
        .map(|entry| to_hit(entry, ADVANCED_MATCH_SCORE))
        .collect();
    debug!(hits = hits.len(), "advanced search");
    hits
}

/// Pure filter predicate; short-circuits on the first failing clause.
///
/// Records without a timestamp pass both date clauses. A missing status or
/// location field rejects under its active clause.
pub fn matches_filters(entry: &IndexedRecord, criteria: &FilterCriteria) -> bool {
    if let Some(from) = criteria.date_from {
        if matches!(entry.record.timestamp(), Some(ts) if ts < from) {
            return false;
        }
    }
    if let Some(to) = criteria.date_to {
        if matches!(entry.record.timestamp(), Some(ts) if ts > to) {
            return false;
        }
    }

    if criteria.status != "all" {
        match entry.record.status() {
            Some(status) if status == criteria.status => {}
            _ => return false,
        }
    }

    if !criteria.location.is_empty() {
        let needle = criteria.location.to_lowercase();
        match entry.record.location() {
            Some(location) if location.to_lowercase().contains(&needle) => {}
            _ => return false,
        }
    }

    if !criteria.user.is_empty() {
        let needle = criteria.user.to_lowercase();
        if !entry.search_text.contains(&needle) {
            return false;
        }
    }

    true
}

fn to_hit(entry: &IndexedRecord, score: u32) -> SearchHit {
    SearchHit {
        id: entry.id.clone(),
        record_type: entry.record_type,
        record: entry.record.clone(),
        score,
    }
}
