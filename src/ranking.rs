//! Relevance scoring for free-text search.
//!
//! The formula is additive over whitespace-separated query words, with a
//! full-query phrase bonus and per-type bonuses on top. The phrase bonus is
//! applied inside the per-word substring branch, so it repeats once per
//! matching word; that duplication is inherited behavior kept as-is, pending
//! product clarification.

use crate::indexer::IndexedRecord;
use crate::interface::{RecordType, SearchHit};

/// Points for a query word appearing as a substring of the search text.
const WORD_SUBSTRING_POINTS: u32 = 10;
/// Points added per matching word when the full query is also a substring.
const PHRASE_BONUS_POINTS: u32 = 20;
/// Points for a keyword containing the query word.
const KEYWORD_CONTAINS_POINTS: u32 = 5;
/// Points for a keyword starting with the query word.
const KEYWORD_PREFIX_POINTS: u32 = 3;
/// Per-type bonus when the query names the record's category.
const TYPE_BONUS_POINTS: u32 = 5;

/// Score a single indexed record against a query.
///
/// The query must already be trimmed and lowercased; queries shorter than two
/// characters are rejected upstream and never reach here. Returns 0 for no
/// match; callers drop non-positive scores.
pub fn relevance_score(entry: &IndexedRecord, query: &str) -> u32 {
    let mut score = 0;

    for word in query.split_whitespace() {
        if entry.search_text.contains(word) {
            score += WORD_SUBSTRING_POINTS;
            if entry.search_text.contains(query) {
                score += PHRASE_BONUS_POINTS;
            }
        }
        if entry.keywords.iter().any(|k| k.contains(word)) {
            score += KEYWORD_CONTAINS_POINTS;
        }
        if entry.keywords.iter().any(|k| k.starts_with(word)) {
            score += KEYWORD_PREFIX_POINTS;
        }
    }

    if entry.record_type == RecordType::AccessHistory && query.contains("access") {
        score += TYPE_BONUS_POINTS;
    }
    if entry.record_type == RecordType::Notification && query.contains("notification") {
        score += TYPE_BONUS_POINTS;
    }

    score
}

/// Order hits by descending score. The sort is stable, so equal scores keep
/// the index's insertion order.
pub fn rank(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| b.score.cmp(&a.score));
}
