//! In-memory search index over the portal collections.
//!
//! The index is rebuilt whole on demand; entries own copies of their source
//! records and are never mutated in place. Insertion order is stable: an id
//! collision overwrites the earlier entry but keeps its original position,
//! which makes tie-breaks in ranking deterministic.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::interface::{Clock, RecordType};
use crate::models::Record;
use crate::store::{self, collections, RecordStore};

/// Words carrying no search signal, dropped from keyword extraction.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
        "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
        "would", "could", "should",
    ]
    .into_iter()
    .collect()
});

/// Minimum keyword length; shorter tokens are noise.
const MIN_KEYWORD_LEN: usize = 3;

/// One indexed record: an owned copy of the source plus its derived
/// searchable representation.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    pub id: String,
    pub record_type: RecordType,
    pub record: Record,
    /// Lowercased single-space concatenation of the record's scalar fields.
    pub search_text: String,
    /// Deduplicated tokens of `search_text`, first-occurrence order, stop
    /// words and short tokens removed.
    pub keywords: Vec<String>,
}

/// The whole searchable index, rebuilt on demand from the record store.
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<IndexedRecord>,
    by_id: HashMap<String, usize>,
    fallback_id: i64,
}

impl SearchIndex {
    /// Build an index from an explicit record sequence. The clock seeds the
    /// fallback id counter for records carrying neither id nor timestamp.
    pub fn build(records: impl IntoIterator<Item = Record>, clock: &dyn Clock) -> Self {
        let mut index = Self {
            entries: Vec::new(),
            by_id: HashMap::new(),
            fallback_id: clock.now().timestamp_millis(),
        };
        for record in records {
            index.insert(record);
        }
        debug!(entries = index.len(), "search index rebuilt");
        index
    }

    /// Rebuild from every indexed collection in the store: access history,
    /// the session profile, notifications, and the security log.
    pub fn from_store(store: &dyn RecordStore, clock: &dyn Clock) -> Self {
        let mut records: Vec<Record> = Vec::new();
        records.extend(
            store::load_history(store)
                .into_iter()
                .map(Record::AccessHistory),
        );
        if let Some(user) = store::load_session(store).user {
            records.push(Record::UserProfile(user));
        }
        records.extend(
            store::load_collection(store, collections::NOTIFICATIONS)
                .into_iter()
                .map(Record::Notification),
        );
        records.extend(
            store::load_collection(store, collections::SECURITY_LOG)
                .into_iter()
                .map(Record::SecurityLog),
        );
        Self::build(records, clock)
    }

    /// Index one record. An existing id is overwritten in place, keeping its
    /// first-insertion position. Malformed records still get an entry; an
    /// empty search text just yields no keywords.
    pub fn insert(&mut self, record: Record) {
        let id = match record.record_id() {
            Some(id) => id,
            None => match record.timestamp() {
                Some(ts) => timestamp_id(ts),
                None => {
                    self.fallback_id += 1;
                    self.fallback_id.to_string()
                }
            },
        };
        let search_text = record.search_text().to_lowercase();
        let keywords = extract_keywords(&search_text);
        let entry = IndexedRecord {
            id: id.clone(),
            record_type: record.record_type(),
            record,
            search_text,
            keywords,
        };
        match self.by_id.get(&id) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.by_id.insert(id, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&IndexedRecord> {
        self.by_id.get(id).map(|&pos| &self.entries[pos])
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn timestamp_id(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Tokenize lowercased text into deduplicated keywords, dropping stop words
/// and tokens shorter than three characters.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split_whitespace()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|w| !STOP_WORDS.contains(w))
        .filter(|w| seen.insert(w.to_string()))
        .map(|w| w.to_string())
        .collect()
}
