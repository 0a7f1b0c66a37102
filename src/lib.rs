//! Warden - core engine for a simulated door-access portal.
//!
//! Implements the searchable record index with relevance ranking, structured
//! filtering, the capture -> mock recognition -> history lifecycle, and the
//! dashboard aggregates derived from access history. Storage is an injected
//! key-value collection store; presentation, export encoding, and camera I/O
//! live outside this crate.

pub mod access;
pub mod dashboard;
pub mod export;
mod indexer;
pub mod interface;
pub mod models;
pub mod ranking;
pub mod search;
pub mod store;

pub use access::{AccessController, MockRecognizer, Recognition, Recognizer};
pub use indexer::{IndexedRecord, SearchIndex};
pub use interface::*;
pub use store::{MemoryStore, RecordStore};
