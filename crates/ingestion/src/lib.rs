//! Data ingestion and normalization for the hashtag-pulse system.
//!
//! This crate handles:
//! - Raw post normalization (ids, timestamps, counters, hashtags, mentions)
//! - Batch discovery and gzip/plain JSON-lines decoding
//! - Deduplication by post id, first occurrence wins

pub mod loader;
pub mod normalizer;

pub use loader::{latest_batch, BatchLoader, Deduplicator, LoadStats, LoadedBatch};
pub use normalizer::{normalize_record, parse_timestamp};
