//! Core data types for the hashtag-pulse system.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Untyped external input: one decoded JSON object per line.
pub type RawRecord = serde_json::Value;

/// Composite signal for one record, aligned by index with its dataset.
pub type SignalValue = f64;

/// Convert a timestamp to the start of its fixed-width window.
///
/// Uses floor division so instants before the epoch land in the window that
/// contains them rather than the one after.
#[inline]
pub fn ts_to_window(ts_ms: TimestampMs, width_ms: i64) -> TimestampMs {
    ts_ms.div_euclid(width_ms) * width_ms
}

/// Convert epoch milliseconds back into a UTC instant.
#[inline]
pub fn ms_to_datetime(ts_ms: TimestampMs) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts_ms).single()
}

/// Engagement counters carried by a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub like_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub quote_count: u64,
}

impl Engagement {
    /// Counters in fixed column order: likes, retweets, replies, quotes.
    #[inline]
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.like_count as f64,
            self.retweet_count as f64,
            self.reply_count as f64,
            self.quote_count as f64,
        ]
    }
}

/// A cleaned post, the unit persisted and analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Stable identifier, used as the dedup key.
    pub id: String,
    /// Author handle (may be empty).
    pub username: String,
    /// Author identifier (may be empty).
    pub user_id: String,
    /// Post time.
    pub timestamp: DateTime<Utc>,
    /// Post text (may be empty, never null).
    pub content: String,
    /// Engagement counters.
    #[serde(flatten)]
    pub engagement: Engagement,
    /// Handles referenced in the content.
    pub mentions: BTreeSet<String>,
    /// Lower-cased hashtags without the leading `#`.
    pub hashtags: BTreeSet<String>,
    /// Permalink, when the source provided one.
    pub url: Option<String>,
}

impl CanonicalRecord {
    /// Post time in epoch milliseconds.
    #[inline]
    pub fn ts_ms(&self) -> TimestampMs {
        self.timestamp.timestamp_millis()
    }

    /// Calendar date partition key (`YYYY-MM-DD`, UTC).
    pub fn partition_date(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }
}

/// Aggregate of the composite signal over one non-empty time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAggregate {
    /// Inclusive start of the window.
    pub window_start: DateTime<Utc>,
    /// Arithmetic mean of the signal values in the window.
    pub mean_signal: f64,
    /// Number of contributing records (always > 0).
    pub n: usize,
    /// Standard error of the mean; 0 when the deviation is undefined.
    pub stderr: f64,
}

impl WindowAggregate {
    /// Window start in epoch milliseconds.
    #[inline]
    pub fn start_ms(&self) -> TimestampMs {
        self.window_start.timestamp_millis()
    }
}
