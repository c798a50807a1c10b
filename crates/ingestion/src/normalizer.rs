//! Raw post normalization.
//!
//! Turns one heterogeneous JSON object into a [`CanonicalRecord`]. Field names
//! follow both shapes seen in collected batches: the scraper's camelCase
//! (`likeCount`, `rawContent`) and plain snake_case.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pulse_core::{ms_to_datetime, CanonicalRecord, Engagement, Error, RawRecord, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn mention_re() -> &'static Regex {
    static MENTION_RE: OnceLock<Regex> = OnceLock::new();
    MENTION_RE.get_or_init(|| Regex::new(r"@([A-Za-z0-9_]{1,15})").expect("valid mention regex"))
}

fn hashtag_re() -> &'static Regex {
    static HASHTAG_RE: OnceLock<Regex> = OnceLock::new();
    // `\B` keeps `c#sharp` or `a#b` from producing tags mid-word.
    HASHTAG_RE.get_or_init(|| Regex::new(r"\B#(\w+)").expect("valid hashtag regex"))
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 style timestamp.
///
/// Accepts RFC 3339, `Z`/`+HH:MM`/`+HHMM` offsets, `T` or space separators,
/// optional fractional seconds, date-only values, and naive date-times, which
/// are taken as UTC. Sub-millisecond fractions are truncated, so the result
/// is exactly representable as epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_any(raw.trim()).and_then(|dt| ms_to_datetime(dt.timestamp_millis()))
}

fn parse_any(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let with_offset = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(prefix) => format!("{prefix}+00:00"),
        None => s.to_string(),
    };
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn hashtag_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    hashtag_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Collect normalized hashtags from an explicit tag list and inline `#tokens`.
///
/// Explicit entries go through the same token rule as inline text, so a
/// hashtag never contains whitespace or punctuation.
pub fn extract_hashtags<'a>(
    explicit: impl IntoIterator<Item = &'a str>,
    content: &str,
) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = hashtag_tokens(content).collect();
    for entry in explicit {
        for part in entry.split_whitespace() {
            let tagged = format!("#{}", part.trim_start_matches('#'));
            tags.extend(hashtag_tokens(&tagged));
        }
    }
    tags
}

/// Collect `@handles` referenced in the content.
pub fn extract_mentions(content: &str) -> BTreeSet<String> {
    mention_re()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn field<'a>(obj: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

fn to_str(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Coerce a counter to a non-negative integer.
///
/// Missing, null and unparseable values become 0; negatives are clamped to 0.
fn to_count(value: Option<&Value>) -> u64 {
    let as_float = match value {
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                return u;
            }
            if let Some(i) = n.as_i64() {
                return i.max(0) as u64;
            }
            n.as_f64()
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return i.max(0) as u64;
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    };

    match as_float {
        Some(f) if f.is_finite() && f > 0.0 => f.trunc().min(u64::MAX as f64) as u64,
        _ => 0,
    }
}

fn extract_id(obj: &Value) -> Result<String> {
    match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(_)) => Err(Error::malformed("empty id")),
        Some(Value::Null) | None => Err(Error::malformed("missing id")),
        Some(other) => Err(Error::malformed(format!("unsupported id value {other}"))),
    }
}

fn extract_timestamp(obj: &Value) -> Result<DateTime<Utc>> {
    let raw = field(obj, &["date", "timestamp"])
        .ok_or_else(|| Error::malformed("missing timestamp"))?;
    let text = raw
        .as_str()
        .ok_or_else(|| Error::malformed(format!("timestamp is not a string: {raw}")))?;
    parse_timestamp(text).ok_or_else(|| Error::malformed(format!("unparseable timestamp `{text}`")))
}

/// Normalize one raw record.
///
/// Fails with [`Error::MalformedRecord`] when the record is not an object, has
/// no usable `id`, or has no parseable timestamp. The caller skips such
/// records and keeps going.
pub fn normalize_record(raw: &RawRecord) -> Result<CanonicalRecord> {
    if !raw.is_object() {
        return Err(Error::malformed("record is not a JSON object"));
    }

    let id = extract_id(raw)?;
    let timestamp = extract_timestamp(raw)?;

    let content = match field(raw, &["content", "rawContent", "text"]) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let user = raw.get("user").filter(|u| u.is_object());
    let username = to_str(user.and_then(|u| u.get("username")));
    let mut user_id = to_str(user.and_then(|u| u.get("id")));
    if user_id.is_empty() {
        user_id = to_str(raw.get("author_id"));
    }

    let explicit_tags: Vec<&str> = raw
        .get("hashtags")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let engagement = Engagement {
        like_count: to_count(field(raw, &["likeCount", "like_count"])),
        retweet_count: to_count(field(raw, &["retweetCount", "retweet_count"])),
        reply_count: to_count(field(raw, &["replyCount", "reply_count"])),
        quote_count: to_count(field(raw, &["quoteCount", "quote_count"])),
    };

    let url = raw
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    Ok(CanonicalRecord {
        id,
        username,
        user_id,
        timestamp,
        hashtags: extract_hashtags(explicit_tags, &content),
        mentions: extract_mentions(&content),
        content,
        engagement,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_hashtag_normalization() {
        let raw = json!({
            "id": 1,
            "date": "2024-01-01T10:00:00+00:00",
            "content": "Check #NIFTY50 and #Finance!",
            "hashtags": ["nifty50"],
        });
        let record = normalize_record(&raw).unwrap();
        let expected: BTreeSet<String> =
            ["nifty50", "finance"].iter().map(|s| s.to_string()).collect();
        assert_eq!(record.hashtags, expected);
    }

    #[test]
    fn test_hashtag_needs_word_boundary() {
        let tags = extract_hashtags(Vec::<&str>::new(), "learn c#sharp, buy #BTC #btc");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["btc".to_string()]);
    }

    #[test]
    fn test_explicit_tags_with_prefix() {
        let tags = extract_hashtags(vec!["#StockMarket", "  ", "finance"], "");
        assert!(tags.contains("stockmarket"));
        assert!(tags.contains("finance"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_explicit_tag_with_space_splits_into_tokens() {
        let raw = json!({
            "id": 1,
            "date": "2024-01-01T10:00:00Z",
            "content": "x",
            "hashtags": ["Nifty 50", "#Bank-Nifty"],
        });
        let record = normalize_record(&raw).unwrap();
        let expected: BTreeSet<String> =
            ["50", "bank", "nifty"].iter().map(|s| s.to_string()).collect();
        assert_eq!(record.hashtags, expected);
        assert!(record.hashtags.iter().all(|t| !t.contains(char::is_whitespace)));
    }

    #[test]
    fn test_mentions_deduplicated_and_capped() {
        let mentions = extract_mentions("@alice hi @alice and @abcdefghijklmnopqrst");
        assert!(mentions.contains("alice"));
        assert!(mentions.contains("abcdefghijklmno"));
        assert_eq!(mentions.len(), 2);
    }

    #[test]
    fn test_full_record() {
        let raw = json!({
            "id": "1745",
            "date": "2024-02-03T04:05:06.789Z",
            "content": "@trader #nifty looks bullish",
            "user": {"username": "trader42", "id": 99},
            "likeCount": 10,
            "retweetCount": "3",
            "replyCount": null,
            "quoteCount": 1.9,
            "url": "https://example.com/p/1745",
        });
        let record = normalize_record(&raw).unwrap();
        assert_eq!(record.id, "1745");
        assert_eq!(record.username, "trader42");
        assert_eq!(record.user_id, "99");
        assert_eq!(record.timestamp.timestamp_millis(), 1706933106789);
        assert_eq!(record.engagement.like_count, 10);
        assert_eq!(record.engagement.retweet_count, 3);
        assert_eq!(record.engagement.reply_count, 0);
        assert_eq!(record.engagement.quote_count, 1);
        assert!(record.mentions.contains("trader"));
        assert!(record.hashtags.contains("nifty"));
        assert_eq!(record.url.as_deref(), Some("https://example.com/p/1745"));
    }

    #[test]
    fn test_missing_fields_default() {
        let raw = json!({"id": 5, "date": "2024-01-01 09:30:00"});
        let record = normalize_record(&raw).unwrap();
        assert_eq!(record.content, "");
        assert_eq!(record.username, "");
        assert_eq!(record.user_id, "");
        assert_eq!(record.engagement, Engagement::default());
        assert!(record.url.is_none());
        assert!(record.hashtags.is_empty());
    }

    #[test]
    fn test_author_id_fallback_and_text_field() {
        let raw = json!({
            "id": 7,
            "date": "2024-01-01T00:00:00Z",
            "author_id": 123,
            "text": "rally #sensex",
        });
        let record = normalize_record(&raw).unwrap();
        assert_eq!(record.user_id, "123");
        assert_eq!(record.content, "rally #sensex");
        assert!(record.hashtags.contains("sensex"));
    }

    #[test]
    fn test_negative_counters_clamped() {
        let raw = json!({"id": 1, "date": "2024-01-01T00:00:00Z", "likeCount": -4});
        let record = normalize_record(&raw).unwrap();
        assert_eq!(record.engagement.like_count, 0);
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let raw = json!({"date": "2024-01-01T00:00:00Z", "content": "x"});
        assert!(matches!(normalize_record(&raw), Err(Error::MalformedRecord(_))));

        let raw = json!({"id": null, "date": "2024-01-01T00:00:00Z"});
        assert!(matches!(normalize_record(&raw), Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let raw = json!({"id": 1, "date": "yesterday"});
        assert!(matches!(normalize_record(&raw), Err(Error::MalformedRecord(_))));

        let raw = json!({"id": 1});
        assert!(matches!(normalize_record(&raw), Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(normalize_record(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        for raw in [
            "2024-01-01T10:00:00Z",
            "2024-01-01T10:00:00+00:00",
            "2024-01-01T15:30:00+05:30",
            "2024-01-01T15:30:00+0530",
            "2024-01-01 10:00:00+00:00",
            "2024-01-01 10:00:00Z",
            "2024-01-01T10:00:00",
            "2024-01-01 10:00:00.000",
            "2024-01-01T10:00",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "failed on {raw}");
        }
        assert_eq!(
            parse_timestamp("2024-01-01"),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2024-13-01T00:00:00Z"), None);
    }

    #[test]
    fn test_sub_millisecond_fraction_truncated() {
        let parsed = parse_timestamp("2024-01-01T10:00:00.123456Z").unwrap();
        assert_eq!(parsed.timestamp_millis(), 1704103200123);
        assert_eq!(parsed.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(
            parse_timestamp("2024-01-01 10:00:00.999999"),
            parse_timestamp("2024-01-01T10:00:00.999Z")
        );
    }
}
