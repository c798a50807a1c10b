//! Curated dataset storage.
//!
//! Records are staged in an in-memory DuckDB table and copied out as Parquet
//! files partitioned by calendar date (`dt=YYYY-MM-DD`). Reading goes the other
//! way: every Parquet file under the curated root is scanned as one table.

use duckdb::{params, Connection};
use pulse_core::{ms_to_datetime, CanonicalRecord, Engagement, Error, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

const STAGING_DDL: &str = "
CREATE TEMP TABLE staging (
    id VARCHAR NOT NULL,
    username VARCHAR NOT NULL,
    user_id VARCHAR NOT NULL,
    ts_ms BIGINT NOT NULL,
    content VARCHAR NOT NULL,
    like_count UBIGINT NOT NULL,
    retweet_count UBIGINT NOT NULL,
    reply_count UBIGINT NOT NULL,
    quote_count UBIGINT NOT NULL,
    mentions VARCHAR NOT NULL,
    hashtags VARCHAR NOT NULL,
    url VARCHAR,
    dt VARCHAR NOT NULL
)";

fn db_err(e: duckdb::Error) -> Error {
    Error::database(e.to_string())
}

/// Quote a path as a SQL string literal.
fn sql_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', "''"))
}

/// Staged tag lists are joined on ASCII unit separator, which never occurs in
/// a mention or hashtag.
const LIST_SEP: &str = "\u{1f}";

/// Turn a staged tag column into a `VARCHAR[]`, empty when nothing was staged.
fn list_expr(column: &str) -> String {
    format!(
        "CASE WHEN {column} = '' THEN []::VARCHAR[] \
         ELSE string_split({column}, chr(31)) END AS {column}"
    )
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(LIST_SEP)
}

fn split_set(joined: &str) -> BTreeSet<String> {
    joined
        .split(LIST_SEP)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep only characters safe in a Parquet file name.
fn file_tag(tag: &str) -> String {
    let cleaned: String = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "batch".to_string()
    } else {
        cleaned
    }
}

/// Parquet store for canonical records.
pub struct CuratedStore {
    conn: Connection,
}

impl CuratedStore {
    /// Open a store backed by an in-memory DuckDB instance.
    pub fn open() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Ok(Self { conn })
    }

    /// Write `records` under `root`, one directory per calendar date.
    ///
    /// Files are named after `tag`, so writing the same batch twice replaces
    /// its own files and leaves other batches alone. Returns the row count.
    pub fn write_partitioned(
        &self,
        records: &[CanonicalRecord],
        root: &Path,
        tag: &str,
    ) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        std::fs::create_dir_all(root)?;

        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS staging; {STAGING_DDL};"))
            .map_err(db_err)?;

        {
            let mut appender = self.conn.appender("staging").map_err(db_err)?;
            for r in records {
                appender
                    .append_row(params![
                        r.id,
                        r.username,
                        r.user_id,
                        r.ts_ms(),
                        r.content,
                        r.engagement.like_count,
                        r.engagement.retweet_count,
                        r.engagement.reply_count,
                        r.engagement.quote_count,
                        join_set(&r.mentions),
                        join_set(&r.hashtags),
                        r.url,
                        r.partition_date(),
                    ])
                    .map_err(db_err)?;
            }
            appender.flush().map_err(db_err)?;
        }

        let copy = format!(
            "COPY (
                SELECT id, username, user_id, epoch_ms(ts_ms) AS timestamp, content,
                       like_count, retweet_count, reply_count, quote_count,
                       {mentions}, {hashtags}, url, dt
                FROM staging
            ) TO {root} (FORMAT PARQUET, PARTITION_BY (dt), OVERWRITE_OR_IGNORE true,
                         FILENAME_PATTERN 'part_{tag}_{{i}}')",
            mentions = list_expr("mentions"),
            hashtags = list_expr("hashtags"),
            root = sql_path(root),
            tag = file_tag(tag),
        );
        self.conn.execute_batch(&copy).map_err(db_err)?;
        self.conn
            .execute_batch("DROP TABLE staging;")
            .map_err(db_err)?;

        debug!(rows = records.len(), root = %root.display(), "wrote curated partitions");
        Ok(records.len())
    }

    /// Read every Parquet file under `root` as canonical records.
    ///
    /// A missing root or a root without Parquet files yields no records.
    pub fn read_all(&self, root: &Path) -> Result<Vec<CanonicalRecord>> {
        if !contains_parquet(root)? {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, username, user_id, epoch_ms(timestamp) AS ts_ms, content,
                    like_count, retweet_count, reply_count, quote_count,
                    array_to_string(mentions, chr(31)), array_to_string(hashtags, chr(31)), url
             FROM read_parquet({glob}, hive_partitioning = true, union_by_name = true)",
            glob = sql_path(&root.join("**").join("*.parquet")),
        );

        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredRow {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    user_id: row.get(2)?,
                    ts_ms: row.get(3)?,
                    content: row.get(4)?,
                    engagement: Engagement {
                        like_count: row.get(5)?,
                        retweet_count: row.get(6)?,
                        reply_count: row.get(7)?,
                        quote_count: row.get(8)?,
                    },
                    mentions: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                    hashtags: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
                    url: row.get(11)?,
                })
            })
            .map_err(db_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(db_err)?.into_record()?);
        }
        Ok(records)
    }
}

struct StoredRow {
    id: String,
    username: String,
    user_id: String,
    ts_ms: i64,
    content: String,
    engagement: Engagement,
    mentions: String,
    hashtags: String,
    url: Option<String>,
}

impl StoredRow {
    fn into_record(self) -> Result<CanonicalRecord> {
        let timestamp = ms_to_datetime(self.ts_ms)
            .ok_or_else(|| Error::data(format!("record {} has timestamp out of range", self.id)))?;
        Ok(CanonicalRecord {
            id: self.id,
            username: self.username,
            user_id: self.user_id,
            timestamp,
            content: self.content,
            engagement: self.engagement,
            mentions: split_set(&self.mentions),
            hashtags: split_set(&self.hashtags),
            url: self.url,
        })
    }
}

/// Whether any `.parquet` file exists below `root`.
fn contains_parquet(root: &Path) -> Result<bool> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if contains_parquet(&path)? {
                return Ok(true);
            }
        } else if path.extension().map(|e| e == "parquet").unwrap_or(false) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_sanitized() {
        assert_eq!(file_tag("20240101T0000Z"), "20240101T0000Z");
        assert_eq!(file_tag("a b/c"), "a_b_c");
        assert_eq!(file_tag(""), "batch");
    }

    #[test]
    fn test_sql_path_escapes_quotes() {
        assert_eq!(sql_path(Path::new("/tmp/it's")), "'/tmp/it''s'");
    }

    #[test]
    fn test_set_roundtrip_through_text() {
        let set: BTreeSet<String> = ["finance", "nifty50"].iter().map(|s| s.to_string()).collect();
        assert_eq!(join_set(&set), "finance\u{1f}nifty50");
        assert_eq!(split_set(&join_set(&set)), set);
        assert!(split_set("").is_empty());
        assert!(join_set(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_set_with_spaces_survives_text() {
        let set: BTreeSet<String> = ["nifty 50", "bank"].iter().map(|s| s.to_string()).collect();
        assert_eq!(split_set(&join_set(&set)), set);
    }

    #[test]
    fn test_contains_parquet() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!contains_parquet(dir.path()).unwrap());
        assert!(!contains_parquet(&dir.path().join("missing")).unwrap());

        let part = dir.path().join("dt=2024-01-01");
        std::fs::create_dir(&part).unwrap();
        std::fs::write(part.join("notes.txt"), b"").unwrap();
        assert!(!contains_parquet(dir.path()).unwrap());

        std::fs::write(part.join("part_0.parquet"), b"").unwrap();
        assert!(contains_parquet(dir.path()).unwrap());
    }
}
