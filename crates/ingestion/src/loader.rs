//! Batch loading and deduplication.
//!
//! A batch is one directory of JSON-lines files (gzip or plain) written by a
//! single collection run. Files are read in file-name order so that the
//! first-occurrence-wins dedup rule does not depend on directory listing order.

use crate::normalizer::normalize_record;
use flate2::read::GzDecoder;
use pulse_core::config::IngestConfig;
use pulse_core::{CanonicalRecord, PipelineEvent, RawRecord, Reporter, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Statistics about a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Batch files read (fully or partially).
    pub files_read: usize,
    /// Batch files that could not be opened or were cut short by an I/O error.
    pub files_unreadable: usize,
    /// Non-blank lines seen.
    pub lines: usize,
    /// Lines that were not valid UTF-8 JSON.
    pub decode_failures: usize,
    /// Decoded objects rejected by the normalizer.
    pub normalize_failures: usize,
    /// Records dropped because their id was already seen.
    pub duplicates: usize,
}

impl LoadStats {
    /// Lines skipped for any reason other than duplication.
    pub fn skipped(&self) -> usize {
        self.decode_failures + self.normalize_failures
    }
}

/// Result of loading a batch: the clean dataset plus load statistics.
#[derive(Debug, Clone, Default)]
pub struct LoadedBatch {
    /// Unique records in first-seen order.
    pub records: Vec<CanonicalRecord>,
    /// What happened along the way.
    pub stats: LoadStats,
}

impl LoadedBatch {
    /// Whether no usable records were found.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of unique records.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Drops records whose id was already seen, keeping the first occurrence.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
    records: Vec<CanonicalRecord>,
    duplicates: usize,
}

impl Deduplicator {
    /// Create an empty deduplicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a record. Returns `false` if its id was already taken.
    pub fn push(&mut self, record: CanonicalRecord) -> bool {
        if self.seen.contains(&record.id) {
            self.duplicates += 1;
            return false;
        }
        self.seen.insert(record.id.clone());
        self.records.push(record);
        true
    }

    /// Number of rejected duplicates so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Consume and return the unique records in first-seen order.
    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.records
    }
}

/// Accumulates lines into a deduplicated dataset.
#[derive(Default)]
struct LineSink {
    dedup: Deduplicator,
    stats: LoadStats,
}

impl LineSink {
    fn accept_bytes(&mut self, bytes: &[u8]) {
        match std::str::from_utf8(bytes) {
            Ok(line) => self.accept_line(line),
            Err(_) => {
                self.stats.lines += 1;
                self.stats.decode_failures += 1;
            }
        }
    }

    fn accept_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.stats.lines += 1;

        let raw: RawRecord = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => {
                self.stats.decode_failures += 1;
                return;
            }
        };

        match normalize_record(&raw) {
            Ok(record) => {
                self.dedup.push(record);
            }
            Err(e) => {
                debug!(error = %e, "skipping record");
                self.stats.normalize_failures += 1;
            }
        }
    }

    fn finish(mut self) -> LoadedBatch {
        self.stats.duplicates = self.dedup.duplicates();
        LoadedBatch {
            records: self.dedup.into_records(),
            stats: self.stats,
        }
    }
}

/// Loads batch directories into clean datasets.
pub struct BatchLoader {
    /// Accepted file name suffixes.
    suffixes: Vec<String>,
}

impl BatchLoader {
    /// Create a loader from ingestion configuration.
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            suffixes: config.file_suffixes.clone(),
        }
    }

    /// Whether the file name carries an accepted suffix.
    fn accepts(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| self.suffixes.iter().any(|s| name.ends_with(s.as_str())))
            .unwrap_or(false)
    }

    /// List batch files in the directory, sorted by file name.
    ///
    /// A missing directory yields an empty list.
    pub fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && self.accepts(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn open(path: &Path) -> io::Result<Box<dyn BufRead>> {
        let file = File::open(path)?;
        let is_gzip = path.extension().map(|e| e == "gz").unwrap_or(false);
        let reader: Box<dyn Read> = if is_gzip {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Box::new(BufReader::new(reader)))
    }

    /// Feed one file into the sink, stopping at the first I/O error.
    fn read_file(path: &Path, sink: &mut LineSink) -> io::Result<()> {
        let mut reader = Self::open(path)?;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            sink.accept_bytes(&buf);
        }
    }

    /// Load every batch file in `dir` into one deduplicated dataset.
    ///
    /// Unreadable files and malformed lines are counted and skipped; an empty
    /// or missing directory produces an empty batch.
    pub fn load_dir(&self, dir: &Path, reporter: &dyn Reporter) -> Result<LoadedBatch> {
        let files = self.list_files(dir)?;
        let mut sink = LineSink::default();

        for path in &files {
            debug!(path = %path.display(), "reading batch file");
            sink.stats.files_read += 1;
            if let Err(e) = Self::read_file(path, &mut sink) {
                sink.stats.files_unreadable += 1;
                reporter.report(PipelineEvent::FileUnreadable {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }

        let batch = sink.finish();
        report_batch(&batch, reporter);
        Ok(batch)
    }

    /// Load an in-memory sequence of JSON lines.
    pub fn load_lines<I, S>(&self, lines: I, reporter: &dyn Reporter) -> LoadedBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sink = LineSink::default();
        for line in lines {
            sink.accept_line(line.as_ref());
        }
        let batch = sink.finish();
        report_batch(&batch, reporter);
        batch
    }
}

impl Default for BatchLoader {
    fn default() -> Self {
        Self::new(&IngestConfig::default())
    }
}

fn report_batch(batch: &LoadedBatch, reporter: &dyn Reporter) {
    let stats = &batch.stats;
    reporter.report(PipelineEvent::BatchLoaded {
        files: stats.files_read,
        lines: stats.lines,
        records: batch.records.len(),
        skipped: stats.skipped(),
        duplicates: stats.duplicates,
    });
    if batch.is_empty() {
        reporter.report(PipelineEvent::EmptyDataset { stage: "load" });
    }
}

/// The most recent collection run under `raw_root`.
///
/// Runs are directories named by their UTC start time, so the
/// lexicographically greatest name is the newest.
pub fn latest_batch(raw_root: &Path) -> Result<Option<PathBuf>> {
    let entries = match std::fs::read_dir(raw_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut latest: Option<PathBuf> = None;
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if latest.as_ref().map(|l| path.file_name() > l.file_name()).unwrap_or(true) {
            latest = Some(path);
        }
    }
    Ok(latest)
}
