//! Loading batch directories from disk.

use flate2::write::GzEncoder;
use flate2::Compression;
use pulse_core::{MemoryReporter, PipelineEvent};
use pulse_ingestion::BatchLoader;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

fn post(id: u32, minute: u32, likes: u32, content: &str) -> String {
    format!(
        r#"{{"id": {id}, "date": "2024-01-01T10:{minute:02}:00+00:00", "content": "{content}", "likeCount": {likes}, "user": {{"username": "u{id}", "id": "{id}"}}}}"#
    )
}

fn write_gz(path: &Path, lines: &[String]) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    for line in lines {
        writeln!(encoder, "{line}").unwrap();
    }
    encoder.finish().unwrap();
}

fn write_plain(path: &Path, lines: &[String]) {
    std::fs::write(path, lines.join("\n")).unwrap();
}

fn as_map(
    records: &[pulse_core::CanonicalRecord],
) -> BTreeMap<String, pulse_core::CanonicalRecord> {
    records.iter().map(|r| (r.id.clone(), r.clone())).collect()
}

#[test]
fn test_gzip_and_plain_files() {
    let dir = tempfile::tempdir().unwrap();
    write_gz(
        &dir.path().join("001.jsonl.gz"),
        &[post(1, 0, 5, "#nifty50 up"), post(2, 1, 0, "flat")],
    );
    write_plain(&dir.path().join("002.jsonl"), &[post(3, 2, 7, "down #finance")]);

    let reporter = MemoryReporter::new();
    let batch = BatchLoader::default().load_dir(dir.path(), &reporter).unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch.stats.files_read, 2);
    let ids: Vec<_> = batch.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(batch.records[0].engagement.like_count, 5);
    assert!(batch.records[2].hashtags.contains("finance"));
    assert!(reporter.any(|e| matches!(e, PipelineEvent::BatchLoaded { records: 3, .. })));
}

#[test]
fn test_duplicate_across_files_first_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    write_gz(&dir.path().join("b.jsonl.gz"), &[post(1, 5, 99, "later copy")]);
    write_gz(&dir.path().join("a.jsonl.gz"), &[post(1, 0, 1, "earlier copy")]);

    let batch = BatchLoader::default()
        .load_dir(dir.path(), &MemoryReporter::new())
        .unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(batch.records[0].content, "earlier copy");
    assert_eq!(batch.stats.duplicates, 1);
}

#[test]
fn test_file_order_does_not_change_unique_dataset() {
    let lines_a = vec![post(1, 0, 1, "alpha"), post(2, 1, 2, "beta")];
    let lines_b = vec![post(3, 2, 3, "gamma"), post(4, 3, 4, "delta")];

    let first = tempfile::tempdir().unwrap();
    write_gz(&first.path().join("1.jsonl.gz"), &lines_a);
    write_gz(&first.path().join("2.jsonl.gz"), &lines_b);

    let second = tempfile::tempdir().unwrap();
    write_gz(&second.path().join("1.jsonl.gz"), &lines_b);
    write_gz(&second.path().join("2.jsonl.gz"), &lines_a);

    let loader = BatchLoader::default();
    let reporter = MemoryReporter::new();
    let a = loader.load_dir(first.path(), &reporter).unwrap();
    let b = loader.load_dir(second.path(), &reporter).unwrap();

    assert_eq!(as_map(&a.records), as_map(&b.records));
}

#[test]
fn test_corrupt_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("0.jsonl.gz"), b"definitely not gzip").unwrap();
    write_gz(&dir.path().join("1.jsonl.gz"), &[post(1, 0, 1, "ok")]);

    let reporter = MemoryReporter::new();
    let batch = BatchLoader::default().load_dir(dir.path(), &reporter).unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(batch.stats.files_unreadable, 1);
    assert!(reporter.any(|e| matches!(e, PipelineEvent::FileUnreadable { .. })));
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let reporter = MemoryReporter::new();
    let batch = BatchLoader::default().load_dir(dir.path(), &reporter).unwrap();

    assert!(batch.is_empty());
    assert!(reporter.any(|e| matches!(e, PipelineEvent::EmptyDataset { .. })));
}
