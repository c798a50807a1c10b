//! Windowed signal table writer.

use pulse_core::{Error, Result, WindowAggregate};
use serde::Serialize;
use std::path::Path;

/// One CSV row; column order is the file's header order.
#[derive(Debug, Serialize)]
struct SignalRow {
    window_start: String,
    signal_mean: f64,
    n: usize,
    stderr: f64,
}

impl From<&WindowAggregate> for SignalRow {
    fn from(w: &WindowAggregate) -> Self {
        Self {
            window_start: w.window_start.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
            signal_mean: w.mean_signal,
            n: w.n,
            stderr: w.stderr,
        }
    }
}

fn csv_err(e: csv::Error) -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Write `window_start,signal_mean,n,stderr` rows to `path`.
///
/// The header is always written, so an empty series yields a header-only file.
pub fn write_signal_csv(windows: &[WindowAggregate], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer
        .write_record(["window_start", "signal_mean", "n", "stderr"])
        .map_err(csv_err)?;
    for w in windows {
        writer.serialize(SignalRow::from(w)).map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(windows.len())
}
