//! Progress reporting passed explicitly into each pipeline stage.
//!
//! Stages never reach for process-wide state; they describe what happened as
//! [`PipelineEvent`]s and hand them to whatever [`Reporter`] the caller chose.

use serde::Serialize;
use std::cell::RefCell;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Something worth telling the operator about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PipelineEvent {
    /// A batch directory was selected for processing.
    BatchSelected { path: PathBuf },
    /// A batch file could not be opened or read to the end.
    FileUnreadable { path: PathBuf, reason: String },
    /// A batch finished loading.
    BatchLoaded {
        files: usize,
        lines: usize,
        records: usize,
        skipped: usize,
        duplicates: usize,
    },
    /// No usable records were found; downstream output will be empty.
    EmptyDataset { stage: &'static str },
    /// A feature fell back to zero-fill because its input was degenerate.
    DegenerateFeature { feature: &'static str, reason: String },
    /// Signals were computed for a dataset.
    SignalsComposed { records: usize, latent_dims: usize },
    /// Signals were bucketed into windows.
    WindowsAggregated { windows: usize, width_minutes: u32 },
    /// An artifact was written.
    OutputWritten { path: PathBuf, rows: usize },
}

/// Sink for pipeline events.
pub trait Reporter {
    /// Record one event.
    fn report(&self, event: PipelineEvent);
}

/// Reporter that forwards every event to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::BatchSelected { path } => {
                info!(path = %path.display(), "selected batch");
            }
            PipelineEvent::FileUnreadable { path, reason } => {
                warn!(path = %path.display(), %reason, "skipping unreadable batch file");
            }
            PipelineEvent::BatchLoaded {
                files,
                lines,
                records,
                skipped,
                duplicates,
            } => {
                info!(files, lines, records, skipped, duplicates, "loaded batch");
            }
            PipelineEvent::EmptyDataset { stage } => {
                warn!(stage, "no usable records found");
            }
            PipelineEvent::DegenerateFeature { feature, reason } => {
                debug!(feature, %reason, "feature zero-filled");
            }
            PipelineEvent::SignalsComposed {
                records,
                latent_dims,
            } => {
                info!(records, latent_dims, "composed signals");
            }
            PipelineEvent::WindowsAggregated {
                windows,
                width_minutes,
            } => {
                info!(windows, width_minutes, "aggregated windows");
            }
            PipelineEvent::OutputWritten { path, rows } => {
                info!(path = %path.display(), rows, "wrote output");
            }
        }
    }
}

/// Reporter that keeps events in memory, for tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: RefCell<Vec<PipelineEvent>>,
}

impl MemoryReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.borrow().clone()
    }

    /// Whether any recorded event satisfies the predicate.
    pub fn any(&self, predicate: impl Fn(&PipelineEvent) -> bool) -> bool {
        self.events.borrow().iter().any(predicate)
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, event: PipelineEvent) {
        self.events.borrow_mut().push(event);
    }
}
