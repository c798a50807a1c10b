//! Stage sequencing: process, analyze, run.

use crate::output::write_signal_csv;
use crate::plot::render_signal_chart;
use crate::store::CuratedStore;
use pulse_core::{CanonicalRecord, Config, PipelineEvent, Reporter, Result, WindowAggregate};
use pulse_features::{SignalComposer, WindowAggregator};
use pulse_ingestion::{latest_batch, BatchLoader, Deduplicator};
use std::path::{Path, PathBuf};
use tracing::info;

const PLOT_TITLE: &str = "Composite tweet signal (window mean)";

/// Summary of a `process` stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Batch directory that was loaded, if any existed.
    pub batch: Option<PathBuf>,
    /// Curated rows written.
    pub rows: usize,
}

/// Summary of an `analyze` stage.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeSummary {
    /// Curated records analyzed.
    pub records: usize,
    /// Non-empty windows produced.
    pub windows: Vec<WindowAggregate>,
    /// Chart points drawn (0 when no chart was rendered).
    pub plotted: usize,
}

/// Runs the pipeline stages against one configuration.
pub struct Pipeline {
    config: Config,
    loader: BatchLoader,
    composer: SignalComposer,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let loader = BatchLoader::new(&config.ingest);
        let composer = SignalComposer::new(&config);
        Ok(Self {
            config,
            loader,
            composer,
        })
    }

    /// Use a custom signal composer.
    pub fn with_composer(mut self, composer: SignalComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the newest raw batch and write it to the curated store.
    pub fn process(&self, reporter: &dyn Reporter) -> Result<ProcessSummary> {
        let Some(batch_dir) = latest_batch(&self.config.ingest.raw_root)? else {
            reporter.report(PipelineEvent::EmptyDataset { stage: "process" });
            return Ok(ProcessSummary::default());
        };
        self.process_batch(&batch_dir, reporter)
    }

    /// Load one batch directory and write it to the curated store.
    pub fn process_batch(
        &self,
        batch_dir: &Path,
        reporter: &dyn Reporter,
    ) -> Result<ProcessSummary> {
        reporter.report(PipelineEvent::BatchSelected {
            path: batch_dir.to_path_buf(),
        });

        let batch = self.loader.load_dir(batch_dir, reporter)?;
        let mut summary = ProcessSummary {
            batch: Some(batch_dir.to_path_buf()),
            rows: 0,
        };
        if batch.is_empty() {
            return Ok(summary);
        }

        let tag = batch_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root = &self.config.output.curated_root;
        summary.rows = CuratedStore::open()?.write_partitioned(&batch.records, root, &tag)?;

        reporter.report(PipelineEvent::OutputWritten {
            path: root.clone(),
            rows: summary.rows,
        });
        Ok(summary)
    }

    /// Read the curated store, compute the windowed signal and write outputs.
    pub fn analyze(&self, reporter: &dyn Reporter) -> Result<AnalyzeSummary> {
        let records = self.load_curated()?;
        self.analyze_records(&records, reporter)
    }

    /// Compute and write the windowed signal for an in-memory dataset.
    ///
    /// An empty dataset still writes a header-only table and draws no chart.
    pub fn analyze_records(
        &self,
        records: &[CanonicalRecord],
        reporter: &dyn Reporter,
    ) -> Result<AnalyzeSummary> {
        let composed = self.composer.compose(records, reporter)?;
        let timestamps: Vec<i64> = records.iter().map(CanonicalRecord::ts_ms).collect();
        let windows = WindowAggregator::aggregate(
            &self.config.window,
            &timestamps,
            &composed.signal,
            reporter,
        )?;

        let output = &self.config.output;
        let rows = write_signal_csv(&windows, &output.signal_csv)?;
        reporter.report(PipelineEvent::OutputWritten {
            path: output.signal_csv.clone(),
            rows,
        });

        let mut plotted = 0;
        if let Some(plot_path) = &output.plot_path {
            plotted = render_signal_chart(&windows, plot_path, PLOT_TITLE, output.plot_max_points)?;
            if plotted > 0 {
                reporter.report(PipelineEvent::OutputWritten {
                    path: plot_path.clone(),
                    rows: plotted,
                });
            }
        }

        Ok(AnalyzeSummary {
            records: records.len(),
            windows,
            plotted,
        })
    }

    /// `process` followed by `analyze`.
    pub fn run(&self, reporter: &dyn Reporter) -> Result<AnalyzeSummary> {
        let processed = self.process(reporter)?;
        info!(rows = processed.rows, "process stage finished");
        self.analyze(reporter)
    }

    /// Every curated record, deduplicated by id.
    fn load_curated(&self) -> Result<Vec<CanonicalRecord>> {
        let stored = CuratedStore::open()?.read_all(&self.config.output.curated_root)?;
        let mut dedup = Deduplicator::new();
        for record in stored {
            dedup.push(record);
        }
        let mut records = dedup.into_records();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }
}
