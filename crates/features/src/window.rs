//! Windowed aggregation of the composite signal.
//!
//! Records are bucketed into fixed-width windows aligned to the epoch. Each
//! non-empty window yields its mean, count and standard error of the mean.

use chrono::{DateTime, Utc};
use pulse_core::config::WindowConfig;
use pulse_core::{
    ms_to_datetime, ts_to_window, Error, PipelineEvent, Reporter, Result, TimestampMs,
    WindowAggregate,
};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Signal values collected for one window.
#[derive(Debug, Clone, Default)]
struct WindowAccumulator {
    values: Vec<f64>,
}

impl WindowAccumulator {
    fn add(&mut self, value: f64) {
        self.values.push(value);
    }

    fn to_aggregate(&self, window_start: DateTime<Utc>) -> WindowAggregate {
        let n = self.values.len();
        let mean = self.values.iter().mean();
        // Sample deviation is NaN below two observations.
        let std = self.values.iter().std_dev();
        let stderr = if n < 2 || !std.is_finite() {
            0.0
        } else {
            std / (n.max(1) as f64).sqrt()
        };
        WindowAggregate {
            window_start,
            mean_signal: mean,
            n,
            stderr,
        }
    }
}

/// Buckets timestamped signal values into fixed-width windows.
#[derive(Debug, Clone)]
pub struct WindowAggregator {
    width_ms: i64,
    width_minutes: u32,
    windows: BTreeMap<TimestampMs, WindowAccumulator>,
}

impl WindowAggregator {
    /// Create an aggregator from window configuration.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        if config.width_minutes == 0 {
            return Err(Error::config("window.width_minutes must be positive"));
        }
        Ok(Self {
            width_ms: config.width_ms(),
            width_minutes: config.width_minutes,
            windows: BTreeMap::new(),
        })
    }

    /// Add one observation.
    pub fn add(&mut self, ts_ms: TimestampMs, value: f64) {
        let start = ts_to_window(ts_ms, self.width_ms);
        self.windows.entry(start).or_default().add(value);
    }

    /// Aggregates for every non-empty window, ascending by start.
    pub fn finish(&self) -> Result<Vec<WindowAggregate>> {
        self.windows
            .iter()
            .map(|(&start, acc)| {
                let window_start = ms_to_datetime(start)
                    .ok_or_else(|| Error::data(format!("window start {start} out of range")))?;
                Ok(acc.to_aggregate(window_start))
            })
            .collect()
    }

    /// Aggregate aligned timestamp and signal sequences.
    ///
    /// The two sequences must have equal length.
    pub fn aggregate(
        config: &WindowConfig,
        timestamps: &[TimestampMs],
        signals: &[f64],
        reporter: &dyn Reporter,
    ) -> Result<Vec<WindowAggregate>> {
        if timestamps.len() != signals.len() {
            return Err(Error::data(format!(
                "{} timestamps but {} signal values",
                timestamps.len(),
                signals.len()
            )));
        }

        let mut aggregator = Self::new(config)?;
        for (&ts, &value) in timestamps.iter().zip(signals) {
            aggregator.add(ts, value);
        }
        let windows = aggregator.finish()?;

        reporter.report(PipelineEvent::WindowsAggregated {
            windows: windows.len(),
            width_minutes: aggregator.width_minutes,
        });
        Ok(windows)
    }
}
