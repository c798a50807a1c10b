//! Stage driver for the hashtag pulse pipeline.
//!
//! - `process`: newest raw batch -> date-partitioned Parquet
//! - `analyze`: curated Parquet -> composite signal -> windowed CSV and chart
//! - `run`: both, in order

pub mod driver;
pub mod output;
pub mod plot;
pub mod store;

pub use driver::{AnalyzeSummary, Pipeline, ProcessSummary};
pub use output::write_signal_csv;
pub use plot::{adaptive_sample, render_signal_chart};
pub use store::CuratedStore;
