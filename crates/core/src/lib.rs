//! Core types and configuration for the hashtag-pulse system.
//!
//! This crate provides shared types used across all other crates:
//! - Record and aggregate types (canonical posts, window aggregates)
//! - Configuration structures
//! - Common error types
//! - The reporter interface used instead of process-wide logging state

pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use report::{MemoryReporter, PipelineEvent, Reporter, TracingReporter};
pub use types::*;
