//! Configuration structures for the hashtag-pulse system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raw batch discovery and decoding.
    pub ingest: IngestConfig,
    /// Lexical model (TF-IDF + projection) configuration.
    pub lexical: LexicalConfig,
    /// Composite signal weights.
    pub signal: SignalConfig,
    /// Time window configuration.
    pub window: WindowConfig,
    /// Output locations.
    pub output: OutputConfig,
}

impl Config {
    /// Load a configuration from a TOML file.
    ///
    /// Missing sections and keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.window.width_minutes == 0 {
            return Err(Error::config("window.width_minutes must be positive"));
        }
        if !(self.lexical.max_df > 0.0 && self.lexical.max_df <= 1.0) {
            return Err(Error::config("lexical.max_df must be in (0, 1]"));
        }
        if self.lexical.max_components == 0 {
            return Err(Error::config("lexical.max_components must be positive"));
        }
        if self.lexical.max_ngram == 0 {
            return Err(Error::config("lexical.max_ngram must be positive"));
        }
        let weights = [
            self.signal.sentiment_weight,
            self.signal.engagement_weight,
            self.signal.lexical_weight,
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::config("signal weights must be finite"));
        }
        if self.ingest.file_suffixes.is_empty() {
            return Err(Error::config("ingest.file_suffixes must not be empty"));
        }
        Ok(())
    }
}

/// Raw batch ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Root directory holding one sub-directory per collection run.
    pub raw_root: PathBuf,
    /// File name suffixes accepted as batch files.
    pub file_suffixes: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            raw_root: PathBuf::from("data/raw"),
            file_suffixes: vec![".jsonl.gz".to_string(), ".jsonl".to_string()],
        }
    }
}

/// Lexical feature configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Largest n-gram size (1 = unigrams only).
    pub max_ngram: usize,
    /// Upper bound on latent dimensions.
    pub max_components: usize,
    /// Vocabulary size below which the latent feature is zero-filled.
    pub min_vocabulary: usize,
    /// Power iterations for the randomized projection.
    pub n_iter: usize,
    /// Seed for the randomized projection.
    pub seed: u64,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            min_df: 3,
            max_df: 0.9,
            max_ngram: 2,
            max_components: 128,
            min_vocabulary: 4,
            n_iter: 5,
            seed: 0,
        }
    }
}

/// Composite signal weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Weight of standardized sentiment.
    pub sentiment_weight: f64,
    /// Weight of standardized mean engagement.
    pub engagement_weight: f64,
    /// Weight of the standardized first latent dimension.
    pub lexical_weight: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sentiment_weight: 0.55,
            engagement_weight: 0.35,
            lexical_weight: 0.10,
        }
    }
}

/// Time window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in minutes.
    pub width_minutes: u32,
}

impl WindowConfig {
    /// Window width in milliseconds.
    pub fn width_ms(&self) -> i64 {
        self.width_minutes as i64 * 60_000
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width_minutes: 5 }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the date-partitioned curated dataset.
    pub curated_root: PathBuf,
    /// Windowed signal table.
    pub signal_csv: PathBuf,
    /// Rendered chart; no chart is drawn when unset.
    pub plot_path: Option<PathBuf>,
    /// Point budget before the chart down-samples.
    pub plot_max_points: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            curated_root: PathBuf::from("data/curated"),
            signal_csv: PathBuf::from("data/curated/signal_5min.csv"),
            plot_path: Some(PathBuf::from("data/curated/signal_plot.svg")),
            plot_max_points: 12_000,
        }
    }
}
