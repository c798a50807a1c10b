//! Signal composition.
//!
//! Combines three per-record features into one scalar: lexicon sentiment,
//! averaged standardized engagement, and the leading lexical latent
//! coordinate. Each feature is standardized on the dataset at hand before
//! weighting, so signal values are only comparable within one batch.

use crate::engagement::engagement_scores;
use crate::lexical::{LexicalProjector, TfIdfSvdProjector};
use crate::scaler::standardize;
use crate::sentiment::{LexiconScorer, SentimentScorer};
use ndarray::Array1;
use pulse_core::config::{Config, SignalConfig};
use pulse_core::{CanonicalRecord, Error, PipelineEvent, Reporter, Result};
use tracing::debug;

/// Per-record features and the composite signal, aligned with the input.
#[derive(Debug, Clone, Default)]
pub struct ComposedSignals {
    /// Raw sentiment polarity in `[-1, 1]`.
    pub sentiment: Array1<f64>,
    /// Mean of the standardized engagement counters.
    pub engagement: Array1<f64>,
    /// First lexical latent coordinate (zeros when degenerate).
    pub lexical: Array1<f64>,
    /// Weighted sum of the standardized features.
    pub signal: Vec<f64>,
}

impl ComposedSignals {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.signal.len()
    }

    /// Whether no records were composed.
    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }
}

/// Derives one signal value per record.
pub struct SignalComposer {
    weights: SignalConfig,
    scorer: Box<dyn SentimentScorer>,
    projector: Box<dyn LexicalProjector>,
}

impl SignalComposer {
    /// Create a composer with the default scorer and projector.
    pub fn new(config: &Config) -> Self {
        Self {
            weights: config.signal.clone(),
            scorer: Box::new(LexiconScorer::new()),
            projector: Box::new(TfIdfSvdProjector::new(config.lexical.clone())),
        }
    }

    /// Replace the sentiment strategy.
    pub fn with_scorer(mut self, scorer: impl SentimentScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Replace the lexical strategy.
    pub fn with_projector(mut self, projector: impl LexicalProjector + 'static) -> Self {
        self.projector = Box::new(projector);
        self
    }

    /// Compose signals for `records`.
    ///
    /// An empty dataset yields empty output. A corpus too small for a lexical
    /// projection contributes a zero lexical term and is reported.
    pub fn compose(
        &self,
        records: &[CanonicalRecord],
        reporter: &dyn Reporter,
    ) -> Result<ComposedSignals> {
        if records.is_empty() {
            reporter.report(PipelineEvent::EmptyDataset { stage: "compose" });
            return Ok(ComposedSignals::default());
        }

        let sentiment: Array1<f64> = records
            .iter()
            .map(|r| finite_or_zero(self.scorer.score(&r.content)))
            .collect();

        let engagement = engagement_scores(records.iter().map(|r| &r.engagement));

        let (lexical, latent_dims) = self.lexical_feature(records, reporter)?;

        let z_sentiment = standardize(sentiment.view());
        let z_engagement = standardize(engagement.view());
        let z_lexical = standardize(lexical.view());

        let w = &self.weights;
        let signal: Vec<f64> = (0..records.len())
            .map(|i| {
                finite_or_zero(
                    w.sentiment_weight * z_sentiment[i]
                        + w.engagement_weight * z_engagement[i]
                        + w.lexical_weight * z_lexical[i],
                )
            })
            .collect();

        reporter.report(PipelineEvent::SignalsComposed {
            records: signal.len(),
            latent_dims,
        });

        Ok(ComposedSignals {
            sentiment,
            engagement,
            lexical,
            signal,
        })
    }

    fn lexical_feature(
        &self,
        records: &[CanonicalRecord],
        reporter: &dyn Reporter,
    ) -> Result<(Array1<f64>, usize)> {
        let corpus: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        match self.projector.project(&corpus) {
            Ok(embedding) if embedding.ncols() > 0 => {
                if embedding.nrows() != records.len() {
                    return Err(Error::data(format!(
                        "lexical projection returned {} rows for {} records",
                        embedding.nrows(),
                        records.len()
                    )));
                }
                let first = embedding.column(0).mapv(finite_or_zero);
                Ok((first, embedding.ncols()))
            }
            Ok(_) => {
                reporter.report(PipelineEvent::DegenerateFeature {
                    feature: "lexical",
                    reason: "projection has no components".to_string(),
                });
                Ok((Array1::zeros(records.len()), 0))
            }
            Err(Error::DegenerateFeatureInput(reason)) => {
                debug!(%reason, "lexical feature zero-filled");
                reporter.report(PipelineEvent::DegenerateFeature {
                    feature: "lexical",
                    reason,
                });
                Ok((Array1::zeros(records.len()), 0))
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for SignalComposer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use ndarray::Array2;
    use pulse_core::{Engagement, MemoryReporter};
    use std::collections::BTreeSet;

    fn record(id: usize, content: &str, likes: u64) -> CanonicalRecord {
        CanonicalRecord {
            id: id.to_string(),
            username: String::new(),
            user_id: String::new(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, id as u32 % 60, 0).unwrap(),
            content: content.to_string(),
            engagement: Engagement {
                like_count: likes,
                ..Engagement::default()
            },
            mentions: BTreeSet::new(),
            hashtags: BTreeSet::new(),
            url: None,
        }
    }

    struct FixedScorer(f64);

    impl SentimentScorer for FixedScorer {
        fn score(&self, _text: &str) -> f64 {
            self.0
        }
    }

    struct LengthScorer;

    impl SentimentScorer for LengthScorer {
        fn score(&self, text: &str) -> f64 {
            text.len() as f64
        }
    }

    struct NoProjection;

    impl LexicalProjector for NoProjection {
        fn project(&self, corpus: &[&str]) -> Result<Array2<f64>> {
            Ok(Array2::zeros((corpus.len(), 0)))
        }
    }

    #[test]
    fn test_empty_dataset() {
        let reporter = MemoryReporter::new();
        let out = SignalComposer::default().compose(&[], &reporter).unwrap();
        assert!(out.is_empty());
        assert!(reporter.any(|e| matches!(e, PipelineEvent::EmptyDataset { stage: "compose" })));
    }

    #[test]
    fn test_constant_engagement_is_zero() {
        let records: Vec<_> = (0..6)
            .map(|i| record(i, &format!("post number {i} about nifty"), 7))
            .collect();
        let reporter = MemoryReporter::new();
        let out = SignalComposer::default().compose(&records, &reporter).unwrap();
        assert!(out.engagement.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_degenerate_lexical_is_zero_filled() {
        let records = vec![record(0, "up", 1), record(1, "down", 5), record(2, "flat", 3)];
        let reporter = MemoryReporter::new();
        let out = SignalComposer::default().compose(&records, &reporter).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.lexical.iter().all(|&x| x == 0.0));
        assert!(out.signal.iter().all(|x| x.is_finite()));
        assert!(reporter.any(|e| matches!(
            e,
            PipelineEvent::DegenerateFeature {
                feature: "lexical",
                ..
            }
        )));
    }

    #[test]
    fn test_weights_apply_to_standardized_features() {
        // Constant sentiment and no lexical term: signal is 0.35 * z(engagement).
        let records = vec![record(0, "a", 0), record(1, "b", 2)];
        let composer = SignalComposer::default()
            .with_scorer(FixedScorer(0.4))
            .with_projector(NoProjection);
        let out = composer.compose(&records, &MemoryReporter::new()).unwrap();
        assert_relative_eq!(out.signal[0], -0.35, epsilon = 1e-12);
        assert_relative_eq!(out.signal[1], 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_sentiment_weight() {
        let records = vec![record(0, "ab", 1), record(1, "abcd", 1)];
        let composer = SignalComposer::default()
            .with_scorer(LengthScorer)
            .with_projector(NoProjection);
        let out = composer.compose(&records, &MemoryReporter::new()).unwrap();
        assert_relative_eq!(out.signal[0], -0.55, epsilon = 1e-12);
        assert_relative_eq!(out.signal[1], 0.55, epsilon = 1e-12);
    }

    #[test]
    fn test_real_corpus_composes() {
        let texts = [
            "#nifty rally strong banks lead gains",
            "#nifty rally continues banks strong",
            "banks lead nifty higher today great session",
            "crypto crash deep losses today",
            "crypto crash panic selling losses",
            "panic selling crypto deep losses terrible",
            "nifty banks crypto mixed today",
        ];
        let records: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| record(i, t, (i * 3) as u64))
            .collect();
        let reporter = MemoryReporter::new();
        let out = SignalComposer::default().compose(&records, &reporter).unwrap();
        assert_eq!(out.len(), records.len());
        assert!(out.signal.iter().all(|x| x.is_finite()));
        assert!(out.sentiment[0] > 0.0);
        assert!(out.sentiment[4] < 0.0);
        assert!(reporter.any(|e| matches!(e, PipelineEvent::SignalsComposed { records: 7, .. })));
    }
}
