//! Lexical structure feature.
//!
//! Projects a corpus onto a handful of latent dimensions fitted on that same
//! corpus. The default strategy is TF-IDF over unigrams and bigrams followed by
//! a truncated SVD.

use crate::svd::TruncatedSvd;
use crate::tfidf::TfIdfVectorizer;
use ndarray::Array2;
use pulse_core::config::LexicalConfig;
use pulse_core::{Error, Result};
use tracing::debug;

/// Fits a projection on a corpus and returns one coordinate vector per document.
pub trait LexicalProjector {
    /// Project `corpus`, returning an `(n_docs, k)` matrix.
    ///
    /// Returns [`Error::DegenerateFeatureInput`] when the corpus carries too
    /// little vocabulary to fit a projection.
    fn project(&self, corpus: &[&str]) -> Result<Array2<f64>>;
}

/// TF-IDF + truncated SVD projector.
#[derive(Debug, Clone)]
pub struct TfIdfSvdProjector {
    config: LexicalConfig,
}

impl TfIdfSvdProjector {
    /// Create a projector from lexical configuration.
    pub fn new(config: LexicalConfig) -> Self {
        Self { config }
    }
}

impl Default for TfIdfSvdProjector {
    fn default() -> Self {
        Self::new(LexicalConfig::default())
    }
}

impl LexicalProjector for TfIdfSvdProjector {
    fn project(&self, corpus: &[&str]) -> Result<Array2<f64>> {
        let mut vectorizer =
            TfIdfVectorizer::new(self.config.min_df, self.config.max_df, self.config.max_ngram);
        let matrix = vectorizer.fit_transform(corpus);
        let n_terms = vectorizer.n_terms();

        if n_terms < self.config.min_vocabulary.max(2) {
            return Err(Error::degenerate(format!(
                "vocabulary of {} terms across {} documents",
                n_terms,
                corpus.len()
            )));
        }

        let n_components = self.config.max_components.min(n_terms - 1);
        debug!(n_terms, nnz = matrix.nnz(), n_components, "fitting lexical projection");

        let svd = TruncatedSvd::new(n_components)
            .with_n_iter(self.config.n_iter)
            .with_seed(self.config.seed);
        Ok(svd.fit_transform(&matrix).embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "nifty rally strong banks lead",
            "nifty rally continues banks strong",
            "banks lead nifty higher today",
            "crypto crash deep losses today",
            "crypto crash panic selling losses",
            "panic selling crypto deep losses",
            "markets mixed nifty flat crypto flat",
        ]
    }

    #[test]
    fn test_projection_shape() {
        let projector = TfIdfSvdProjector::new(LexicalConfig {
            min_df: 2,
            max_components: 3,
            ..LexicalConfig::default()
        });
        let docs = corpus();
        let embedding = projector.project(&docs).unwrap();
        assert_eq!(embedding.nrows(), docs.len());
        assert_eq!(embedding.ncols(), 3);
        assert!(embedding.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_first_dimension_separates_topics() {
        let projector = TfIdfSvdProjector::new(LexicalConfig {
            min_df: 2,
            ..LexicalConfig::default()
        });
        let embedding = projector.project(&corpus()).unwrap();
        let first = embedding.column(0);
        // Documents about the same topic share the sign of their leading coordinate
        // relative to the other topic.
        let banks = (first[0] + first[1] + first[2]) / 3.0;
        let crypto = (first[3] + first[4] + first[5]) / 3.0;
        assert!((banks - crypto).abs() > 1e-6);
    }

    #[test]
    fn test_small_vocabulary_is_degenerate() {
        let projector = TfIdfSvdProjector::default();
        let err = projector.project(&["up", "down"]).unwrap_err();
        assert!(matches!(err, Error::DegenerateFeatureInput(_)));
    }

    #[test]
    fn test_empty_corpus_is_degenerate() {
        let projector = TfIdfSvdProjector::default();
        assert!(projector.project(&[]).is_err());
    }
}
