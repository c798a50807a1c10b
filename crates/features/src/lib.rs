//! Signal computation for the hashtag pulse pipeline.
//!
//! This crate handles:
//! - Text normalization and tokenization
//! - TF-IDF vectorization and truncated SVD (lexical structure)
//! - Lexicon sentiment scoring
//! - Engagement standardization
//! - Composite signal composition
//! - Windowed aggregation (mean, count, standard error)

pub mod composer;
pub mod engagement;
pub mod lexical;
pub mod lexicon;
pub mod scaler;
pub mod sentiment;
pub mod sparse;
pub mod svd;
pub mod text;
pub mod tfidf;
pub mod window;

pub use composer::{ComposedSignals, SignalComposer};
pub use lexical::{LexicalProjector, TfIdfSvdProjector};
pub use lexicon::SentimentLexicon;
pub use scaler::StandardScaler;
pub use sentiment::{LexiconScorer, SentimentScorer};
pub use svd::TruncatedSvd;
pub use tfidf::TfIdfVectorizer;
pub use window::WindowAggregator;
