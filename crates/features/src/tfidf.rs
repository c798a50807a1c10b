//! TF-IDF vectorization.
//!
//! Documents become L2-normalized rows of raw term counts weighted by smoothed
//! inverse document frequency. Terms that are too rare or too common across the
//! corpus are pruned before weighting.

use crate::sparse::CsrMatrix;
use crate::text::analyze;
use std::collections::{BTreeMap, HashMap, HashSet};

/// TF-IDF vectorizer fitted on one corpus.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Minimum document frequency (absolute count).
    min_df: usize,
    /// Maximum document frequency (fraction of documents).
    max_df: f64,
    /// Largest n-gram size.
    max_ngram: usize,
    /// Term -> column index, sorted alphabetically.
    vocabulary: HashMap<String, usize>,
    /// Column index -> term.
    terms: Vec<String>,
    /// IDF weight per column.
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(min_df: usize, max_df: f64, max_ngram: usize) -> Self {
        Self {
            min_df,
            max_df,
            max_ngram,
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Vec::new(),
        }
    }

    /// Number of terms kept after pruning.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// Kept terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weights in column order.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Column index of a term, if it survived pruning.
    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Fit the vocabulary and IDF on `documents` and return their weights.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> CsrMatrix {
        let analyzed: Vec<Vec<String>> = documents
            .iter()
            .map(|d| analyze(d.as_ref(), self.max_ngram))
            .collect();
        self.fit_analyzed(&analyzed);

        let rows = analyzed.iter().map(|terms| self.weigh(terms)).collect();
        CsrMatrix::from_rows(rows, self.terms.len())
    }

    fn fit_analyzed(&mut self, documents: &[Vec<String>]) {
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in documents {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = documents.len() as f64;
        let max_count = self.max_df * n_docs;

        // BTreeMap gives alphabetical column order.
        let kept: BTreeMap<&str, usize> = doc_freq
            .into_iter()
            .filter(|&(_, df)| df >= self.min_df && (df as f64) <= max_count)
            .collect();

        self.vocabulary.clear();
        self.terms.clear();
        self.idf.clear();
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            self.vocabulary.insert(term.to_string(), idx);
            self.terms.push(term.to_string());
            self.idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
        }
    }

    /// Weighted, L2-normalized row for one analyzed document.
    fn weigh(&self, terms: &[String]) -> Vec<(usize, f64)> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in terms {
            if let Some(&idx) = self.vocabulary.get(term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in row.iter_mut() {
                *w /= norm;
            }
        }
        row
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new(3, 0.9, 2)
    }
}
