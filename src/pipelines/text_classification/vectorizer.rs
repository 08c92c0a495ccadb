use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap, HashSet},
};

use serde::{Deserialize, Serialize};

use crate::utils::{tensors::SparseRow, text};

/// The default vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// TF-IDF vectorizer over a bounded vocabulary.
///
/// Keeps the `max_features` terms with the highest corpus term frequency, indexes them
/// alphabetically, weights counts by smoothed inverse document frequency and L2-normalizes every
/// row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    /// Learn the vocabulary and document frequencies from a corpus
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<(), VectorizerError> {
        if documents.is_empty() {
            return Err(VectorizerError::EmptyCorpus);
        }

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_counts: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let tokens = text::tokenize(document.as_ref());

            for token in tokens.iter().collect::<HashSet<_>>() {
                *doc_counts.entry(token.clone()).or_default() += 1;
            }

            for token in tokens {
                *term_counts.entry(token).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|(a_term, a_count), (b_term, b_count)| {
            Reverse(a_count)
                .cmp(&Reverse(b_count))
                .then_with(|| a_term.cmp(b_term))
        });
        ranked.truncate(self.max_features);

        if ranked.is_empty() {
            return Err(VectorizerError::EmptyVocabulary);
        }

        // BTreeMap iteration is alphabetical, which fixes the feature order
        let kept: BTreeMap<String, usize> = ranked.into_iter().collect();
        let n_documents = documents.len() as f32;

        self.idf = kept
            .keys()
            .map(|term| {
                let df = doc_counts.get(term).copied().unwrap_or(0) as f32;

                ((1.0 + n_documents) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        self.vocabulary = kept
            .into_keys()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Ok(())
    }

    /// Fit on a corpus, then transform it
    pub fn fit_transform<S: AsRef<str>>(
        &mut self,
        documents: &[S],
    ) -> Result<Vec<SparseRow>, VectorizerError> {
        self.fit(documents)?;

        Ok(self.transform_batch(documents))
    }

    /// Transform one document into a sparse, L2-normalized TF-IDF row sorted by feature index
    pub fn transform(&self, document: &str) -> SparseRow {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();

        for token in text::tokenize(document) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|(_, w)| *w /= norm);
        }

        row
    }

    /// Transform a batch of documents
    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseRow> {
        documents
            .iter()
            .map(|document| self.transform(document.as_ref()))
            .collect()
    }

    /// The number of features each row is indexed into
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether `fit` has produced a vocabulary
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// The feature index of a term, if it is in the vocabulary
    pub fn feature_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Vocabulary terms ordered by feature index
    pub fn feature_names(&self) -> Vec<&str> {
        // Indexes were assigned in alphabetical order
        self.vocabulary.keys().map(String::as_str).collect()
    }
}

/// Vectorizer Error
#[derive(thiserror::Error, Debug)]
pub enum VectorizerError {
    /// Fitting was attempted on no documents
    #[error("cannot fit a vectorizer on an empty corpus")]
    EmptyCorpus,

    /// No document contained a usable token
    #[error("the corpus produced an empty vocabulary")]
    EmptyVocabulary,
}
