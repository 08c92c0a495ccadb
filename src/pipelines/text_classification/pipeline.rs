use burn::tensor::backend::Backend;

use crate::{
    models::logistic,
    utils::{classes::argmax, tensors},
};

use super::TfidfVectorizer;

/// The fitted vectorizer and classifier, always used together
#[derive(Debug)]
pub struct Pipeline<B: Backend> {
    /// Maps text to TF-IDF features
    pub vectorizer: TfidfVectorizer,

    /// The classifier configuration
    pub config: logistic::Config,

    /// Maps features to class probabilities
    pub classifier: logistic::Model<B>,

    /// Device on which to perform computation
    device: B::Device,
}

impl<B: Backend> Pipeline<B> {
    /// Compose a vectorizer and a classifier, checking that their widths agree
    pub fn new(
        vectorizer: TfidfVectorizer,
        config: logistic::Config,
        classifier: logistic::Model<B>,
        device: B::Device,
    ) -> Result<Self, PipelineError> {
        if !vectorizer.is_fitted() {
            return Err(PipelineError::Unfitted);
        }

        let expected = vectorizer.vocabulary_size();
        let found = classifier.n_features();

        if expected != found || config.n_features != found {
            return Err(PipelineError::FeatureMismatch { expected, found });
        }

        Ok(Self {
            vectorizer,
            config,
            classifier,
            device,
        })
    }

    /// Class probabilities for every text, one row per text ordered by class id
    pub fn predict_proba<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<Vec<f32>>, PipelineError> {
        if texts.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let rows = self.vectorizer.transform_batch(texts);
        let features =
            tensors::densify::<B>(&rows, self.vectorizer.vocabulary_size(), &self.device);

        Ok(tensors::into_rows(self.classifier.infer(features)))
    }

    /// The most probable class id for every text
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<usize>, PipelineError> {
        self.predict_proba(texts)?
            .iter()
            .map(|row| argmax(row).ok_or(PipelineError::NoClasses))
            .collect()
    }
}

/// Pipeline Error
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Prediction was requested for no texts
    #[error("at least one text is required for prediction")]
    EmptyInput,

    /// The classifier was fitted on a different vocabulary
    #[error("classifier expects {found} features but the vectorizer produces {expected}")]
    FeatureMismatch {
        /// The vectorizer's vocabulary size
        expected: usize,
        /// The classifier's input width
        found: usize,
    },

    /// The vectorizer has no vocabulary
    #[error("the vectorizer must be fitted before building a pipeline")]
    Unfitted,

    /// The classifier produced no classes
    #[error("the classifier has no output classes")]
    NoClasses,
}
