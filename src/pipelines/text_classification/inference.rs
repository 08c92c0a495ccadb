use std::fmt::Display;

use burn::{data::dataset::Dataset as _, tensor::backend::Backend};
use futures::TryFutureExt;
use serde::Serialize;

use crate::{
    collectors::ArticleCollector,
    config::Settings,
    datasets::{news, search, Search},
    explain::{Explainer, Explanation, ExplainError, LimeText},
    utils::classes::argmax,
};

use super::{
    artifacts, Article, LabelEncoder, LabelError, Pipeline, PipelineError, Resolution, Selection,
};

/// A decoded prediction for one article
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    /// The predicted class name
    pub label: String,

    /// Class probabilities, ordered like `class_names`
    pub probabilities: Vec<f32>,

    /// Class names ordered by class id
    pub class_names: Vec<String>,
}

impl Prediction {
    /// The probability of a class, looked up by name
    pub fn probability_of(&self, label: &str) -> Option<f32> {
        self.class_names
            .iter()
            .position(|class| class == label)
            .and_then(|id| self.probabilities.get(id).copied())
    }

    /// The probability of the predicted class
    pub fn confidence(&self) -> f32 {
        self.probability_of(&self.label).unwrap_or_default()
    }
}

impl Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Article is a {} news story with {:.1}% probability",
            self.label,
            self.confidence() * 100.0
        )
    }
}

/// Everything the inference service needs, loaded once and never mutated
pub struct Context<B: Backend> {
    /// The articles available for selection
    pub dataset: news::Dataset,

    /// Decodes the pipeline's class ids
    pub encoder: LabelEncoder,

    /// The fitted vectorizer and classifier
    pub pipeline: Pipeline<B>,

    /// Service settings
    pub settings: Settings,
}

impl<B: Backend> Context<B> {
    /// Assemble a context, checking that the encoder and pipeline agree on the classes
    pub fn new(
        dataset: news::Dataset,
        encoder: LabelEncoder,
        pipeline: Pipeline<B>,
        settings: Settings,
    ) -> Result<Self, InferenceError> {
        let n_classes = pipeline.config.n_classes;

        if encoder.classes().len() != n_classes {
            return Err(InferenceError::ClassMismatch {
                encoder: encoder.classes().len(),
                pipeline: n_classes,
            });
        }

        Ok(Self {
            dataset,
            encoder,
            pipeline,
            settings,
        })
    }

    /// Load the dataset and both artifacts named by the settings
    pub async fn load(settings: Settings, device: B::Device) -> anyhow::Result<Self> {
        log::info!("Loading data...");

        let (dataset, encoder, pipeline) = futures::try_join!(
            news::Dataset::load(&settings.dataset_path).map_err(anyhow::Error::from),
            artifacts::load_label_encoder(&settings.artifact_dir).map_err(anyhow::Error::from),
            artifacts::load_pipeline::<B>(&settings.artifact_dir, &device)
                .map_err(anyhow::Error::from),
        )?;

        log::info!(
            "Done! {} articles, {} features, classes {:?}",
            dataset.len(),
            pipeline.vectorizer.vocabulary_size(),
            encoder.classes()
        );

        Ok(Self::new(dataset, encoder, pipeline, settings)?)
    }

    /// Predict the class of the first article, with its full probability vector
    pub fn predict<S: AsRef<str>>(&self, articles: &[S]) -> Result<Prediction, InferenceError> {
        let probabilities = self
            .pipeline
            .predict_proba(articles)?
            .into_iter()
            .next()
            .ok_or(PipelineError::EmptyInput)?;

        let id = argmax(&probabilities).ok_or(PipelineError::NoClasses)?;
        let label = self.encoder.decode(id)?.to_string();

        Ok(Prediction {
            label,
            probabilities,
            class_names: self.encoder.classes().to_vec(),
        })
    }

    /// Search the dataset titles
    pub fn search(&self, query: &str) -> Search {
        search(query, &self.dataset, &self.settings.search.placeholder)
    }

    /// Resolve a selection against this context's dataset
    pub async fn resolve(
        &self,
        selection: &Selection,
        collector: &dyn ArticleCollector,
    ) -> Resolution {
        selection
            .resolve(&self.dataset, &self.settings.search, collector)
            .await
    }

    /// Resolve a selection and predict it. `Ok(None)` means there is nothing to predict; the
    /// resolution says why.
    pub async fn predict_selection(
        &self,
        selection: &Selection,
        collector: &dyn ArticleCollector,
    ) -> Result<(Resolution, Option<Prediction>), InferenceError> {
        let resolution = self.resolve(selection, collector).await;
        let prediction = self.predict_resolution(&resolution)?;

        Ok((resolution, prediction))
    }

    /// Predict an already resolved selection. `Ok(None)` means there is nothing to predict.
    pub fn predict_resolution(
        &self,
        resolution: &Resolution,
    ) -> Result<Option<Prediction>, InferenceError> {
        match resolution {
            Resolution::Article(Article { text, .. }) => Ok(Some(self.predict(&[text])?)),
            other => {
                log::warn!("No prediction available: {:?}", other);

                Ok(None)
            }
        }
    }

    /// Explain a prediction for `text` in terms of its words
    pub fn explain(
        &self,
        text: &str,
        prediction: &Prediction,
    ) -> Result<Explanation, InferenceError> {
        let class = self.encoder.encode(&prediction.label)?;
        let explainer = LimeText::new(self.settings.explanation.clone());

        Ok(explainer.explain(
            |texts: &[String]| self.pipeline.predict_proba(texts),
            self.encoder.classes(),
            text,
            class,
        )?)
    }
}

/// Inference Error
#[derive(thiserror::Error, Debug)]
pub enum InferenceError {
    /// The pipeline could not produce probabilities
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A class id or name could not be mapped
    #[error(transparent)]
    Label(#[from] LabelError),

    /// The explanation could not be produced
    #[error(transparent)]
    Explain(#[from] ExplainError),

    /// The label encoder and pipeline were fitted on different classes
    #[error("label encoder has {encoder} classes but the pipeline predicts {pipeline}")]
    ClassMismatch {
        /// Classes known to the encoder
        encoder: usize,
        /// Classes predicted by the pipeline
        pipeline: usize,
    },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn prediction() -> Prediction {
        Prediction {
            label: "real".to_string(),
            probabilities: vec![0.25, 0.75],
            class_names: vec!["fake".to_string(), "real".to_string()],
        }
    }

    #[test]
    fn test_probability_by_name() {
        let prediction = prediction();

        assert_eq!(prediction.probability_of("fake"), Some(0.25));
        assert_eq!(prediction.probability_of("real"), Some(0.75));
        assert_eq!(prediction.probability_of("satire"), None);
        assert_eq!(prediction.confidence(), 0.75);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            prediction().to_string(),
            "Article is a real news story with 75.0% probability"
        );
    }
}
