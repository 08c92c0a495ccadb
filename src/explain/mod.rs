//! Local explanations of individual predictions

use serde::{Deserialize, Serialize};

/// Perturbation-based text explanations
pub mod lime;

/// Weighted ridge regression used as the local surrogate model
pub mod ridge;

/// HTML rendering of explanations
pub mod render;

pub use lime::LimeText;

/// Boxed error returned by a probability callback
pub type ClassifierError = Box<dyn std::error::Error + Send + Sync>;

/// Something that can attribute a prediction to the words of a text
pub trait Explainer {
    /// Explain why `probability_fn` assigns `class` to `text`.
    ///
    /// `probability_fn` maps a batch of texts to one probability row per text, ordered like
    /// `class_names`.
    fn explain<F, E>(
        &self,
        probability_fn: F,
        class_names: &[String],
        text: &str,
        class: usize,
    ) -> Result<Explanation, ExplainError>
    where
        F: Fn(&[String]) -> Result<Vec<Vec<f32>>, E>,
        E: Into<ClassifierError>;
}

/// Explainer settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Perturbed texts to score, including the original
    pub num_samples: usize,

    /// Words to report
    pub num_features: usize,

    /// Width of the exponential proximity kernel
    pub kernel_width: f32,

    /// Seed for the perturbation sampler
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_samples: 1000,
            num_features: 10,
            kernel_width: 25.0,
            seed: 42,
        }
    }
}

/// A word and its local weight toward the explained class
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordWeight {
    /// The word as it appears in the text
    pub word: String,

    /// Positive values push toward the explained class, negative away from it
    pub weight: f32,
}

/// A local explanation of one prediction
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Explanation {
    /// The explained class id
    pub class: usize,

    /// Class names ordered by class id
    pub class_names: Vec<String>,

    /// The most influential words, strongest first
    pub weights: Vec<WordWeight>,

    /// The surrogate model's intercept
    pub intercept: f32,

    /// Weighted R^2 of the surrogate model on the perturbed samples
    pub score: f32,

    /// The surrogate model's prediction for the unmodified text
    pub local_prediction: f32,

    /// The classifier's probability of the explained class for the unmodified text
    pub probability: f32,
}

impl Explanation {
    /// The name of the explained class
    pub fn class_name(&self) -> &str {
        self.class_names
            .get(self.class)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// The weight of a word, if it was among the reported ones
    pub fn weight_of(&self, word: &str) -> Option<f32> {
        self.weights
            .iter()
            .find(|w| w.word == word)
            .map(|w| w.weight)
    }
}

/// Explain Error
#[derive(thiserror::Error, Debug)]
pub enum ExplainError {
    /// The text has no words to attribute
    #[error("cannot explain a text with no words")]
    EmptyText,

    /// The class id is not one of the class names
    #[error("class id {class} is out of range for {n_classes} classes")]
    UnknownClass {
        /// The requested class id
        class: usize,
        /// How many classes there are
        n_classes: usize,
    },

    /// The probability callback failed
    #[error("the classifier failed: {0}")]
    Classifier(ClassifierError),

    /// The probability callback returned the wrong shape
    #[error("expected {rows} probability rows of {cols} classes")]
    Shape {
        /// Expected rows
        rows: usize,
        /// Expected columns
        cols: usize,
    },

    /// The surrogate model could not be fitted
    #[error("the local surrogate model could not be fitted")]
    Surrogate,

    /// The explanation could not be rendered
    #[error("unable to render explanation: {0}")]
    Render(#[from] liquid::Error),
}
