use std::fmt::Display;

use crate::models::logistic;

use super::pipelines::Pipeline;

/// Available Models
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Model {
    /// A TF-IDF vectorizer feeding a regularized logistic regression
    LogisticRegression,
}

impl Model {
    /// Get the model type
    pub fn model_type(&self) -> &str {
        match self {
            Model::LogisticRegression => logistic::MODEL_TYPE,
        }
    }

    /// Check if the model is valid for the given pipeline
    pub fn is_supported(&self, pipeline: &Pipeline) -> bool {
        match self {
            Model::LogisticRegression => matches!(pipeline, Pipeline::TextClassification),
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model_type())
    }
}

impl TryFrom<&str> for Model {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value == logistic::MODEL_TYPE {
            Ok(Model::LogisticRegression)
        } else {
            Err(ModelError::Unknown(value.to_string()))
        }
    }
}

/// Model Error
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// No model found for the given string
    #[error("no model found for {0}")]
    Unknown(String),
}
