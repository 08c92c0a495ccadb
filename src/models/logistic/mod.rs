//! Multinomial logistic regression as a single Burn linear layer

/// Model and configuration
pub mod model;

/// Full-batch fitting
pub mod training;

pub use model::{Config, Model};
pub use training::{fit, FitConfig, FitReport};

/// The model type token used on the command line
pub static MODEL_TYPE: &str = "logistic-regression";
