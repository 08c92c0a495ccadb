/// Text Classification Items
pub mod item;

/// TF-IDF features
pub mod vectorizer;

/// Class name encoding
pub mod labels;

/// The vectorizer and classifier composition
pub mod pipeline;

/// Saving and loading fitted artifacts
pub mod artifacts;

/// Training
pub mod training;

/// Input selection modes
pub mod selection;

/// Inference
pub mod inference;

pub use artifacts::ArtifactError;
pub use inference::{Context, InferenceError, Prediction};
pub use item::Item;
pub use labels::{LabelEncoder, LabelError};
pub use pipeline::{Pipeline, PipelineError};
pub use selection::{choose, Article, Resolution, Selection};
pub use training::{fit, train, Config, Trained};
pub use vectorizer::{TfidfVectorizer, VectorizerError};

/// The unique string token that identifies this pipeline
pub static PIPELINE: &str = "text-classification";
