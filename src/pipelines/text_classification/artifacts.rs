use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};

use crate::{models::logistic, utils::files};

use super::{LabelEncoder, Pipeline, PipelineError, TfidfVectorizer};

/// The serialized label encoder
pub static LABEL_ENCODER_FILE: &str = "label_encoder.bin";

/// The serialized vectorizer and classifier
pub static PIPELINE_FILE: &str = "logistic_model.bin";

/// The training configuration saved alongside the artifacts
pub static CONFIG_FILE: &str = "config.json";

/// The on-disk form of a pipeline: the vectorizer and classifier travel in one blob so they
/// cannot be paired with the wrong partner
#[derive(Serialize, Deserialize)]
struct PipelineArtifact {
    vectorizer: TfidfVectorizer,
    config: logistic::Config,
    record: Vec<u8>,
}

fn recorder() -> BinBytesRecorder<FullPrecisionSettings> {
    BinBytesRecorder::default()
}

/// Write the label encoder into the artifact directory, replacing any previous one
pub async fn save_label_encoder(
    encoder: &LabelEncoder,
    artifact_dir: &Path,
) -> Result<PathBuf, ArtifactError> {
    let path = artifact_dir.join(LABEL_ENCODER_FILE);

    files::write_creating_dirs(&path, &bincode::serialize(encoder)?).await?;

    Ok(path)
}

/// Read the label encoder from the artifact directory
pub async fn load_label_encoder(artifact_dir: &Path) -> Result<LabelEncoder, ArtifactError> {
    let path = artifact_dir.join(LABEL_ENCODER_FILE);
    let bytes = read(&path).await?;

    Ok(bincode::deserialize(&bytes)?)
}

/// Write the pipeline into the artifact directory, replacing any previous one
pub async fn save_pipeline<B: Backend>(
    pipeline: &Pipeline<B>,
    artifact_dir: &Path,
) -> Result<PathBuf, ArtifactError> {
    let path = artifact_dir.join(PIPELINE_FILE);

    let record = Recorder::<B>::record(&recorder(), pipeline.classifier.clone().into_record(), ())
        .map_err(|e| ArtifactError::Record(e.to_string()))?;

    let artifact = PipelineArtifact {
        vectorizer: pipeline.vectorizer.clone(),
        config: pipeline.config.clone(),
        record,
    };

    files::write_creating_dirs(&path, &bincode::serialize(&artifact)?).await?;

    Ok(path)
}

/// Read the pipeline from the artifact directory onto the given device
pub async fn load_pipeline<B: Backend>(
    artifact_dir: &Path,
    device: &B::Device,
) -> Result<Pipeline<B>, ArtifactError> {
    let path = artifact_dir.join(PIPELINE_FILE);
    let bytes = read(&path).await?;

    let PipelineArtifact {
        vectorizer,
        config,
        record,
    } = bincode::deserialize(&bytes)?;

    let record = Recorder::<B>::load(&recorder(), record, device)
        .map_err(|e| ArtifactError::Record(e.to_string()))?;

    let classifier = config.init::<B>(device).load_record(record);

    Ok(Pipeline::new(vectorizer, config, classifier, device.clone())?)
}

async fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Artifact Error
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    /// An artifact file is missing or unreadable
    #[error("unable to read artifact {}: {source}", .path.display())]
    Read {
        /// The artifact path
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// An artifact could not be written
    #[error("unable to write artifact: {0}")]
    Write(#[from] std::io::Error),

    /// An artifact could not be encoded or decoded
    #[error("corrupt artifact: {0}")]
    Encoding(#[from] bincode::Error),

    /// The classifier weights could not be recorded or restored
    #[error("unable to record classifier weights: {0}")]
    Record(String),

    /// The restored vectorizer and classifier disagree
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
