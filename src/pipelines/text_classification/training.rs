use std::path::Path;

use burn::{
    config::Config as _,
    data::dataset::Dataset,
    tensor::backend::{AutodiffBackend, Backend},
};

use crate::{
    models::logistic::{self, FitConfig, FitReport},
    utils::tensors,
};

use super::{artifacts, Item, LabelEncoder, Pipeline, TfidfVectorizer};

/// Define configuration struct for the experiment
#[derive(burn::config::Config, Debug)]
pub struct Config {
    /// Vocabulary cap for the vectorizer
    #[config(default = 1000)]
    pub max_features: usize,

    /// Classifier fitting options
    #[config(default = "FitConfig::new()")]
    pub fit: FitConfig,

    /// The location of the top-level data directory
    #[config(default = "\"data\".to_string()")]
    pub data_dir: String,

    /// Directory to save the label encoder, pipeline and config files
    #[config(default = "\"model\".to_string()")]
    pub artifact_dir: String,

    /// The class names the label column must contain, no more and no less
    #[config(default = "vec![\"fake\".to_string(), \"real\".to_string()]")]
    pub expected_labels: Vec<String>,
}

/// A fitted label encoder and pipeline
#[derive(Debug)]
pub struct Trained<B: Backend> {
    /// Maps class names to the class ids the pipeline predicts
    pub encoder: LabelEncoder,

    /// The fitted vectorizer and classifier
    pub pipeline: Pipeline<B>,

    /// How fitting went
    pub report: FitReport,

    /// Fraction of training rows the pipeline classifies correctly
    pub accuracy: f64,
}

/// Fit the label encoder, vectorizer and classifier on a dataset without touching the disk
pub fn fit<B: AutodiffBackend, I: Item, D: Dataset<I>>(
    device: &B::Device,
    dataset: &D,
    config: &Config,
) -> anyhow::Result<Trained<B::InnerBackend>> {
    log::info!("Loading data...");

    let items: Vec<I> = (0..dataset.len()).filter_map(|i| dataset.get(i)).collect();

    if items.is_empty() {
        return Err(anyhow!("Cannot train on an empty dataset"));
    }

    let texts: Vec<&str> = items.iter().map(Item::input).collect();
    let labels: Vec<&str> = items.iter().map(Item::class_label).collect();

    let (encoder, targets) = LabelEncoder::fit_transform(&labels)?;
    encoder.expect_classes(&config.expected_labels)?;

    log::info!(
        "Data loaded: {} articles, classes {:?}",
        items.len(),
        encoder.classes()
    );

    log::info!("Fitting vectors...");

    let mut vectorizer = TfidfVectorizer::new(config.max_features);
    let rows = vectorizer.fit_transform(&texts)?;
    let n_features = vectorizer.vocabulary_size();

    log::info!("Vectors fit: {} features", n_features);

    log::info!("Training model...");

    let model_config = logistic::Config::new(n_features).with_n_classes(encoder.classes().len());
    let features = tensors::densify::<B>(&rows, n_features, device);
    let targets = tensors::class_ids::<B>(&targets, device);

    let (classifier, report) =
        logistic::fit::<B>(&model_config, &config.fit, features, targets, device);

    let pipeline = Pipeline::new(vectorizer, model_config, classifier, device.clone())?;

    let predictions = pipeline.predict(&texts)?;
    let correct = predictions
        .iter()
        .zip(&labels)
        .filter(|&(&id, &label)| encoder.decode(id).is_ok_and(|class| class == label))
        .count();
    let accuracy = correct as f64 / items.len() as f64;

    log::info!(
        "Model trained in {} iterations (loss {:.4}, training accuracy {:.1}%)",
        report.iterations,
        report.loss,
        accuracy * 100.0
    );

    Ok(Trained {
        encoder,
        pipeline,
        report,
        accuracy,
    })
}

/// Define train function: fit on the dataset, then save the label encoder, the pipeline and the
/// configuration into the artifact directory, replacing any previous artifacts
pub async fn train<B: AutodiffBackend, I: Item, D: Dataset<I>>(
    device: B::Device, // Device on which to perform computation
    dataset: D,        // Training dataset
    config: Config,    // Experiment configuration
) -> anyhow::Result<Trained<B::InnerBackend>> {
    let trained = fit::<B, I, D>(&device, &dataset, &config)?;

    let artifact_dir = Path::new(&config.artifact_dir);

    let encoder_path = artifacts::save_label_encoder(&trained.encoder, artifact_dir).await?;
    let pipeline_path = artifacts::save_pipeline(&trained.pipeline, artifact_dir).await?;

    config
        .save(artifact_dir.join(artifacts::CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to save training config: {}", e))?;

    log::info!(
        "Model saved to {} and {}",
        encoder_path.display(),
        pipeline_path.display()
    );

    Ok(trained)
}
