//! Command line tool for training

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use fake_news_detector::{
    cli::{datasets::Dataset, models::Model, pipelines::Pipeline},
    datasets::{news, LoadableDataset},
    pipelines::text_classification::{self, training::Config, Item},
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: train [DATASET] [OPTIONS]

Arguments:
  DATASET              The dataset to use (defaults to 'news')

Options:
  -h, --help           Print help
  -m, --model          The model to use (defaults to 'logistic-regression')
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -f, --file           The dataset file inside the data directory (defaults to 'clean_data.csv.gz')
  -a, --artifact-dir   Where the label encoder and pipeline are saved (defaults to 'model')
  --max-features       Vocabulary cap for the vectorizer (defaults to 1000)
  --max-iter           Maximum optimizer iterations (defaults to 1000)
";

#[derive(Debug)]
struct Args {
    dataset: Option<String>,
    model: Option<String>,
    data_dir: Option<String>,
    file: Option<String>,
    artifact_dir: Option<String>,
    max_features: Option<usize>,
    max_iter: Option<usize>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            file: pargs.opt_value_from_str(["-f", "--file"])?,
            artifact_dir: pargs.opt_value_from_str(["-a", "--artifact-dir"])?,
            max_features: pargs.opt_value_from_str("--max-features")?,
            max_iter: pargs.opt_value_from_str("--max-iter")?,
            dataset: pargs.opt_free_from_str()?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", remaining));
        }

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let pipeline = Pipeline::TextClassification;

    let model = match &args.model {
        Some(name) => Model::try_from(name.as_str())?,
        None => pipeline.default_model(),
    };

    if !model.is_supported(&pipeline) {
        return Err(anyhow!("{} does not support {}", model, pipeline));
    }

    let dataset = match &args.dataset {
        Some(name) => Dataset::try_from(name.as_str())?,
        None => Dataset::News,
    };

    log::info!("Training {} with {} on {}", pipeline, model, dataset);

    let mut config = Config::new();

    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.to_string();
    }

    if let Some(artifact_dir) = &args.artifact_dir {
        config.artifact_dir = artifact_dir.to_string();
    }

    if let Some(max_features) = args.max_features {
        config.max_features = max_features;
    }

    if let Some(max_iter) = args.max_iter {
        config.fit.max_iter = max_iter;
    }

    let file = args
        .file
        .as_deref()
        .unwrap_or_else(|| dataset.default_file());
    let path: PathBuf = Path::new(&config.data_dir).join(file);

    match dataset {
        Dataset::News => train_text_classification::<news::Item, news::Dataset>(&path, config).await,
    }
}

async fn train_text_classification<I: Item, D: LoadableDataset<I>>(
    path: &Path,
    config: Config,
) -> anyhow::Result<()> {
    let data = D::load(path).await?;

    let trained = text_classification::train::<Autodiff<NdArray>, I, D>(
        NdArrayDevice::Cpu,
        data,
        config,
    )
    .await?;

    println!(
        "Trained on classes {:?}: {} iterations, training accuracy {:.1}%",
        trained.encoder.classes(),
        trained.report.iterations,
        trained.accuracy * 100.0
    );

    Ok(())
}
