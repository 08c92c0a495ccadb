use std::path::{Path, PathBuf};

use async_trait::async_trait;
use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use fake_news_detector::{
    collectors::{ArticleCollector, Fetched},
    config::Settings,
    datasets::{news, Search},
    pipelines::text_classification::{
        self, choose, training::Config, Article, Context, Prediction, Resolution, Selection,
    },
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/news.csv")
}

/// Train on the fixture into a fresh artifact directory and load an inference context from it
async fn trained_context() -> anyhow::Result<(TempDir, Context<NdArray>)> {
    let artifact_dir = TempDir::new()?;

    let dataset = news::Dataset::load(fixture()).await?;

    let mut config = Config::new();
    config.artifact_dir = artifact_dir.path().display().to_string();

    let trained = text_classification::train::<Autodiff<NdArray>, news::Item, news::Dataset>(
        NdArrayDevice::Cpu,
        dataset,
        config,
    )
    .await?;

    assert_eq!(trained.encoder.classes(), ["fake", "real"]);
    assert!(trained.accuracy > 0.8);

    let settings = Settings {
        dataset_path: fixture(),
        artifact_dir: artifact_dir.path().to_path_buf(),
        ..Settings::default()
    };

    let context = Context::<NdArray>::load(settings, NdArrayDevice::Cpu).await?;

    Ok((artifact_dir, context))
}

struct Canned(&'static str);

#[async_trait]
impl ArticleCollector for Canned {
    async fn fetch(&self, _url: &str) -> Fetched {
        Fetched::Article(self.0.to_string())
    }
}

#[tokio::test]
async fn test_training_writes_artifacts() -> anyhow::Result<()> {
    let (artifact_dir, _context) = trained_context().await?;

    for file in [
        text_classification::artifacts::LABEL_ENCODER_FILE,
        text_classification::artifacts::PIPELINE_FILE,
        text_classification::artifacts::CONFIG_FILE,
    ] {
        assert!(artifact_dir.path().join(file).is_file(), "missing {}", file);
    }

    Ok(())
}

#[tokio::test]
async fn test_fake_row_is_predicted_fake() -> anyhow::Result<()> {
    let (_artifact_dir, context) = trained_context().await?;

    let (resolution, prediction) = context
        .predict_selection(&Selection::Index(3), &Canned(""))
        .await?;

    assert_eq!(
        resolution,
        Resolution::Article(Article {
            text: "breaking celebrity scandal shocks fans".to_string(),
            index: Some(3),
        })
    );

    let prediction = prediction.ok_or_else(|| anyhow::anyhow!("no prediction"))?;
    let (p_fake, p_real) = (
        prediction.probability_of("fake").unwrap_or_default(),
        prediction.probability_of("real").unwrap_or_default(),
    );

    assert_eq!(prediction.label, "fake");
    assert!(p_fake > p_real);

    Ok(())
}

#[tokio::test]
async fn test_every_row_gets_a_distribution() -> anyhow::Result<()> {
    let (_artifact_dir, context) = trained_context().await?;

    for (_, item) in context.dataset.rows() {
        let prediction = context.predict(&[item.cleaned_text.as_str()])?;

        assert!(["fake", "real"].contains(&prediction.label.as_str()));
        assert_eq!(prediction.probabilities.len(), 2);

        let total: f32 = prediction.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-5, "probabilities sum to {}", total);
    }

    Ok(())
}

#[tokio::test]
async fn test_predictions_are_repeatable() -> anyhow::Result<()> {
    let (_artifact_dir, context) = trained_context().await?;
    let text = ["senate passed budget bill narrow vote"];

    assert_eq!(context.predict(&text)?, context.predict(&text)?);

    Ok(())
}

#[tokio::test]
async fn test_artifacts_round_trip() -> anyhow::Result<()> {
    let artifact_dir = TempDir::new()?;
    let dataset = news::Dataset::load(fixture()).await?;

    let config = Config::new();
    let trained = text_classification::fit::<Autodiff<NdArray>, news::Item, news::Dataset>(
        &NdArrayDevice::Cpu,
        &dataset,
        &config,
    )?;

    text_classification::artifacts::save_pipeline(&trained.pipeline, artifact_dir.path()).await?;
    text_classification::artifacts::save_label_encoder(&trained.encoder, artifact_dir.path())
        .await?;

    let pipeline = text_classification::artifacts::load_pipeline::<NdArray>(
        artifact_dir.path(),
        &NdArrayDevice::Cpu,
    )
    .await?;
    let encoder = text_classification::artifacts::load_label_encoder(artifact_dir.path()).await?;

    let texts: Vec<String> = dataset.rows().map(|(_, item)| item.cleaned_text).collect();

    assert_eq!(encoder.classes(), trained.encoder.classes());
    assert_eq!(
        pipeline.predict_proba(&texts)?,
        trained.pipeline.predict_proba(&texts)?
    );

    Ok(())
}

#[tokio::test]
async fn test_title_search() -> anyhow::Result<()> {
    let (_artifact_dir, context) = trained_context().await?;

    let indexes: Vec<usize> = match context.search("us government") {
        Search::Matches(rows) => rows.into_iter().map(|(index, _)| index).collect(),
        Search::NoInput => vec![],
    };
    assert_eq!(indexes, vec![0]);

    assert!(matches!(context.search("input title"), Search::NoInput));

    let (resolution, prediction) = context
        .predict_selection(
            &Selection::Search {
                query: "budget".to_string(),
                choice: 1,
            },
            &Canned(""),
        )
        .await?;

    assert_eq!(
        resolution,
        Resolution::Article(Article {
            text: "governor signed state budget legislature vote bill".to_string(),
            index: Some(8),
        })
    );
    assert!(prediction.is_some());

    // A finished search can be listed and chosen from without searching again
    let results = context.search("budget");
    let resolution = choose(&results, 1, &context.settings.search);

    assert_eq!(results.len(), 2);
    assert_eq!(
        context.predict_resolution(&resolution)?,
        context.predict(&["governor signed state budget legislature vote bill"]).ok()
    );
    assert_eq!(
        context.predict_resolution(&choose(&results, 2, &context.settings.search))?,
        None
    );

    Ok(())
}

#[tokio::test]
async fn test_url_articles_are_cleaned_before_prediction() -> anyhow::Result<()> {
    let (_artifact_dir, context) = trained_context().await?;
    let collector = Canned("The Senate passed the BUDGET bill after a vote!");

    let (resolution, prediction) = context
        .predict_selection(&Selection::Url("https://example.com/story".to_string()), &collector)
        .await?;

    assert_eq!(
        resolution,
        Resolution::Article(Article {
            text: "senate passed budget bill vote".to_string(),
            index: None,
        })
    );
    assert!(prediction.is_some());

    let (resolution, prediction) = context
        .predict_selection(&Selection::Index(99), &collector)
        .await?;

    assert_eq!(resolution, Resolution::OutOfRange(99));
    assert_eq!(prediction, None);

    Ok(())
}

#[tokio::test]
async fn test_explanation_points_at_words() -> anyhow::Result<()> {
    let (_artifact_dir, context) = trained_context().await?;
    let text = "senate scandal celebrity fans";

    let prediction = Prediction {
        label: "fake".to_string(),
        ..context.predict(&[text])?
    };
    let explanation = context.explain(text, &prediction)?;

    assert_eq!(explanation.class_name(), "fake");
    assert_eq!(explanation.weights.len(), 4);

    let senate = explanation
        .weight_of("senate")
        .ok_or_else(|| anyhow::anyhow!("senate not explained"))?;
    assert!(senate < 0.0, "senate weight {}", senate);

    let html = explanation.render_html(text)?;

    assert!(html.contains("Prediction probability for fake"));
    assert!(html.contains(">senate</span>"));
    assert!(html.contains("rgba(31, 119, 180"));

    Ok(())
}
