//! Command line front end for inference

use std::path::PathBuf;

use anyhow::anyhow;
use burn::backend::{ndarray::NdArrayDevice, NdArray};
use fake_news_detector::{
    collectors::Unimplemented,
    config::Settings,
    datasets::Search,
    pipelines::text_classification::{choose, Article, Context, Resolution, Selection},
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer [OPTIONS] (--index N | --search QUERY [--choice K] | --url URL)

Options:
  -h, --help           Print help
  -c, --config         A YAML settings file (every field is optional)
  -i, --index          Classify the dataset article at this row
  -s, --search         Search the dataset titles, word by word
  -k, --choice         Which of the listed search results to classify (defaults to 0)
  -u, --url            Classify an article from the web
  -e, --explain        Explain the prediction in terms of its words
  --html               Write the explanation as an HTML fragment to this file
  --json               Print the prediction as JSON
";

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    selection: Selection,
    explain: bool,
    html: Option<PathBuf>,
    json: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let config = pargs.opt_value_from_str(["-c", "--config"])?;
        let index: Option<usize> = pargs.opt_value_from_str(["-i", "--index"])?;
        let query: Option<String> = pargs.opt_value_from_str(["-s", "--search"])?;
        let choice: Option<usize> = pargs.opt_value_from_str(["-k", "--choice"])?;
        let url: Option<String> = pargs.opt_value_from_str(["-u", "--url"])?;
        let html: Option<PathBuf> = pargs.opt_value_from_str("--html")?;
        let explain = pargs.contains(["-e", "--explain"]) || html.is_some();
        let json = pargs.contains("--json");

        let selection = match (index, query, url) {
            (Some(index), None, None) => Selection::Index(index),
            (None, Some(query), None) => Selection::Search {
                query,
                choice: choice.unwrap_or_default(),
            },
            (None, None, Some(url)) => Selection::Url(url),
            _ => {
                return Err(anyhow!(
                    "Exactly one of --index, --search or --url is required"
                ))
            }
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", remaining));
        }

        Ok(Some(Args {
            config,
            selection,
            explain,
            html,
            json,
        }))
    }
}

/// What to tell the user when a selection has nothing to predict
fn describe(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Article(_) => "Article selected".to_string(),
        Resolution::NoInput => "No input, try again".to_string(),
        Resolution::NoMatches => "No titles match, try again".to_string(),
        Resolution::OutOfRange(position) => format!("Nothing to select at {}", position),
        Resolution::InvalidUrl => "Invalid URL, try again".to_string(),
        Resolution::Unparseable => "Unable to parse an article from the URL".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let settings = match &args.config {
        Some(path) => Settings::load(path).await?,
        None => Settings::default(),
    };

    let context = Context::<NdArray>::load(settings, NdArrayDevice::Cpu).await?;

    let resolution = match &args.selection {
        Selection::Search { query, choice } => {
            let results = context.search(query);

            if let Search::Matches(matches) = &results {
                println!("Found {} results", matches.len());

                let selectable = results.selectable(context.settings.search.max_selectable);
                for (position, (index, item)) in selectable.iter().enumerate() {
                    println!("  [{}] #{} {}", position, index, item.cleaned_title);
                }
            }

            choose(&results, *choice, &context.settings.search)
        }
        selection => context.resolve(selection, &Unimplemented).await,
    };

    let prediction = context.predict_resolution(&resolution)?;

    let (Resolution::Article(Article { text, index }), Some(prediction)) =
        (&resolution, prediction)
    else {
        println!("{}", describe(&resolution));

        return Ok(());
    };

    if let Some(index) = index {
        println!("Article #{}", index);
    }

    println!("{}", prediction);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    }

    if args.explain {
        let explanation = context.explain(text, &prediction)?;

        println!(
            "Words pushing toward {} (local fit score {:.3}):",
            explanation.class_name(),
            explanation.score
        );

        for weight in &explanation.weights {
            println!("  {:>20} {:+.4}", weight.word, weight.weight);
        }

        if let Some(path) = &args.html {
            let html = explanation.render_html(text)?;
            tokio::fs::write(path, html).await?;

            println!("Explanation written to {}", path.display());
        }
    }

    Ok(())
}
