use burn::data::dataset::Dataset as _;

use crate::{
    collectors::{ArticleCollector, Fetched},
    config::SearchSettings,
    datasets::{news, search, Search},
    utils::text,
};

/// How the user picked an article
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A row of the dataset, by index
    Index(usize),

    /// One of the selectable title-search matches
    Search {
        /// The free-text title query
        query: String,

        /// Position among the selectable matches
        choice: usize,
    },

    /// An article fetched from the web
    Url(String),
}

/// An article ready for prediction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Article {
    /// The cleaned body to classify
    pub text: String,

    /// The dataset row it came from, if any
    pub index: Option<usize>,
}

/// What a selection resolved to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// An article to classify
    Article(Article),

    /// The search query was empty or the placeholder
    NoInput,

    /// The search query matched no titles
    NoMatches,

    /// The index or search choice is past the end of what is available
    OutOfRange(usize),

    /// The URL could not be used
    InvalidUrl,

    /// No article could be extracted from the URL
    Unparseable,
}

impl Selection {
    /// Resolve the selection to an article, or to the reason there is nothing to predict
    pub async fn resolve(
        &self,
        dataset: &news::Dataset,
        settings: &SearchSettings,
        collector: &dyn ArticleCollector,
    ) -> Resolution {
        match self {
            Selection::Index(index) => match dataset.get(*index) {
                Some(item) => Resolution::Article(Article {
                    text: item.cleaned_text,
                    index: Some(*index),
                }),
                None => Resolution::OutOfRange(*index),
            },
            Selection::Search { query, choice } => {
                let results = search(query, dataset, &settings.placeholder);

                choose(&results, *choice, settings)
            }
            Selection::Url(url) => match collector.fetch(url).await {
                Fetched::Article(raw) => Resolution::Article(Article {
                    text: text::clean(&raw),
                    index: None,
                }),
                Fetched::Unparseable => Resolution::Unparseable,
                Fetched::InvalidUrl => Resolution::InvalidUrl,
            },
        }
    }
}

/// Resolve a choice among the selectable matches of a search that has already run
pub fn choose(results: &Search, choice: usize, settings: &SearchSettings) -> Resolution {
    if let Search::NoInput = results {
        return Resolution::NoInput;
    }

    log::info!("Found {} results", results.len());

    if results.is_empty() {
        return Resolution::NoMatches;
    }

    match results.selectable(settings.max_selectable).get(choice) {
        Some((index, item)) => Resolution::Article(Article {
            text: item.cleaned_text.clone(),
            index: Some(*index),
        }),
        None => Resolution::OutOfRange(choice),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use crate::collectors::Unimplemented;

    use super::*;

    struct Canned(&'static str);

    #[async_trait]
    impl ArticleCollector for Canned {
        async fn fetch(&self, _url: &str) -> Fetched {
            Fetched::Article(self.0.to_string())
        }
    }

    fn dataset() -> news::Dataset {
        let titles = [
            "us government shutdown looms",
            "us open tennis results",
            "celebrity scandal",
        ];

        news::Dataset::from_items(
            titles
                .iter()
                .enumerate()
                .map(|(i, title)| {
                    news::Item::new(
                        String::new(),
                        String::new(),
                        title.to_string(),
                        format!("body {i}"),
                        "real".to_string(),
                    )
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_index_selection() {
        let settings = SearchSettings::default();

        assert_eq!(
            Selection::Index(2)
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::Article(Article {
                text: "body 2".to_string(),
                index: Some(2),
            })
        );
        assert_eq!(
            Selection::Index(3)
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::OutOfRange(3)
        );
    }

    #[tokio::test]
    async fn test_search_selection() {
        let settings = SearchSettings::default();
        let select = |query: &str, choice| Selection::Search {
            query: query.to_string(),
            choice,
        };

        assert_eq!(
            select("us", 1)
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::Article(Article {
                text: "body 1".to_string(),
                index: Some(1),
            })
        );
        assert_eq!(
            select("input title", 0)
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::NoInput
        );
        assert_eq!(
            select("weather", 0)
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::NoMatches
        );
        assert_eq!(
            select("us", 2)
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::OutOfRange(2)
        );
    }

    #[test]
    fn test_choose_from_finished_search() {
        let settings = SearchSettings::default();
        let results = search("us", &dataset(), &settings.placeholder);

        assert_eq!(results.len(), 2);
        assert_eq!(
            choose(&results, 0, &settings),
            Resolution::Article(Article {
                text: "body 0".to_string(),
                index: Some(0),
            })
        );
        assert_eq!(choose(&results, 2, &settings), Resolution::OutOfRange(2));
        assert_eq!(
            choose(&Search::Matches(vec![]), 0, &settings),
            Resolution::NoMatches
        );
        assert_eq!(
            choose(&Search::NoInput, 0, &settings),
            Resolution::NoInput
        );
    }

    #[tokio::test]
    async fn test_choice_limited_to_selectable() {
        let settings = SearchSettings {
            max_selectable: 1,
            ..SearchSettings::default()
        };
        let selection = Selection::Search {
            query: "us".to_string(),
            choice: 1,
        };

        assert_eq!(
            selection
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::OutOfRange(1)
        );
    }

    #[tokio::test]
    async fn test_url_selection() {
        let settings = SearchSettings::default();
        let selection = Selection::Url("https://example.com/story".to_string());

        assert_eq!(
            selection
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::Unparseable
        );
        assert_eq!(
            Selection::Url("nonsense".to_string())
                .resolve(&dataset(), &settings, &Unimplemented)
                .await,
            Resolution::InvalidUrl
        );
        assert_eq!(
            selection
                .resolve(&dataset(), &settings, &Canned("The Senate PASSED the bill!"))
                .await,
            Resolution::Article(Article {
                text: "senate passed bill".to_string(),
                index: None,
            })
        );
    }
}
