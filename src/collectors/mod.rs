//! Collaborators that fetch article text from outside the dataset

use async_trait::async_trait;
use url::Url;

/// The result of fetching an article
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fetched {
    /// The article body, as raw text
    Article(String),

    /// The page was fetched but no article could be extracted from it
    Unparseable,

    /// The input was not a usable URL
    InvalidUrl,
}

/// Fetches the body of a news article from a URL
#[async_trait]
pub trait ArticleCollector: Send + Sync {
    /// Fetch and extract the article at `url`
    async fn fetch(&self, url: &str) -> Fetched;
}

/// Parse a URL, accepting only absolute http(s) URLs with a host
pub fn parse_article_url(input: &str) -> Option<Url> {
    let url = Url::parse(input.trim()).ok()?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

/// A collector that validates URLs but has no extraction backend, so every valid URL is
/// reported as unparseable
#[derive(Clone, Copy, Debug, Default)]
pub struct Unimplemented;

#[async_trait]
impl ArticleCollector for Unimplemented {
    async fn fetch(&self, url: &str) -> Fetched {
        match parse_article_url(url) {
            Some(url) => {
                log::warn!("Article extraction is not available for {}", url);

                Fetched::Unparseable
            }
            None => Fetched::InvalidUrl,
        }
    }
}
