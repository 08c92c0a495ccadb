use std::path::Path;

use async_trait::async_trait;
use burn::data::dataset::{self, Dataset as _, InMemDataset};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{pipelines::text_classification, utils::files};

use super::{DatasetError, LoadableDataset};

/// The name of the news dataset
pub static DATASET: &str = "news";

/// The default dataset file, relative to the data directory
pub static DEFAULT_FILE: &str = "clean_data.csv.gz";

/// One labeled news article
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Item {
    /// The original article title
    #[serde(alias = "title", default)]
    pub raw_title: String,

    /// The original article body
    #[serde(alias = "text", default)]
    pub raw_text: String,

    /// The lowercased, punctuation-free title used for search
    pub cleaned_title: String,

    /// The normalized body used as classifier input
    pub cleaned_text: String,

    /// The normalized body with stopwords removed, when the dataset provides it
    #[serde(default)]
    #[new(default)]
    pub no_stop_text: Option<String>,

    /// The class name of the article ("fake" or "real")
    pub label: String,
}

impl text_classification::Item for Item {
    fn input(&self) -> &str {
        match self.no_stop_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => &self.cleaned_text,
        }
    }

    fn class_label(&self) -> &str {
        &self.label
    }
}

/// Struct for the news dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,
}

/// Implement the Dataset trait for the news dataset
impl dataset::Dataset<Item> for Dataset {
    /// Returns a specific item from the dataset
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    /// Returns the length of the dataset
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

#[async_trait]
impl LoadableDataset<Item> for Dataset {
    async fn load(path: &Path) -> Result<Self, DatasetError> {
        Dataset::load(path).await
    }
}

impl Dataset {
    /// Build the dataset from already-parsed items
    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            dataset: InMemDataset::new(items),
        }
    }

    /// Load the dataset from a CSV file with a header row, plain or gzip-compressed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let bytes = files::read_maybe_compressed(path).await?;

        let items = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice())
            .deserialize::<Item>()
            .collect::<Result<Vec<_>, _>>()?;

        if items.is_empty() {
            return Err(DatasetError::Empty(path.display().to_string()));
        }

        log::info!("Loaded {} articles from {}", items.len(), path.display());

        Ok(Self::from_items(items))
    }

    /// Iterate over `(row index, item)` pairs in dataset order
    pub fn rows(&self) -> impl Iterator<Item = (usize, Item)> + '_ {
        (0..self.len()).filter_map(|index| self.get(index).map(|item| (index, item)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::pipelines::text_classification::Item as _;

    use super::*;

    const CSV: &str = "\
title,text,cleaned_title,cleaned_text,no_stop_text,label
Shutdown Looms,The US government...,us government shutdown looms,us government shutdown looms,,real
Scandal!,Fans were shocked...,celebrity scandal,breaking celebrity scandal shocks fans,breaking celebrity scandal shocks fans,fake
";

    #[tokio::test]
    async fn test_load_csv() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("clean_data.csv");
        tokio::fs::write(&path, CSV).await?;

        let dataset = Dataset::load(&path).await?;

        assert_eq!(dataset.len(), 2);

        let first = dataset.get(0).expect("first row");
        assert_eq!(first.raw_title, "Shutdown Looms");
        assert_eq!(first.cleaned_title, "us government shutdown looms");
        assert_eq!(first.label, "real");
        // An empty stopword-free column falls back to the cleaned text
        assert_eq!(first.input(), "us government shutdown looms");

        let second = dataset.get(1).expect("second row");
        assert_eq!(second.class_label(), "fake");

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_dataset_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty.csv");
        tokio::fs::write(&path, "cleaned_title,cleaned_text,label\n").await?;

        let result = Dataset::load(&path).await;

        assert!(matches!(result, Err(DatasetError::Empty(_))));

        Ok(())
    }
}
