use std::path::Path;

use async_trait::async_trait;

/// The labeled news article dataset
pub mod news;

/// Title search over a loaded dataset
pub mod search;

pub use search::{search, Search};

/// A dataset which can be loaded from a file
#[async_trait]
pub trait LoadableDataset<I>: burn::data::dataset::Dataset<I> {
    /// Load the dataset
    async fn load(path: &Path) -> Result<Self, DatasetError>
    where
        Self: std::marker::Sized;
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The dataset file could not be read
    #[error("unable to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    /// A row could not be parsed
    #[error("malformed dataset row: {0}")]
    Csv(#[from] csv::Error),

    /// The dataset held no rows
    #[error("dataset {0} is empty")]
    Empty(String),
}
