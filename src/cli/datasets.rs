use std::fmt::Display;

use crate::datasets::news;

/// The Dataset enum
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Dataset {
    /// Labelled fake and real news articles
    News,
}

impl Dataset {
    /// The file loaded from the data directory when none is given
    pub fn default_file(&self) -> &'static str {
        match self {
            Dataset::News => news::DEFAULT_FILE,
        }
    }
}

impl TryFrom<&str> for Dataset {
    type Error = DatasetError;

    /// Try to convert a string to a Dataset
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.to_lowercase() == news::DATASET {
            Ok(Dataset::News)
        } else {
            Err(Self::Error::Unknown(value.to_string()))
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dataset::News => news::DATASET,
        };

        write!(f, "{}", name)
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// No dataset found for the given string
    #[error("no dataset found for {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_dataset() {
        assert_eq!(Dataset::try_from("News").ok(), Some(Dataset::News));
        assert_eq!(Dataset::News.to_string(), "news");
        assert_eq!(Dataset::News.default_file(), "clean_data.csv.gz");
        assert!(matches!(
            Dataset::try_from("tweets"),
            Err(DatasetError::Unknown(name)) if name == "tweets"
        ));
    }
}
