use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A bijection between class names and integer class ids.
///
/// Classes are the sorted distinct labels seen while fitting, and a class id is the position of
/// its name in that order. Ids are only meaningful for the encoder that produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder on a column of labels
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Result<Self, LabelError> {
        let classes: BTreeSet<&str> = labels.iter().map(AsRef::as_ref).collect();

        if classes.is_empty() {
            return Err(LabelError::Empty);
        }

        Ok(Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        })
    }

    /// Fit an encoder and encode the same column in one pass
    pub fn fit_transform<S: AsRef<str>>(labels: &[S]) -> Result<(Self, Vec<usize>), LabelError> {
        let encoder = Self::fit(labels)?;
        let ids = encoder.transform(labels)?;

        Ok((encoder, ids))
    }

    /// Check that the fitted classes are exactly the expected ones
    pub fn expect_classes<S: AsRef<str>>(&self, expected: &[S]) -> Result<(), LabelError> {
        let expected: BTreeSet<&str> = expected.iter().map(AsRef::as_ref).collect();
        let found: BTreeSet<&str> = self.classes.iter().map(String::as_str).collect();

        if expected != found {
            return Err(LabelError::UnexpectedClasses {
                expected: expected.into_iter().map(str::to_string).collect(),
                found: self.classes.clone(),
            });
        }

        Ok(())
    }

    /// Encode one class name
    pub fn encode(&self, label: &str) -> Result<usize, LabelError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| LabelError::UnknownLabel(label.to_string()))
    }

    /// Encode a column of class names
    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, LabelError> {
        labels
            .iter()
            .map(|label| self.encode(label.as_ref()))
            .collect()
    }

    /// Decode one class id
    pub fn decode(&self, id: usize) -> Result<&str, LabelError> {
        self.classes
            .get(id)
            .map(String::as_str)
            .ok_or(LabelError::UnknownId(id))
    }

    /// Class names ordered by class id
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Label Error
#[derive(thiserror::Error, Debug)]
pub enum LabelError {
    /// No labels were given to fit on
    #[error("cannot fit a label encoder on an empty column")]
    Empty,

    /// The class name was not seen while fitting
    #[error("unknown label {0:?}")]
    UnknownLabel(String),

    /// The class id has no class name
    #[error("unknown class id {0}")]
    UnknownId(usize),

    /// The label column held different classes than expected
    #[error("expected classes {expected:?}, found {found:?}")]
    UnexpectedClasses {
        /// The classes that were expected
        expected: Vec<String>,
        /// The classes that were fitted
        found: Vec<String>,
    },
}
