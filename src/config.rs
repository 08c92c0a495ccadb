use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    datasets::{news, search},
    explain,
};

/// Inference service settings, read from an optional YAML file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The dataset file articles are selected from
    pub dataset_path: PathBuf,

    /// The directory holding the label encoder and pipeline artifacts
    pub artifact_dir: PathBuf,

    /// Title search options
    pub search: SearchSettings,

    /// Explanation options
    pub explanation: explain::Settings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: Path::new("data").join(news::DEFAULT_FILE),
            artifact_dir: PathBuf::from("model"),
            search: SearchSettings::default(),
            explanation: explain::Settings::default(),
        }
    }
}

/// Title search options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Query text that counts as no input
    pub placeholder: String,

    /// How many matches are offered for selection
    pub max_selectable: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            placeholder: search::DEFAULT_PLACEHOLDER.to_string(),
            max_selectable: 5,
        }
    }
}

impl Settings {
    /// Parse settings from YAML, filling missing fields with defaults
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let yaml = tokio::fs::read_to_string(path).await?;

        Self::from_yaml(&yaml)
    }
}

/// Settings Error
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read
    #[error("unable to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid YAML for these settings
    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() -> Result<(), SettingsError> {
        let settings = Settings::from_yaml(
            "
artifact_dir: artifacts
search:
  max_selectable: 3
explanation:
  num_samples: 250
",
        )?;

        assert_eq!(settings.artifact_dir, PathBuf::from("artifacts"));
        assert_eq!(settings.dataset_path, Path::new("data").join(news::DEFAULT_FILE));
        assert_eq!(settings.search.max_selectable, 3);
        assert_eq!(settings.search.placeholder, "input title");
        assert_eq!(settings.explanation.num_samples, 250);
        assert_eq!(settings.explanation.num_features, 10);

        Ok(())
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Settings::from_yaml("search: [1, 2"),
            Err(SettingsError::Yaml(_))
        ));
    }
}
