// Copyright 2019 Guillaume Becquin
// Copyright 2022 Jacob Miesner
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::common::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// # Utility to deserialize JSON configuration files
pub trait Config
where
    for<'de> Self: Deserialize<'de>,
{
    /// Loads a `Config` object from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - `Path` to the configuration JSON file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nlp_dashboard::common::ModelConfig;
    /// use nlp_dashboard::Config;
    /// use std::path::Path;
    ///
    /// let config_path = Path::new("path/to/config.json");
    /// let config = ModelConfig::from_file(config_path);
    /// ```
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let f = File::open(path.as_ref()).map_err(|e| {
            DashboardError::IOError(format!(
                "Could not open configuration file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let br = BufReader::new(f);
        let config: Self = serde_json::from_reader(br)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// # Subset of a pretrained model configuration relevant to the dashboard pipelines
/// Only the label mappings are read, all other fields of the model `config.json` are ignored.
pub struct ModelConfig {
    /// Mapping from class index to class name
    pub id2label: Option<HashMap<i64, String>>,
    /// Mapping from class name to class index
    pub label2id: Option<HashMap<String, i64>>,
}

impl Config for ModelConfig {}

impl ModelConfig {
    /// Returns the class names ordered by class index.
    ///
    /// Fails if no `id2label` mapping is present, if the indices are not contiguous from 0, or
    /// if a `label2id` mapping is present and disagrees with `id2label`.
    pub fn ordered_labels(&self) -> Result<Vec<String>, DashboardError> {
        let id2label = self.id2label.as_ref().ok_or_else(|| {
            DashboardError::InvalidConfigurationError(
                "No label dictionary (id2label) provided in configuration file".to_string(),
            )
        })?;
        let labels = (0..id2label.len() as i64)
            .map(|id| {
                id2label.get(&id).cloned().ok_or_else(|| {
                    DashboardError::InvalidConfigurationError(format!(
                        "Label mapping is missing class index {id}"
                    ))
                })
            })
            .collect::<Result<Vec<String>, DashboardError>>()?;
        if let Some(label2id) = &self.label2id {
            for (id, label) in labels.iter().enumerate() {
                if label2id.get(label) != Some(&(id as i64)) {
                    return Err(DashboardError::InvalidConfigurationError(format!(
                        "label2id does not map {label} to class index {id}"
                    )));
                }
            }
        }
        Ok(labels)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ordered_labels_follow_class_index() {
        let config: ModelConfig = serde_json::from_str(
            r#"{"id2label": {"1": "joy", "0": "anger", "3": "sadness", "2": "optimism"},
                "hidden_size": 768}"#,
        )
        .unwrap();
        assert_eq!(
            config.ordered_labels().unwrap(),
            vec!["anger", "joy", "optimism", "sadness"]
        );
    }

    #[test]
    fn ordered_labels_reject_gaps() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"id2label": {"0": "anger", "2": "joy"}}"#).unwrap();
        assert!(matches!(
            config.ordered_labels(),
            Err(DashboardError::InvalidConfigurationError(_))
        ));
    }

    #[test]
    fn inverse_mapping_is_cross_checked() {
        let config: ModelConfig = serde_json::from_str(
            r#"{"id2label": {"0": "NEGATIVE", "1": "POSITIVE"},
                "label2id": {"NEGATIVE": 0, "POSITIVE": 1}}"#,
        )
        .unwrap();
        assert_eq!(config.ordered_labels().unwrap(), vec!["NEGATIVE", "POSITIVE"]);

        let config: ModelConfig = serde_json::from_str(
            r#"{"id2label": {"0": "NEGATIVE", "1": "POSITIVE"},
                "label2id": {"NEGATIVE": 1, "POSITIVE": 0}}"#,
        )
        .unwrap();
        assert!(matches!(
            config.ordered_labels(),
            Err(DashboardError::InvalidConfigurationError(_))
        ));
    }

    #[test]
    fn missing_mapping_is_a_configuration_error() {
        let config = ModelConfig::default();
        assert!(config.ordered_labels().is_err());
    }
}
