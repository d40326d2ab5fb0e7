// Copyright 2019-present, the HuggingFace Inc. team, The Google AI Language Team and Facebook, Inc.
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

//! # Sequence classification pipeline (sentiment analysis, emotion detection)
//! Generic post-processing for sentence-level classifiers. The forward pass is delegated to a
//! `SequenceClassifier` backend supplied by the host (e.g. a wrapper around a Roberta
//! classifier), the pipeline turns the raw logits into class probabilities.
//!
//! ```no_run
//! use nlp_dashboard::pipelines::sequence_classification::{
//!     SequenceClassificationConfig, SequenceClassificationModel, SequenceClassifier,
//! };
//! use nlp_dashboard::resources::LocalResource;
//! use nlp_dashboard::DashboardError;
//! use std::path::PathBuf;
//!
//! struct ConstantClassifier;
//!
//! impl SequenceClassifier for ConstantClassifier {
//!     fn forward(&self, _input: &str) -> Result<Vec<Vec<f64>>, DashboardError> {
//!         Ok(vec![vec![0.1, 2.3, -1.0, 0.4]])
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SequenceClassificationConfig::new(LocalResource {
//!     local_path: PathBuf::from("path/to/config.json"),
//! });
//! let model = SequenceClassificationModel::new(config, Box::new(ConstantClassifier))?;
//! let output = model.predict("This is example text")?;
//! # Ok(())
//! # }
//! ```

use crate::common::error::DashboardError;
use crate::common::{Config, ModelConfig};
use crate::resources::ResourceProvider;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// # Capability interface to a pretrained sentence classifier
/// Implemented by the host around the actual model. Backends are built once at start-up and
/// shared by reference.
pub trait SequenceClassifier: Send + Sync {
    /// Runs the model on a text.
    ///
    /// # Returns
    ///
    /// * `Vec<Vec<f64>>` raw logits, one row per model input (long texts may be split into
    ///   several inputs), one column per class
    fn forward(&self, input: &str) -> Result<Vec<Vec<f64>>, DashboardError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// # Class probability returned by a `SequenceClassificationModel`
pub struct Label {
    /// Class name
    pub text: String,
    /// Predicted probability
    pub score: f64,
    /// Class index
    pub id: i64,
}

/// # Configuration for SequenceClassificationModel
pub struct SequenceClassificationConfig {
    /// Model configuration resource providing the `id2label` mapping
    pub config_resource: Box<dyn ResourceProvider + Send>,
    /// Class names overriding the configuration mapping, in class index order
    pub label_overrides: Option<Vec<String>>,
}

impl SequenceClassificationConfig {
    /// Instantiate a new sequence classification configuration.
    ///
    /// # Arguments
    ///
    /// * `config_resource` - The `ResourceProvider` pointing to the model configuration (e.g. config.json)
    pub fn new<R>(config_resource: R) -> SequenceClassificationConfig
    where
        R: ResourceProvider + Send + 'static,
    {
        SequenceClassificationConfig {
            config_resource: Box::new(config_resource),
            label_overrides: None,
        }
    }

    /// Replaces the class names read from the configuration file.
    pub fn with_labels<S: Into<String>>(mut self, labels: Vec<S>) -> Self {
        self.label_overrides = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    fn load_labels(&self) -> Result<Vec<String>, DashboardError> {
        let config_path = self.config_resource.get_local_path()?;
        let labels = ModelConfig::from_file(config_path)?.ordered_labels()?;
        match &self.label_overrides {
            None => Ok(labels),
            Some(overrides) if overrides.len() == labels.len() => Ok(overrides.clone()),
            Some(overrides) => Err(DashboardError::InvalidConfigurationError(format!(
                "Expected {} label overrides, got {}",
                labels.len(),
                overrides.len()
            ))),
        }
    }
}

/// Numerically stable softmax of a logits row.
pub(crate) fn softmax(logits: &[f64]) -> Vec<f64> {
    let max_logit = logits
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let exponentials = logits
        .iter()
        .map(|logit| (logit - max_logit).exp())
        .collect::<Vec<f64>>();
    let sum: f64 = exponentials.iter().sum();
    exponentials.into_iter().map(|value| value / sum).collect()
}

/// # SequenceClassificationModel for sentence-level classification
pub struct SequenceClassificationModel {
    classifier: Box<dyn SequenceClassifier>,
    labels: Vec<String>,
}

impl SequenceClassificationModel {
    /// Build a new `SequenceClassificationModel`
    ///
    /// # Arguments
    ///
    /// * `config` - `SequenceClassificationConfig` pointing to the model configuration
    /// * `classifier` - backend running the model forward pass
    pub fn new(
        config: SequenceClassificationConfig,
        classifier: Box<dyn SequenceClassifier>,
    ) -> Result<SequenceClassificationModel, DashboardError> {
        let labels = config.load_labels()?;
        Self::from_labels(labels, classifier)
    }

    /// Build a new `SequenceClassificationModel` from class names given in index order.
    pub fn from_labels<S: Into<String>>(
        labels: Vec<S>,
        classifier: Box<dyn SequenceClassifier>,
    ) -> Result<SequenceClassificationModel, DashboardError> {
        let labels = labels.into_iter().map(Into::into).collect::<Vec<String>>();
        if labels.is_empty() {
            return Err(DashboardError::InvalidConfigurationError(
                "A sequence classifier requires at least one label".to_string(),
            ));
        }
        info!(labels = ?labels, "Sequence classification model ready");
        Ok(SequenceClassificationModel { classifier, labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Classifies a text.
    ///
    /// Probabilities are computed per model input with a softmax, then averaged over the
    /// inputs.
    ///
    /// # Returns
    ///
    /// * `Vec<Label>` one entry per class, in class index order
    pub fn predict(&self, input: &str) -> Result<Vec<Label>, DashboardError> {
        let logits = self.classifier.forward(input)?;
        if logits.is_empty() {
            return Err(DashboardError::ValueError(
                "Classifier returned no output".to_string(),
            ));
        }
        let num_labels = self.labels.len();
        let mut mean_probabilities = vec![0f64; num_labels];
        for row in &logits {
            if row.len() != num_labels {
                return Err(DashboardError::ValueError(format!(
                    "Expected {num_labels} logits per row, got {}",
                    row.len()
                )));
            }
            for (mean, probability) in mean_probabilities.iter_mut().zip(softmax(row)) {
                *mean += probability / logits.len() as f64;
            }
        }
        debug!(rows = logits.len(), "Classified sequence");
        Ok(self
            .labels
            .iter()
            .zip(mean_probabilities)
            .enumerate()
            .map(|(id, (text, score))| Label {
                text: text.clone(),
                score,
                id: id as i64,
            })
            .collect())
    }

    /// Returns the most likely class for a text.
    pub fn predict_top(&self, input: &str) -> Result<Label, DashboardError> {
        self.predict(input)?
            .into_iter()
            .max_by_key(|label| OrderedFloat(label.score))
            .ok_or_else(|| DashboardError::ValueError("No label predicted".to_string()))
    }
}
