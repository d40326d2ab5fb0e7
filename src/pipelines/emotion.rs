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

//! # Emotion detection pipeline
//! Predicts the probability of each emotion class (e.g. anger, joy, optimism, sadness) for a
//! text. Class names are read from the `id2label` mapping of the model configuration file.
//!
//! ```no_run
//! # use nlp_dashboard::pipelines::sequence_classification::SequenceClassifier;
//! # use nlp_dashboard::DashboardError;
//! # struct RobertaEmotion;
//! # impl SequenceClassifier for RobertaEmotion {
//! #     fn forward(&self, _input: &str) -> Result<Vec<Vec<f64>>, DashboardError> {
//! #         Ok(vec![vec![-0.5, 2.2, 1.1, -1.3]])
//! #     }
//! # }
//! use nlp_dashboard::pipelines::emotion::EmotionModel;
//! use nlp_dashboard::pipelines::sequence_classification::SequenceClassificationConfig;
//! use nlp_dashboard::resources::LocalResource;
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SequenceClassificationConfig::new(LocalResource {
//!     local_path: PathBuf::from("path/to/twitter-roberta-base-emotion/config.json"),
//! });
//! let emotion_model = EmotionModel::new(config, Box::new(RobertaEmotion))?;
//! let output = emotion_model.predict("What a lovely day")?;
//! # Ok(())
//! # }
//! ```

use crate::common::error::DashboardError;
use crate::pipelines::sequence_classification::{
    SequenceClassificationConfig, SequenceClassificationModel, SequenceClassifier,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Emotion probability returned by the model.
pub struct Emotion {
    /// Emotion class name
    pub label: String,
    /// Predicted probability
    pub score: f64,
}

pub type EmotionConfig = SequenceClassificationConfig;

/// # EmotionModel to detect emotions in text
pub struct EmotionModel {
    sequence_classification_model: SequenceClassificationModel,
}

impl EmotionModel {
    /// Build a new `EmotionModel`
    ///
    /// # Arguments
    ///
    /// * `emotion_config` - `EmotionConfig` pointing to the model configuration holding the class names
    /// * `classifier` - emotion classification backend
    pub fn new(
        emotion_config: EmotionConfig,
        classifier: Box<dyn SequenceClassifier>,
    ) -> Result<EmotionModel, DashboardError> {
        let sequence_classification_model =
            SequenceClassificationModel::new(emotion_config, classifier)?;
        Ok(EmotionModel {
            sequence_classification_model,
        })
    }

    /// Build a new `EmotionModel` with class names given in index order.
    pub fn from_labels<S: Into<String>>(
        labels: Vec<S>,
        classifier: Box<dyn SequenceClassifier>,
    ) -> Result<EmotionModel, DashboardError> {
        Ok(EmotionModel {
            sequence_classification_model: SequenceClassificationModel::from_labels(
                labels, classifier,
            )?,
        })
    }

    /// Predicts the emotion probabilities of a text, in class index order
    pub fn predict(&self, input: &str) -> Result<Vec<Emotion>, DashboardError> {
        Ok(self
            .sequence_classification_model
            .predict(input)?
            .into_iter()
            .map(|label| Emotion {
                label: label.text,
                score: label.score,
            })
            .collect())
    }

    /// Returns the most likely emotion of a text
    pub fn predict_top(&self, input: &str) -> Result<Emotion, DashboardError> {
        let label = self.sequence_classification_model.predict_top(input)?;
        Ok(Emotion {
            label: label.text,
            score: label.score,
        })
    }
}
