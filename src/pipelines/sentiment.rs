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

//! # Sentiment Analysis pipeline
//! Predicts the probability of a negative, neutral or positive sentiment for a text. The model
//! (e.g. a Twitter Roberta model finetuned for sentiment) is provided as a
//! `SequenceClassifier` backend with three output classes, whose generic `LABEL_0`..`LABEL_2`
//! names are replaced by the sentiment polarities.
//!
//! ```no_run
//! # use nlp_dashboard::pipelines::sequence_classification::SequenceClassifier;
//! # use nlp_dashboard::DashboardError;
//! # struct RobertaSentiment;
//! # impl SequenceClassifier for RobertaSentiment {
//! #     fn forward(&self, _input: &str) -> Result<Vec<Vec<f64>>, DashboardError> {
//! #         Ok(vec![vec![-1.5, 0.2, 2.1]])
//! #     }
//! # }
//! use nlp_dashboard::pipelines::sentiment::SentimentModel;
//!
//! # fn main() -> anyhow::Result<()> {
//! let sentiment_model = SentimentModel::new(Box::new(RobertaSentiment))?;
//! let output = sentiment_model.predict("All while portraying an upbeat attitude.")?;
//! # Ok(())
//! # }
//! ```
//! Output: \
//! ```no_run
//! # use nlp_dashboard::pipelines::sentiment::Sentiment;
//! # use nlp_dashboard::pipelines::sentiment::SentimentPolarity::{Negative, Neutral, Positive};
//! # let output =
//! [
//!     Sentiment { polarity: Negative, score: 0.021 },
//!     Sentiment { polarity: Neutral, score: 0.125 },
//!     Sentiment { polarity: Positive, score: 0.854 },
//! ]
//! # ;
//! ```

use crate::common::error::DashboardError;
use crate::pipelines::sequence_classification::{SequenceClassificationModel, SequenceClassifier};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Enum with the possible sentiment polarities, in the class order of the model.
pub enum SentimentPolarity {
    Negative,
    Neutral,
    Positive,
}

impl SentimentPolarity {
    pub const ALL: [SentimentPolarity; 3] = [
        SentimentPolarity::Negative,
        SentimentPolarity::Neutral,
        SentimentPolarity::Positive,
    ];
}

impl fmt::Display for SentimentPolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentPolarity::Negative => "Negative",
            SentimentPolarity::Neutral => "Neutral",
            SentimentPolarity::Positive => "Positive",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Sentiment returned by the model.
pub struct Sentiment {
    /// Polarity of the sentiment
    pub polarity: SentimentPolarity,
    /// Predicted probability
    pub score: f64,
}

/// # SentimentModel to perform sentiment analysis
pub struct SentimentModel {
    sequence_classification_model: SequenceClassificationModel,
}

impl SentimentModel {
    /// Build a new `SentimentModel`
    ///
    /// # Arguments
    ///
    /// * `classifier` - three-class sentiment backend (negative, neutral, positive)
    pub fn new(classifier: Box<dyn SequenceClassifier>) -> Result<SentimentModel, DashboardError> {
        let labels = SentimentPolarity::ALL
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>();
        let sequence_classification_model =
            SequenceClassificationModel::from_labels(labels, classifier)?;
        Ok(SentimentModel {
            sequence_classification_model,
        })
    }

    /// Predicts the sentiment probabilities of a text
    ///
    /// # Returns
    /// * `Vec<Sentiment>` one entry per polarity, ordered negative, neutral, positive
    pub fn predict(&self, input: &str) -> Result<Vec<Sentiment>, DashboardError> {
        Ok(self
            .sequence_classification_model
            .predict(input)?
            .into_iter()
            .zip(SentimentPolarity::ALL)
            .map(|(label, polarity)| Sentiment {
                polarity,
                score: label.score,
            })
            .collect())
    }

    /// Returns the most likely sentiment of a text
    pub fn predict_top(&self, input: &str) -> Result<Sentiment, DashboardError> {
        self.predict(input)?
            .into_iter()
            .max_by_key(|sentiment| OrderedFloat(sentiment.score))
            .ok_or_else(|| DashboardError::ValueError("No sentiment predicted".to_string()))
    }
}
