// Copyright 2019-present, the HuggingFace Inc. team, The Google AI Language Team and Facebook, Inc.
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

//! # Part Of Speech pipeline
//! Extracts Penn Treebank Part of Speech tags (NN, VBZ, JJ...) from text. The tagger is
//! injected as a `TokenClassifier` backend, sub-tokens are consolidated into words.
//!
//! ```no_run
//! # use nlp_dashboard::pipelines::token_classification::{TokenClassifier, TokenLogits};
//! # use nlp_dashboard::DashboardError;
//! # struct MobileBertPos;
//! # impl TokenClassifier for MobileBertPos {
//! #     fn forward(&self, _input: &str) -> Result<Vec<TokenLogits>, DashboardError> {
//! #         Ok(vec![])
//! #     }
//! # }
//! use nlp_dashboard::pipelines::pos_tagging::POSModel;
//! use nlp_dashboard::pipelines::token_classification::{
//!     LabelAggregationOption, TokenClassificationModel,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let token_classification_model = TokenClassificationModel::from_labels(
//!     vec!["NN", "PRP", "VBZ", "NNP", "."],
//!     Box::new(MobileBertPos),
//!     LabelAggregationOption::First,
//! )?;
//! let pos_model = POSModel::new(token_classification_model);
//! let output = pos_model.predict("My name is Amélie.")?;
//! # Ok(())
//! # }
//! ```
//! Output: \
//! ```no_run
//! # use nlp_dashboard::pipelines::pos_tagging::POSTag;
//! # use rust_tokenizers::Offset;
//! # let output =
//! [
//!     POSTag {
//!         word: String::from("My"),
//!         score: 0.2465,
//!         label: String::from("PRP"),
//!         offset: Some(Offset { begin: 0, end: 2 }),
//!     },
//!     POSTag {
//!         word: String::from("name"),
//!         score: 0.8551,
//!         label: String::from("NN"),
//!         offset: Some(Offset { begin: 3, end: 7 }),
//!     },
//!     // ...
//!     POSTag {
//!         word: String::from("."),
//!         score: 1.0,
//!         label: String::from("."),
//!         offset: Some(Offset { begin: 17, end: 18 }),
//!     },
//! ]
//! # ;
//! ```

use crate::common::error::DashboardError;
use crate::pipelines::annotation::{build_segments, AnnotationStyle, Segment};
use crate::pipelines::token_classification::{Token, TokenClassificationModel};
use rust_tokenizers::Offset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// # Part of Speech tag
pub struct POSTag {
    /// String representation of the word
    pub word: String,
    /// Confidence score
    pub score: f64,
    /// Part-of-speech label (e.g. NN, VB...)
    pub label: String,
    /// Word character offsets in the input
    pub offset: Option<Offset>,
}

/// # POSModel to extract Part of Speech tags
pub struct POSModel {
    token_classification_model: TokenClassificationModel,
}

impl POSModel {
    /// Build a new `POSModel`
    ///
    /// # Arguments
    ///
    /// * `token_classification_model` - token classification model with Part of Speech labels
    pub fn new(token_classification_model: TokenClassificationModel) -> POSModel {
        POSModel {
            token_classification_model,
        }
    }

    /// Extract Part of Speech tags from a text
    ///
    /// Punctuation predicted with a low confidence is tagged `.` with a score of 1.
    ///
    /// # Returns
    ///
    /// * `Vec<POSTag>` one tag per word
    pub fn predict(&self, input: &str) -> Result<Vec<POSTag>, DashboardError> {
        Ok(self
            .token_classification_model
            .predict(input, true, false)?
            .into_iter()
            .map(Self::fix_punctuation)
            .map(|token| POSTag {
                word: token.text,
                score: token.score,
                label: token.label,
                offset: token.offset,
            })
            .collect::<Vec<POSTag>>())
    }

    fn fix_punctuation(mut token: Token) -> Token {
        if (Self::is_punctuation(token.text.as_str()))
            & ((token.score < 0.5) | token.score.is_nan())
        {
            token.label = String::from(".");
            token.score = 1f64;
        };
        token
    }

    fn is_punctuation(string: &str) -> bool {
        string.chars().all(|c| c.is_ascii_punctuation())
    }

    /// Builds the annotated text for a set of tags, every word highlighted with its tag.
    pub fn annotate(&self, input: &str, tags: &[POSTag]) -> Vec<Segment> {
        let mut spans = tags
            .iter()
            .filter_map(|tag| {
                tag.offset
                    .map(|offset| (offset, AnnotationStyle::new(tag.label.as_str(), "")))
            })
            .collect::<Vec<(Offset, AnnotationStyle)>>();
        spans.sort_by_key(|(offset, _)| (offset.begin, offset.end));
        build_segments(input, spans.iter().map(|(offset, style)| (*offset, style)))
    }
}
