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

//! # Named Entity Recognition pipeline
//! Extracts entities (Person, Location, Organization, Miscellaneous) from text. The token
//! classifier (e.g. an XLM-Roberta model finetuned on CoNLL-03) is injected as a
//! `TokenClassifier` backend. Consecutive tokens belonging to the same entity are grouped,
//! and the groups can be rendered as an annotated text.
//!
//! ```no_run
//! # use nlp_dashboard::pipelines::token_classification::{TokenClassifier, TokenLogits};
//! # use nlp_dashboard::DashboardError;
//! # struct XlmRobertaNer;
//! # impl TokenClassifier for XlmRobertaNer {
//! #     fn forward(&self, _input: &str) -> Result<Vec<TokenLogits>, DashboardError> {
//! #         Ok(vec![])
//! #     }
//! # }
//! use nlp_dashboard::pipelines::ner::NERModel;
//! use nlp_dashboard::pipelines::token_classification::{
//!     LabelAggregationOption, TokenClassificationModel,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let token_classification_model = TokenClassificationModel::from_labels(
//!     vec!["B-LOC", "B-MISC", "B-ORG", "I-LOC", "I-MISC", "I-ORG", "I-PER", "O"],
//!     Box::new(XlmRobertaNer),
//!     LabelAggregationOption::First,
//! )?;
//! let ner_model = NERModel::new(token_classification_model);
//! let text = "Organizations like Hugging Face and cities like New York";
//! let entities = ner_model.predict(text)?;
//! let annotation = ner_model.annotate(text, &entities);
//! # Ok(())
//! # }
//! ```
//! Output: \
//! ```no_run
//! # use nlp_dashboard::pipelines::ner::Entity;
//! # use rust_tokenizers::Offset;
//! # let output =
//! [
//!     Entity {
//!         word: String::from("Hugging Face"),
//!         score: 0.9965,
//!         label: String::from("ORG"),
//!         offset: Offset { begin: 19, end: 31 },
//!     },
//!     Entity {
//!         word: String::from("New York"),
//!         score: 0.9990,
//!         label: String::from("LOC"),
//!         offset: Offset { begin: 48, end: 56 },
//!     },
//! ]
//! # ;
//! ```

use crate::common::error::DashboardError;
use crate::pipelines::annotation::{build_segments, AnnotationStyle, CharIndex, Segment};
use crate::pipelines::token_classification::{Token, TokenClassificationModel};
use rust_tokenizers::Offset;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Entity words that are never highlighted
pub const DEFAULT_EXCLUDED_ENTITIES: [&str; 4] = ["", ".", ". ", " "];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// # Entity generated by a `NERModel`
pub struct Entity {
    /// String representation of the Entity
    pub word: String,
    /// Confidence score (mean of the grouped token scores)
    pub score: f64,
    /// Entity group (e.g. ORG, LOC, PER)
    pub label: String,
    /// Entity character offsets in the input
    pub offset: Offset,
}

/// Splits an IOB label into its prefix and entity type.
fn split_label(label: &str) -> (Option<char>, &str) {
    match label.split_once('-') {
        Some((prefix, entity_type)) if prefix == "B" || prefix == "I" => {
            (prefix.chars().next(), entity_type)
        }
        _ => (None, label),
    }
}

/// # NERModel to extract named entities
pub struct NERModel {
    token_classification_model: TokenClassificationModel,
    excluded_entities: Vec<String>,
}

impl NERModel {
    /// Build a new `NERModel`
    ///
    /// # Arguments
    ///
    /// * `token_classification_model` - token classification model with IOB labels
    pub fn new(token_classification_model: TokenClassificationModel) -> NERModel {
        NERModel {
            token_classification_model,
            excluded_entities: DEFAULT_EXCLUDED_ENTITIES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Replaces the list of entity words that are never highlighted.
    pub fn with_excluded_entities(mut self, excluded_entities: Vec<String>) -> NERModel {
        self.excluded_entities = excluded_entities;
        self
    }

    /// Extract grouped entities from a text
    ///
    /// Sub-tokens are grouped individually, so the entity score is the mean of the sub-token
    /// scores.
    ///
    /// # Returns
    ///
    /// * `Vec<Entity>` entities sorted by position
    pub fn predict(&self, input: &str) -> Result<Vec<Entity>, DashboardError> {
        let tokens = self.token_classification_model.predict(input, false, false)?;
        Ok(Self::group_entities(input, &tokens))
    }

    /// Groups consecutive tokens of the same entity type. A `B-` prefix always opens a new
    /// group, `O` tokens and tokens without offsets close the current group.
    pub fn group_entities(input: &str, tokens: &[Token]) -> Vec<Entity> {
        let index = CharIndex::new(input);
        let mut entities: Vec<Entity> = Vec::new();
        let mut current: Option<(String, Offset, Vec<f64>)> = None;

        let close = |group: Option<(String, Offset, Vec<f64>)>, entities: &mut Vec<Entity>| {
            if let Some((label, offset, scores)) = group {
                entities.push(Entity {
                    word: index.slice_offset(offset).to_string(),
                    score: scores.iter().sum::<f64>() / scores.len() as f64,
                    label,
                    offset,
                });
            }
        };

        for token in tokens {
            let (prefix, entity_type) = split_label(token.label.as_str());
            let offset = match token.offset {
                Some(offset) if entity_type != "O" => offset,
                _ => {
                    close(current.take(), &mut entities);
                    continue;
                }
            };
            let extends_group = matches!(
                &current,
                Some((label, _, _)) if label == entity_type && prefix != Some('B')
            );
            if extends_group {
                if let Some((_, group_offset, scores)) = current.as_mut() {
                    group_offset.end = offset.end;
                    scores.push(token.score);
                }
            } else {
                close(current.take(), &mut entities);
                current = Some((entity_type.to_string(), offset, vec![token.score]));
            }
        }
        close(current.take(), &mut entities);
        entities
    }

    /// Builds the annotated text for a set of entities
    ///
    /// # Arguments
    ///
    /// * `input` - text the entities were extracted from
    /// * `entities` - entities returned by `predict`
    ///
    /// # Returns
    ///
    /// * `Vec<Segment>` entity segments labelled with the entity group, plain text in between
    pub fn annotate(&self, input: &str, entities: &[Entity]) -> Vec<Segment> {
        let mut kept = entities
            .iter()
            .filter(|entity| {
                let excluded = self.excluded_entities.contains(&entity.word);
                if excluded {
                    debug!(word = %entity.word, "Excluding entity from annotation");
                }
                !excluded
            })
            .map(|entity| (entity.offset, AnnotationStyle::new(entity.label.as_str(), "")))
            .collect::<Vec<(Offset, AnnotationStyle)>>();
        kept.sort_by_key(|(offset, _)| (offset.begin, offset.end));
        build_segments(input, kept.iter().map(|(offset, style)| (*offset, style)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pipelines::token_classification::{
        LabelAggregationOption, TokenClassifier, TokenLogits,
    };
    use rust_tokenizers::Mask;

    fn token(label: &str, begin: u32, end: u32, score: f64) -> Token {
        Token {
            text: String::new(),
            score,
            label: label.to_string(),
            label_index: 0,
            index: 0,
            word_index: 0,
            offset: Some(Offset::new(begin, end)),
            mask: Mask::None,
        }
    }

    #[test]
    fn consecutive_tokens_are_grouped() {
        let text = "cities like New York and Paris";
        let tokens = vec![
            token("O", 0, 6, 0.9),
            token("B-LOC", 12, 15, 0.8),
            token("I-LOC", 16, 20, 1.0),
            token("O", 21, 24, 0.9),
            token("I-LOC", 25, 30, 0.7),
        ];
        let entities = NERModel::group_entities(text, &tokens);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].word, "New York");
        assert_eq!(entities[0].label, "LOC");
        assert!((entities[0].score - 0.9).abs() < 1e-9);
        assert_eq!(entities[1].word, "Paris");
    }

    #[test]
    fn begin_prefix_opens_new_group() {
        let text = "Amy Bob";
        let tokens = vec![token("B-PER", 0, 3, 0.9), token("B-PER", 4, 7, 0.9)];
        let entities = NERModel::group_entities(text, &tokens);
        assert_eq!(
            entities.iter().map(|e| e.word.as_str()).collect::<Vec<_>>(),
            vec!["Amy", "Bob"]
        );
    }

    struct SubTokenTagger;

    impl TokenClassifier for SubTokenTagger {
        fn forward(&self, _input: &str) -> Result<Vec<TokenLogits>, DashboardError> {
            let token = |text: &str, begin, end, mask, logits: Vec<f64>| TokenLogits {
                text: text.to_string(),
                offset: Some(Offset::new(begin, end)),
                mask,
                logits,
            };
            Ok(vec![
                token("Hug", 0, 3, Mask::None, vec![0.0, 4.0, 0.0]),
                token("ging", 3, 7, Mask::Continuation, vec![0.0, 0.0, 4.0]),
                token("Face", 8, 12, Mask::None, vec![0.0, 0.0, 4.0]),
                token("rocks", 13, 18, Mask::None, vec![4.0, 0.0, 0.0]),
            ])
        }
    }

    #[test]
    fn entity_score_is_mean_of_sub_token_scores() {
        let model = NERModel::new(
            TokenClassificationModel::from_labels(
                vec!["O", "B-ORG", "I-ORG"],
                Box::new(SubTokenTagger),
                LabelAggregationOption::First,
            )
            .unwrap(),
        );
        let entities = model.predict("Hugging Face rocks").unwrap();
        let token_score = 4f64.exp() / (4f64.exp() + 2.0);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].word, "Hugging Face");
        assert_eq!(entities[0].label, "ORG");
        assert_eq!(
            (entities[0].offset.begin, entities[0].offset.end),
            (0, 12)
        );
        assert!((entities[0].score - token_score).abs() < 1e-9);
    }

    #[test]
    fn split_label_handles_plain_labels() {
        assert_eq!(split_label("B-ORG"), (Some('B'), "ORG"));
        assert_eq!(split_label("O"), (None, "O"));
        assert_eq!(split_label("PER"), (None, "PER"));
    }
}
