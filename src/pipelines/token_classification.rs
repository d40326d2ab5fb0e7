// Copyright 2019-present, the HuggingFace Inc. team, The Google AI Language Team and Facebook, Inc.
// Copyright 2019-2020 Guillaume Becquin
// Copyright 2020 Maarten van Gompel
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

//! # Token classification pipeline (Named Entity Recognition, Part-of-Speech tagging)
//! Generic post-processing for token-level classifiers. The tokenization and forward pass are
//! delegated to a `TokenClassifier` backend supplied by the host, which returns one set of
//! logits per (sub-)token together with its character offsets in the input. The pipeline
//! turns the logits into labelled `Token`s and optionally consolidates sub-tokens into words.
//!
//! ```no_run
//! use nlp_dashboard::pipelines::token_classification::{
//!     LabelAggregationOption, TokenClassificationModel, TokenClassifier, TokenLogits,
//! };
//! use nlp_dashboard::DashboardError;
//! use rust_tokenizers::{Mask, Offset};
//!
//! struct Backend;
//!
//! impl TokenClassifier for Backend {
//!     fn forward(&self, input: &str) -> Result<Vec<TokenLogits>, DashboardError> {
//!         Ok(vec![TokenLogits {
//!             text: input.to_string(),
//!             offset: Some(Offset::new(0, input.chars().count() as u32)),
//!             mask: Mask::None,
//!             logits: vec![0.1, 3.2],
//!         }])
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let model = TokenClassificationModel::from_labels(
//!     vec!["O", "B-LOC"],
//!     Box::new(Backend),
//!     LabelAggregationOption::First,
//! )?;
//! let output = model.predict("Paris", true, false)?;
//! # Ok(())
//! # }
//! ```

use crate::common::error::DashboardError;
use crate::common::{Config, ModelConfig};
use crate::pipelines::sequence_classification::softmax;
use crate::resources::ResourceProvider;
use ordered_float::OrderedFloat;
use rust_tokenizers::{ConsolidatableTokens, ConsolidatedTokenIterator, Mask, Offset, TokenTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// # Capability interface to a pretrained token classifier
/// Implemented by the host around the actual model and its tokenizer.
pub trait TokenClassifier: Send + Sync {
    /// Tokenizes a text and runs the model on it.
    ///
    /// # Returns
    ///
    /// * `Vec<TokenLogits>` one entry per token, in input order
    fn forward(&self, input: &str) -> Result<Vec<TokenLogits>, DashboardError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// # Raw model output for a single token
pub struct TokenLogits {
    /// String representation of the token
    pub text: String,
    /// Character offsets of the token in the input, `None` for special tokens
    pub offset: Option<Offset>,
    /// Token category (`Mask::Continuation` for sub-tokens, `Mask::Special` for special tokens)
    pub mask: Mask,
    /// Logits, one per class
    pub logits: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// # Token generated by a `TokenClassificationModel`
pub struct Token {
    /// String representation of the Token
    pub text: String,
    /// Confidence score
    pub score: f64,
    /// Token label (e.g. ORG, LOC in case of NER)
    pub label: String,
    /// Label index
    pub label_index: i64,
    /// Token position index
    pub index: u16,
    /// Token word position index
    pub word_index: u16,
    /// Token offsets
    pub offset: Option<Offset>,
    /// Token mask
    pub mask: Mask,
}

impl TokenTrait for Token {
    fn offset(&self) -> Option<Offset> {
        self.offset
    }

    fn mask(&self) -> Mask {
        self.mask
    }

    fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

impl ConsolidatableTokens<Token> for Vec<Token> {
    fn iter_consolidate_tokens(&self) -> ConsolidatedTokenIterator<'_, Token> {
        ConsolidatedTokenIterator::new(self)
    }
}

type LabelAggregationFunction = Box<fn(&[Token]) -> (i64, String)>;

/// # Enum defining the label aggregation method for sub tokens
/// Defines the behaviour for labels aggregation if the consolidation of sub-tokens is enabled.
pub enum LabelAggregationOption {
    /// The label of the first sub token is assigned to the entire token
    First,
    /// The label of the last sub token is assigned to the entire token
    Last,
    /// The most frequent sub- token is  assigned to the entire token
    Mode,
    /// The user can provide a function mapping a `&[Token]` to a `(i64, String)` tuple corresponding to the label index, label String to return
    Custom(LabelAggregationFunction),
}

/// # Configuration for TokenClassificationModel
pub struct TokenClassificationConfig {
    /// Model configuration resource providing the `id2label` mapping
    pub config_resource: Box<dyn ResourceProvider + Send>,
    /// Sub-tokens aggregation method (default: `LabelAggregationOption::First`)
    pub label_aggregation_function: LabelAggregationOption,
}

impl TokenClassificationConfig {
    /// Instantiate a new token classification configuration.
    ///
    /// # Arguments
    ///
    /// * `config_resource` - The `ResourceProvider` pointing to the model configuration (e.g. config.json)
    /// * `label_aggregation_function` - Sub-tokens aggregation method
    pub fn new<R>(
        config_resource: R,
        label_aggregation_function: LabelAggregationOption,
    ) -> TokenClassificationConfig
    where
        R: ResourceProvider + Send + 'static,
    {
        TokenClassificationConfig {
            config_resource: Box::new(config_resource),
            label_aggregation_function,
        }
    }
}

/// # TokenClassificationModel for Named Entity Recognition or Part-of-Speech tagging
pub struct TokenClassificationModel {
    classifier: Box<dyn TokenClassifier>,
    labels: Vec<String>,
    label_aggregation_function: LabelAggregationOption,
}

impl TokenClassificationModel {
    /// Build a new `TokenClassificationModel`
    ///
    /// # Arguments
    ///
    /// * `config` - `TokenClassificationConfig` pointing to the model configuration
    /// * `classifier` - backend running the tokenization and forward pass
    pub fn new(
        config: TokenClassificationConfig,
        classifier: Box<dyn TokenClassifier>,
    ) -> Result<TokenClassificationModel, DashboardError> {
        let config_path = config.config_resource.get_local_path()?;
        let labels = ModelConfig::from_file(config_path)?.ordered_labels()?;
        Self::from_labels(labels, classifier, config.label_aggregation_function)
    }

    /// Build a new `TokenClassificationModel` from class names given in index order.
    pub fn from_labels<S: Into<String>>(
        labels: Vec<S>,
        classifier: Box<dyn TokenClassifier>,
        label_aggregation_function: LabelAggregationOption,
    ) -> Result<TokenClassificationModel, DashboardError> {
        let labels = labels.into_iter().map(Into::into).collect::<Vec<String>>();
        if labels.is_empty() {
            return Err(DashboardError::InvalidConfigurationError(
                "A token classifier requires at least one label".to_string(),
            ));
        }
        info!(num_labels = labels.len(), "Token classification model ready");
        Ok(TokenClassificationModel {
            classifier,
            labels,
            label_aggregation_function,
        })
    }

    /// Classify tokens in a text
    ///
    /// # Arguments
    ///
    /// * `input` - text to classify
    /// * `consolidate_sub_tokens` - bool flag indicating if subtokens should be consolidated at the token level
    /// * `return_special` - bool flag indicating if labels for special tokens should be returned
    ///
    /// # Returns
    ///
    /// * `Vec<Token>` containing Tokens with associated labels (for example POS tags)
    pub fn predict(
        &self,
        input: &str,
        consolidate_sub_tokens: bool,
        return_special: bool,
    ) -> Result<Vec<Token>, DashboardError> {
        let token_logits = self.classifier.forward(input)?;
        let mut tokens = Vec::with_capacity(token_logits.len());
        let mut word_idx: u16 = 0;
        for (position_idx, token_logits) in token_logits.into_iter().enumerate() {
            if (token_logits.mask == Mask::Special) & (!return_special) {
                continue;
            }
            if !(token_logits.mask == Mask::Continuation) {
                word_idx += 1;
            }
            tokens.push(self.decode_token(token_logits, position_idx as u16, word_idx)?);
        }

        if consolidate_sub_tokens {
            self.consolidate_tokens(&mut tokens, &self.label_aggregation_function);
        }
        Ok(tokens)
    }

    fn decode_token(
        &self,
        token_logits: TokenLogits,
        index: u16,
        word_index: u16,
    ) -> Result<Token, DashboardError> {
        if token_logits.logits.len() != self.labels.len() {
            return Err(DashboardError::ValueError(format!(
                "Expected {} logits for token {:?}, got {}",
                self.labels.len(),
                token_logits.text,
                token_logits.logits.len()
            )));
        }
        let scores = softmax(&token_logits.logits);
        let (label_index, score) = scores
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|&(_, score)| OrderedFloat(score))
            .ok_or_else(|| DashboardError::ValueError("Empty token logits".to_string()))?;

        Ok(Token {
            text: token_logits.text,
            score,
            label: self.labels[label_index].clone(),
            label_index: label_index as i64,
            index,
            word_index,
            offset: token_logits.offset,
            mask: token_logits.mask,
        })
    }

    fn consolidate_tokens(
        &self,
        sequence_tokens: &mut Vec<Token>,
        label_aggregation_function: &LabelAggregationOption,
    ) {
        let mut tokens_to_replace = vec![];
        let token_iter = sequence_tokens.iter_consolidate_tokens();
        let mut cursor = 0;

        for sub_tokens in token_iter {
            if sub_tokens.len() > 1 {
                let (label_index, label) =
                    self.consolidate_labels(sub_tokens, label_aggregation_function);
                let first = &sub_tokens[0];
                let offset = match (
                    first.offset,
                    sub_tokens[sub_tokens.len() - 1].offset,
                ) {
                    (Some(start), Some(end)) => Some(Offset::new(start.begin, end.end)),
                    _ => None,
                };
                let mut text = String::new();
                let mut score = 1f64;
                for current_sub_token in sub_tokens.iter() {
                    text.push_str(current_sub_token.text.as_str());
                    score *= if current_sub_token.label_index == label_index {
                        current_sub_token.score
                    } else {
                        1.0 - current_sub_token.score
                    };
                }
                let token = Token {
                    text,
                    score,
                    label,
                    label_index,
                    index: first.index,
                    word_index: first.word_index,
                    offset,
                    mask: Default::default(),
                };
                tokens_to_replace.push(((cursor, cursor + sub_tokens.len()), token));
            }
            cursor += sub_tokens.len();
        }
        for ((start, end), token) in tokens_to_replace.into_iter().rev() {
            sequence_tokens.splice(start..end, [token]);
        }
    }

    fn consolidate_labels(
        &self,
        tokens: &[Token],
        aggregation: &LabelAggregationOption,
    ) -> (i64, String) {
        match aggregation {
            LabelAggregationOption::First => {
                let token = &tokens[0];
                (token.label_index, token.label.clone())
            }
            LabelAggregationOption::Last => {
                let token = &tokens[tokens.len() - 1];
                (token.label_index, token.label.clone())
            }
            LabelAggregationOption::Mode => {
                let counts = tokens.iter().fold(HashMap::new(), |mut m, c| {
                    let (ref mut count, ref mut score) = m
                        .entry((c.label_index, c.label.as_str()))
                        .or_insert((0, 0.0_f64));
                    *count += 1;
                    *score = score.max(c.score);
                    m
                });
                counts
                    .into_iter()
                    .max_by_key(|&(_, (count, score))| (count, OrderedFloat(score)))
                    .map(|((label_index, label), _)| (label_index, label.to_owned()))
                    .unwrap_or((tokens[0].label_index, tokens[0].label.clone()))
            }
            LabelAggregationOption::Custom(function) => function(tokens),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct SubTokenClassifier;

    impl TokenClassifier for SubTokenClassifier {
        fn forward(&self, _input: &str) -> Result<Vec<TokenLogits>, DashboardError> {
            let token = |text: &str, begin, end, mask, logits: Vec<f64>| TokenLogits {
                text: text.to_string(),
                offset: Some(Offset::new(begin, end)),
                mask,
                logits,
            };
            Ok(vec![
                TokenLogits {
                    text: "<s>".to_string(),
                    offset: None,
                    mask: Mask::Special,
                    logits: vec![5.0, 0.0],
                },
                token("Hug", 0, 3, Mask::None, vec![0.0, 4.0]),
                token("ging", 3, 7, Mask::Continuation, vec![4.0, 0.0]),
                token("Face", 8, 12, Mask::None, vec![0.0, 4.0]),
            ])
        }
    }

    fn model(aggregation: LabelAggregationOption) -> TokenClassificationModel {
        TokenClassificationModel::from_labels(
            vec!["O", "I-ORG"],
            Box::new(SubTokenClassifier),
            aggregation,
        )
        .unwrap()
    }

    #[test]
    fn special_tokens_are_skipped() {
        let tokens = model(LabelAggregationOption::First)
            .predict("Hugging Face", false, false)
            .unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "Hug");
        assert_eq!(tokens[0].label, "I-ORG");
        assert_eq!(tokens[1].label, "O");
    }

    #[test]
    fn sub_tokens_are_consolidated() {
        let tokens = model(LabelAggregationOption::First)
            .predict("Hugging Face", true, false)
            .unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "Hugging");
        assert_eq!(tokens[0].label, "I-ORG");
        let offset = tokens[0].offset.unwrap();
        assert_eq!((offset.begin, offset.end), (0, 7));

        let tokens = model(LabelAggregationOption::Last)
            .predict("Hugging Face", true, false)
            .unwrap();
        assert_eq!(tokens[0].label, "O");
    }
}
