// Copyright 2022 Guillaume Becquin
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
use crate::pipelines::annotation::{AnnotationStyle, CharIndex, Segment, SpanAnnotator};
use crate::pipelines::keywords_extraction::scorer::TextRankParameters;
use crate::pipelines::keywords_extraction::tokenizer::StopWordsTokenizer;
use regex::Regex;
use rust_tokenizers::Offset;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info};

/// Largest number of keywords the dashboard extracts at once
pub const MAX_KEYWORDS_LIMIT: usize = 10;
/// Header of the keywords CSV export
pub const KEYWORDS_CSV_HEADER: &str = "Extracted Keywords";
/// Longest keyword candidate, in words
pub const MAX_NGRAM_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// # Keyword extracted by a `KeywordExtractionModel`
pub struct Keyword {
    /// Keyword text (lower-cased if the tokenizer lower-cases)
    pub text: String,
    /// Sum of the ranks of the keyword words, divided by the square root of its word count
    pub score: f32,
    /// Character offsets of every occurrence of the keyword
    pub offsets: Vec<Offset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// # Word ranking used to score keyword candidates
pub enum KeywordScorerType {
    /// Graph-based ranking over the word co-occurrence graph
    TextRank,
    /// Relative frequency of the word in the document
    TermFrequency,
}

/// # Configuration for keyword extraction
pub struct KeywordExtractionConfig<'a> {
    /// Stop words (never part of a keyword), defaults to an English list
    pub tokenizer_stopwords: Option<HashSet<&'a str>>,
    /// Word pattern, defaults to `(?u)\b\w\w+\b`
    pub tokenizer_pattern: Option<Regex>,
    /// Lower-case candidates before grouping their occurrences
    pub tokenizer_forced_lowercase: bool,
    /// Inclusive range of candidate lengths, in words
    pub ngram_range: (usize, usize),
    pub scorer_type: KeywordScorerType,
    pub text_rank_parameters: TextRankParameters,
    /// Number of keywords returned by `predict`
    pub num_keywords: usize,
    /// Style of the highlighted keywords returned by `generate`
    pub annotation_style: AnnotationStyle,
}

impl Default for KeywordExtractionConfig<'_> {
    fn default() -> Self {
        Self {
            tokenizer_stopwords: None,
            tokenizer_pattern: None,
            tokenizer_forced_lowercase: false,
            ngram_range: (1, 3),
            scorer_type: KeywordScorerType::TextRank,
            text_rank_parameters: TextRankParameters::default(),
            num_keywords: 5,
            annotation_style: AnnotationStyle::default(),
        }
    }
}

/// # KeywordExtractionModel to extract and highlight keywords
pub struct KeywordExtractionModel<'a> {
    tokenizer: StopWordsTokenizer<'a>,
    scorer_type: KeywordScorerType,
    text_rank_parameters: TextRankParameters,
    ngram_range: (usize, usize),
    num_keywords: usize,
    annotator: SpanAnnotator,
}

impl<'a> KeywordExtractionModel<'a> {
    /// Build a new `KeywordExtractionModel`
    ///
    /// # Arguments
    ///
    /// * `config` - `KeywordExtractionConfig` object containing the tokenizer and scorer options
    pub fn new(
        config: KeywordExtractionConfig<'a>,
    ) -> Result<KeywordExtractionModel<'a>, DashboardError> {
        let (min_ngram, max_ngram) = config.ngram_range;
        if min_ngram == 0 || min_ngram > max_ngram || max_ngram > MAX_NGRAM_SIZE {
            return Err(DashboardError::InvalidConfigurationError(format!(
                "Invalid n-gram range ({min_ngram}, {max_ngram}), expected \
                 1 <= min <= max <= {MAX_NGRAM_SIZE}"
            )));
        }
        info!(
            scorer = ?config.scorer_type,
            ngram_range = ?config.ngram_range,
            "Building keyword extraction model"
        );
        let tokenizer = StopWordsTokenizer::new(
            config.tokenizer_stopwords,
            config.tokenizer_pattern,
            config.tokenizer_forced_lowercase,
        );
        Ok(Self {
            tokenizer,
            scorer_type: config.scorer_type,
            text_rank_parameters: config.text_rank_parameters,
            ngram_range: config.ngram_range,
            num_keywords: config.num_keywords,
            annotator: SpanAnnotator::new(config.annotation_style),
        })
    }

    /// Extracts the configured number of keywords from a text
    ///
    /// # Returns
    ///
    /// * `Vec<Keyword>` keywords, highest score first
    pub fn predict(&self, text: &str) -> Result<Vec<Keyword>, DashboardError> {
        self.extract(text, self.num_keywords)
    }

    /// Extracts up to `num_keywords` keywords from a text.
    ///
    /// A candidate scores the sum of its word ranks divided by the square root of its length.
    /// Candidates are sorted by decreasing score, ties broken by position then text. A
    /// candidate with an occurrence overlapping an occurrence of a selected keyword is skipped.
    pub fn extract(&self, text: &str, num_keywords: usize) -> Result<Vec<Keyword>, DashboardError> {
        let words = self.tokenizer.words(text);
        let word_scores = self
            .scorer_type
            .score_words(&words, &self.text_rank_parameters);

        let mut candidates = self
            .tokenizer
            .tokenize(text, self.ngram_range)
            .into_iter()
            .map(|(candidate, offsets)| {
                let (rank_sum, length) = candidate.split_whitespace().fold(
                    (0f64, 0usize),
                    |(rank_sum, length), word| {
                        let rank = word_scores.get(&word.to_lowercase()).copied();
                        (rank_sum + rank.unwrap_or(0.0), length + 1)
                    },
                );
                let score = rank_sum / (length.max(1) as f64).sqrt();
                (candidate, offsets, score)
            })
            .collect::<Vec<_>>();
        candidates.sort_by(|(text_a, offsets_a, score_a), (text_b, offsets_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| first_position(offsets_a).cmp(&first_position(offsets_b)))
                .then_with(|| text_a.cmp(text_b))
        });
        debug!(candidates = candidates.len(), "Scored keyword candidates");

        let mut keywords: Vec<Keyword> = Vec::with_capacity(num_keywords);
        for (candidate, offsets, score) in candidates {
            if keywords.len() >= num_keywords {
                break;
            }
            if keywords
                .iter()
                .any(|keyword| overlaps(&keyword.offsets, &offsets))
            {
                continue;
            }
            keywords.push(Keyword {
                text: candidate.into_owned(),
                score: score as f32,
                offsets,
            });
        }
        Ok(keywords)
    }

    /// Extracts keywords and highlights them in the text.
    ///
    /// # Arguments
    ///
    /// * `text` - text to analyze
    /// * `max_keywords` - number of keywords to extract, between 1 and `MAX_KEYWORDS_LIMIT`
    ///
    /// # Returns
    ///
    /// * `Option<Vec<Segment>>` annotated text, `None` if no keyword was found
    /// * `Vec<String>` keywords as they appear in the text (first occurrence)
    pub fn generate(
        &self,
        text: &str,
        max_keywords: usize,
    ) -> Result<(Option<Vec<Segment>>, Vec<String>), DashboardError> {
        if !(1..=MAX_KEYWORDS_LIMIT).contains(&max_keywords) {
            return Err(DashboardError::ValueError(format!(
                "Number of keywords must be between 1 and {MAX_KEYWORDS_LIMIT}, got {max_keywords}"
            )));
        }
        let index = CharIndex::new(text);
        let keywords = self
            .extract(text, max_keywords)?
            .into_iter()
            .map(|keyword| match keyword.offsets.first() {
                Some(offset) => index.slice_offset(*offset).to_string(),
                None => keyword.text,
            })
            .collect::<Vec<String>>();
        let annotation = self.annotator.annotate(text, &keywords)?;
        Ok((annotation, keywords))
    }
}

fn first_position(offsets: &[Offset]) -> (u32, u32) {
    offsets
        .first()
        .map(|offset| (offset.begin, offset.end))
        .unwrap_or((u32::MAX, u32::MAX))
}

fn overlaps(selected: &[Offset], candidate: &[Offset]) -> bool {
    selected.iter().any(|a| {
        candidate
            .iter()
            .any(|b| a.begin < b.end && b.begin < a.end)
    })
}

/// Writes keywords as a single-column CSV table with a `Extracted Keywords` header.
pub fn keywords_to_csv<S, W>(keywords: &[S], writer: W) -> Result<(), DashboardError>
where
    S: AsRef<str>,
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([KEYWORDS_CSV_HEADER])?;
    for keyword in keywords {
        csv_writer.write_record([keyword.as_ref()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Same as `keywords_to_csv`, returning the table as a string.
pub fn keywords_to_csv_string<S>(keywords: &[S]) -> Result<String, DashboardError>
where
    S: AsRef<str>,
{
    let mut buffer = Vec::new();
    keywords_to_csv(keywords, &mut buffer)?;
    String::from_utf8(buffer).map_err(|error| DashboardError::CsvError(error.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    const TEXT: &str = "Rust is a systems programming language. Rust programs are fast, \
                        and the Rust compiler checks memory safety at compile time.";

    #[test]
    fn invalid_ngram_range_is_rejected() {
        let config = KeywordExtractionConfig {
            ngram_range: (2, 1),
            ..Default::default()
        };
        assert!(matches!(
            KeywordExtractionModel::new(config),
            Err(DashboardError::InvalidConfigurationError(_))
        ));
    }

    #[test]
    fn ngram_range_is_bounded() {
        let config = KeywordExtractionConfig {
            ngram_range: (1, usize::MAX),
            ..Default::default()
        };
        assert!(matches!(
            KeywordExtractionModel::new(config),
            Err(DashboardError::InvalidConfigurationError(_))
        ));
    }

    #[test]
    fn selected_keywords_never_overlap() -> anyhow::Result<()> {
        let model = KeywordExtractionModel::new(Default::default())?;
        let keywords = model.extract(TEXT, 5)?;
        assert_eq!(keywords.len(), 5);
        assert!(keywords.windows(2).all(|pair| pair[0].score >= pair[1].score));
        for (position, keyword) in keywords.iter().enumerate() {
            for other in keywords.iter().take(position) {
                assert!(!overlaps(&other.offsets, &keyword.offsets));
            }
        }
        Ok(())
    }

    #[test]
    fn overlapping_offsets() {
        let selected = [Offset::new(0, 4), Offset::new(10, 14)];
        assert!(overlaps(&selected, &[Offset::new(12, 20)]));
        assert!(!overlaps(&selected, &[Offset::new(4, 10)]));
    }

    #[test]
    fn generate_highlights_keywords() -> anyhow::Result<()> {
        let model = KeywordExtractionModel::new(Default::default())?;
        let (annotation, keywords) = model.generate(TEXT, 2)?;
        assert_eq!(keywords.len(), 2);
        let annotation = annotation.unwrap();
        assert!(annotation.iter().any(Segment::is_annotated));
        assert_eq!(crate::pipelines::annotation::reconstruct(&annotation), TEXT);
        Ok(())
    }

    #[test]
    fn generate_bounds_keyword_count() -> anyhow::Result<()> {
        let model = KeywordExtractionModel::new(Default::default())?;
        assert!(matches!(
            model.generate(TEXT, 0),
            Err(DashboardError::ValueError(_))
        ));
        assert!(matches!(
            model.generate(TEXT, MAX_KEYWORDS_LIMIT + 1),
            Err(DashboardError::ValueError(_))
        ));
        Ok(())
    }

    #[test]
    fn stop_words_only_text_has_no_keywords() -> anyhow::Result<()> {
        let model = KeywordExtractionModel::new(Default::default())?;
        let (annotation, keywords) = model.generate("it is what it is", 5)?;
        assert!(keywords.is_empty());
        assert!(annotation.is_none());
        Ok(())
    }

    #[test]
    fn csv_export_has_header() -> anyhow::Result<()> {
        let csv = keywords_to_csv_string(&["rust", "memory safety"])?;
        assert_eq!(csv, "Extracted Keywords\nrust\nmemory safety\n");
        Ok(())
    }
}
