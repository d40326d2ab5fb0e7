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

use crate::pipelines::keywords_extraction::tokenizer::Word;
use crate::pipelines::keywords_extraction::KeywordScorerType;
use std::collections::HashMap;
use tracing::debug;

/// Co-occurrence window of the TextRank word graph
pub const DEFAULT_WINDOW_SIZE: usize = 2;
/// Damping factor of the TextRank iteration
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.85;
/// Convergence tolerance of the TextRank iteration
pub const DEFAULT_TOLERANCE: f64 = 0.00005;
/// Upper bound on the number of TextRank iterations
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Parameters of the TextRank word ranking
pub struct TextRankParameters {
    pub window_size: usize,
    pub damping_factor: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for TextRankParameters {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl KeywordScorerType {
    /// Scores every content word of a document.
    ///
    /// Words are compared lower-cased, stop words are left out of the ranking.
    pub(crate) fn score_words(
        &self,
        words: &[Word],
        parameters: &TextRankParameters,
    ) -> HashMap<String, f64> {
        let content_words = words
            .iter()
            .filter(|word| !word.is_stopword)
            .map(|word| word.text.to_lowercase())
            .collect::<Vec<String>>();
        match self {
            KeywordScorerType::TextRank => text_rank_score(&content_words, parameters),
            KeywordScorerType::TermFrequency => term_frequency_score(&content_words),
        }
    }
}

fn term_frequency_score(words: &[String]) -> HashMap<String, f64> {
    let mut counts: HashMap<String, f64> = HashMap::new();
    for word in words {
        *counts.entry(word.clone()).or_insert(0.0) += 1.0;
    }
    let total = words.len() as f64;
    counts.values_mut().for_each(|count| *count /= total);
    counts
}

fn text_rank_score(words: &[String], parameters: &TextRankParameters) -> HashMap<String, f64> {
    let mut vocabulary: Vec<&str> = Vec::new();
    let mut node_ids: HashMap<&str, usize> = HashMap::new();
    let sequence = words
        .iter()
        .map(|word| {
            *node_ids.entry(word.as_str()).or_insert_with(|| {
                vocabulary.push(word.as_str());
                vocabulary.len() - 1
            })
        })
        .collect::<Vec<usize>>();

    let num_nodes = vocabulary.len();
    let mut edges: Vec<HashMap<usize, f64>> = vec![HashMap::new(); num_nodes];
    let window_size = parameters.window_size.max(2);
    for (position, &source) in sequence.iter().enumerate() {
        for &target in sequence.iter().skip(position + 1).take(window_size - 1) {
            if source != target {
                *edges[source].entry(target).or_insert(0.0) += 1.0;
                *edges[target].entry(source).or_insert(0.0) += 1.0;
            }
        }
    }
    let out_weights = edges
        .iter()
        .map(|neighbours| neighbours.values().sum::<f64>())
        .collect::<Vec<f64>>();

    let damping = parameters.damping_factor;
    let mut scores = vec![1.0f64; num_nodes];
    let mut iterations = 0;
    while iterations < parameters.max_iterations {
        iterations += 1;
        let updated = (0..num_nodes)
            .map(|node| {
                let incoming = edges[node]
                    .iter()
                    .map(|(&neighbour, weight)| weight / out_weights[neighbour] * scores[neighbour])
                    .sum::<f64>();
                (1.0 - damping) + damping * incoming
            })
            .collect::<Vec<f64>>();
        let delta = updated
            .iter()
            .zip(scores.iter())
            .map(|(new, old)| (new - old).abs())
            .fold(0f64, f64::max);
        scores = updated;
        if delta < parameters.tolerance {
            break;
        }
    }
    debug!(nodes = num_nodes, iterations, "TextRank converged");

    vocabulary
        .into_iter()
        .map(str::to_string)
        .zip(scores)
        .collect()
}
