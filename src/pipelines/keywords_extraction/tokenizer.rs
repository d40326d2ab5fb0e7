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

use crate::pipelines::annotation::CharIndex;
use crate::pipelines::keywords_extraction::stopwords::ENGLISH_STOPWORDS;
use regex::Regex;
use rust_tokenizers::{Offset, OffsetSize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

pub(crate) const DEFAULT_REGEX_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Word matched by the tokenizer pattern
#[derive(Debug, Clone)]
pub(crate) struct Word<'b> {
    pub(crate) text: &'b str,
    pub(crate) offset: Offset,
    pub(crate) is_stopword: bool,
    byte_start: usize,
    byte_end: usize,
}

pub struct StopWordsTokenizer<'a> {
    stopwords: HashSet<&'a str>,
    pattern: Regex,
    do_lower_case: bool,
}

impl<'a> StopWordsTokenizer<'a> {
    pub fn new(
        stopwords: Option<HashSet<&'a str>>,
        pattern: Option<Regex>,
        do_lower_case: bool,
    ) -> Self {
        let stopwords =
            stopwords.unwrap_or_else(|| ENGLISH_STOPWORDS.iter().copied().collect());
        let pattern = pattern.unwrap_or_else(|| DEFAULT_PATTERN.clone());

        Self {
            stopwords,
            pattern,
            do_lower_case,
        }
    }

    pub(crate) fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word.to_lowercase().as_str())
    }

    pub(crate) fn normalize<'b>(&self, text: &'b str) -> Cow<'b, str> {
        if self.do_lower_case {
            Cow::from(text.to_lowercase())
        } else {
            Cow::from(text)
        }
    }

    /// Words of a text in order, with their character offsets.
    pub(crate) fn words<'b>(&self, text: &'b str) -> Vec<Word<'b>> {
        let index = CharIndex::new(text);
        self.pattern
            .find_iter(text)
            .map(|hit| Word {
                text: hit.as_str(),
                offset: Offset::new(
                    index.char_position(hit.start()) as OffsetSize,
                    index.char_position(hit.end()) as OffsetSize,
                ),
                is_stopword: self.is_stopword(hit.as_str()),
                byte_start: hit.start(),
                byte_end: hit.end(),
            })
            .collect()
    }

    /// Candidate keywords of a text: n-grams without stop words whose words are separated by
    /// a single whitespace character.
    ///
    /// # Returns
    ///
    /// * `HashMap` from the candidate (normalized) text to all its occurrences
    pub fn tokenize<'b>(
        &self,
        text: &'b str,
        ngram_range: (usize, usize),
    ) -> HashMap<Cow<'b, str>, Vec<Offset>> {
        let mut tokenized_text = HashMap::new();
        let words = self.words(text);

        for ngram_size in ngram_range.0.max(1)..ngram_range.1 + 1 {
            'ngram_loop: for ngram in words.windows(ngram_size) {
                if ngram.iter().any(|word| word.is_stopword) {
                    continue;
                }
                for pair in ngram.windows(2) {
                    let separator = &text[pair[0].byte_end..pair[1].byte_start];
                    let mut separator_chars = separator.chars();
                    match (separator_chars.next(), separator_chars.next()) {
                        (Some(c), None) if c.is_whitespace() => {}
                        _ => continue 'ngram_loop,
                    }
                }
                let (first, last) = (&ngram[0], &ngram[ngram.len() - 1]);
                let pos = Offset::new(first.offset.begin, last.offset.end);
                let ngram_text = self.normalize(&text[first.byte_start..last.byte_end]);
                tokenized_text
                    .entry(ngram_text)
                    .and_modify(|pos_vec: &mut Vec<Offset>| pos_vec.push(pos))
                    .or_insert_with(|| vec![pos]);
            }
        }
        tokenized_text
    }
}

lazy_static! {
    static ref DEFAULT_PATTERN: Regex = Regex::new(DEFAULT_REGEX_PATTERN).unwrap();
}
