//! # Keyword extraction pipeline
//! Extracts the most representative words and phrases of a text and highlights them.
//! Candidate keywords are n-grams free of stop words, scored by the TextRank ranks of their
//! words. No external model is required.
//!
//! ```no_run
//! use nlp_dashboard::pipelines::keywords_extraction::{
//!     keywords_to_csv_string, KeywordExtractionModel,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let keyword_extraction_model = KeywordExtractionModel::new(Default::default())?;
//!
//! let input = "Rust compiler, Rust borrow checker and Rust macros.";
//!
//! let (annotation, keywords) = keyword_extraction_model.generate(input, 5)?;
//! let csv = keywords_to_csv_string(&keywords)?;
//! # Ok(())
//! # }
//! ```
//! Output: \
//! ```no_run
//! # let output =
//! vec!["Rust borrow checker", "Rust compiler", "Rust macros"]
//! # ;
//! ```
//!
//! A candidate scores the sum of the TextRank ranks of its words divided by the square root of
//! its length. Candidates overlapping an already selected keyword are skipped, so fewer than
//! the requested number of keywords may be returned.
mod pipeline;
mod scorer;
mod stopwords;
mod tokenizer;

pub use pipeline::{
    keywords_to_csv, keywords_to_csv_string, Keyword, KeywordExtractionConfig,
    KeywordExtractionModel, KeywordScorerType, KEYWORDS_CSV_HEADER, MAX_KEYWORDS_LIMIT,
    MAX_NGRAM_SIZE,
};
pub use scorer::TextRankParameters;
pub use tokenizer::StopWordsTokenizer;
