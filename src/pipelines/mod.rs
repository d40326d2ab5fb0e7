//! # Ready-to-use NLP pipelines
//!
//! The following tasks are available, each in its own module:
//!
//! #### 1. Sentiment Analysis
//! Negative, neutral or positive polarity of a text, from a 3-class sequence classifier
//! (e.g. a RoBERTa model finetuned on tweets). See `sentiment`.
//!
//! #### 2. Keyword Extraction
//! Stop-word free n-grams ranked with TextRank, highlighted in the input text and exportable as
//! CSV. No external model is needed. See `keywords_extraction`.
//!
//! #### 3. Part of Speech Tagging
//! One Penn Treebank tag per word, from a token classifier. See `pos_tagging`.
//!
//! #### 4. Emotion Detection
//! Probability of each emotion class (labels read from the model `config.json`). See `emotion`.
//!
//! #### 5. Named Entity Recognition
//! Person, location, organization and miscellaneous entities, grouped from IOB token labels.
//! See `ner`.
//!
//! Annotated texts are built by the span annotator in `annotation`: keyword occurrences are
//! located, overlapping or almost adjacent occurrences merged, and the text split into plain
//! and highlighted `Segment`s.

pub mod annotation;
pub mod emotion;
pub mod keywords_extraction;
pub mod ner;
pub mod pos_tagging;
pub mod sentiment;
pub mod sequence_classification;
pub mod token_classification;
