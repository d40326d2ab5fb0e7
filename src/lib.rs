//! # NLP dashboard
//!
//! Task pipelines behind an open-source NLP dashboard: sentiment analysis, keyword extraction,
//! part of speech tagging, emotion detection and named entity recognition. Results are
//! returned as serializable structures, with annotated texts (`Segment` lists) ready for
//! inline highlighting.
//!
//! The classification pipelines wrap an injected model backend (`SequenceClassifier`,
//! `TokenClassifier`). Keyword extraction runs without any external model.
//!
//! ```no_run
//! use nlp_dashboard::pipelines::annotation::SpanAnnotator;
//!
//! # fn main() -> anyhow::Result<()> {
//! let annotator = SpanAnnotator::default();
//! let annotation = annotator.annotate("the quick fox", &["quick"])?;
//! # Ok(())
//! # }
//! ```
#[macro_use]
extern crate lazy_static;

pub mod common;
pub mod dashboard;
pub mod pipelines;

pub use common::error::DashboardError;
pub use common::{resources, Config};
