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

//! # Span annotation
//! Turns a text and a list of substrings of interest into an ordered, gap-filling list of
//! plain and highlighted segments, ready for inline rendering.
//!
//! The annotation runs in three steps:
//! 1. every literal occurrence of each keyword is located (`locate`)
//! 2. overlapping occurrences, or occurrences separated by a single character, are merged into
//!    maximal spans (`merge`)
//! 3. the text is sliced along the merged spans into `Segment`s (`segment`)
//!
//! ```no_run
//! use nlp_dashboard::pipelines::annotation::{AnnotationStyle, SpanAnnotator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let annotator = SpanAnnotator::new(AnnotationStyle::default());
//! let annotation = annotator.annotate("Cities like New York", &["New", "York"])?;
//! # Ok(())
//! # }
//! ```
//! Output: \
//! ```no_run
//! # use nlp_dashboard::pipelines::annotation::Segment;
//! # let output =
//! Some(vec![
//!     Segment::Plain(String::from("Cities like ")),
//!     Segment::Annotated {
//!         text: String::from("New York"),
//!         label: String::from("KEY"),
//!         color: String::from("#26aaef"),
//!     },
//! ])
//! # ;
//! ```
//!
//! All offsets are expressed in characters (Unicode scalar values), not in bytes.

use crate::common::error::DashboardError;
use rust_tokenizers::{Offset, OffsetSize};
use serde::{Deserialize, Serialize};
use std::cmp::{max, min};
use tracing::debug;

/// Label attached to highlighted keyword segments
pub const KEYWORD_LABEL: &str = "KEY";
/// Display color attached to highlighted keyword segments
pub const KEYWORD_COLOR: &str = "#26aaef";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// # Label and display color carried by highlighted segments
pub struct AnnotationStyle {
    /// Tag displayed next to the highlighted text (e.g. `KEY`, `ORG`, `NN`)
    pub label: String,
    /// Display color (CSS color code, may be empty to let the host pick one)
    pub color: String,
}

impl AnnotationStyle {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }
}

impl Default for AnnotationStyle {
    /// Keyword highlighting style (`KEY`, `#26aaef`)
    fn default() -> Self {
        Self::new(KEYWORD_LABEL, KEYWORD_COLOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
/// # Contiguous run of the annotated text
/// Plain segments serialize as bare strings, annotated segments as `{text, label, color}`.
pub enum Segment {
    /// Text without annotation
    Plain(String),
    /// Highlighted text
    Annotated {
        text: String,
        label: String,
        color: String,
    },
}

impl Segment {
    fn annotated(text: &str, style: &AnnotationStyle) -> Self {
        Segment::Annotated {
            text: text.to_string(),
            label: style.label.clone(),
            color: style.color.clone(),
        }
    }

    /// Text covered by the segment
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(text) => text.as_str(),
            Segment::Annotated { text, .. } => text.as_str(),
        }
    }

    /// Annotation label, `None` for plain segments
    pub fn label(&self) -> Option<&str> {
        match self {
            Segment::Plain(_) => None,
            Segment::Annotated { label, .. } => Some(label.as_str()),
        }
    }

    pub fn is_annotated(&self) -> bool {
        matches!(self, Segment::Annotated { .. })
    }
}

/// Concatenates the text of all segments, in order.
pub fn reconstruct(segments: &[Segment]) -> String {
    segments.iter().map(Segment::text).collect()
}

/// Char to byte position table for a text.
pub(crate) struct CharIndex<'a> {
    text: &'a str,
    byte_positions: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut byte_positions = text
            .char_indices()
            .map(|(position, _)| position)
            .collect::<Vec<usize>>();
        byte_positions.push(text.len());
        Self {
            text,
            byte_positions,
        }
    }

    pub(crate) fn char_len(&self) -> usize {
        self.byte_positions.len() - 1
    }

    /// Character index of a byte position lying on a char boundary
    pub(crate) fn char_position(&self, byte_position: usize) -> usize {
        match self.byte_positions.binary_search(&byte_position) {
            Ok(position) => position,
            Err(position) => position,
        }
    }

    pub(crate) fn slice(&self, begin: usize, end: usize) -> &'a str {
        &self.text[self.byte_positions[begin]..self.byte_positions[end]]
    }

    pub(crate) fn slice_offset(&self, offset: Offset) -> &'a str {
        let end = min(offset.end as usize, self.char_len());
        let begin = min(offset.begin as usize, end);
        self.slice(begin, end)
    }
}

/// Locates every literal occurrence of each keyword in the text.
///
/// Keywords are searched independently, left to right, with non-overlapping matches (the
/// search resumes at the end of the previous match). Occurrences of all keywords are pooled
/// in a single unsorted list. Empty keywords are skipped.
///
/// # Arguments
///
/// * `text` - text to search
/// * `keywords` - literal substrings to look for
///
/// # Returns
///
/// * `Vec<Offset>` character offsets of all occurrences
pub fn locate<S>(text: &str, keywords: &[S]) -> Vec<Offset>
where
    S: AsRef<str>,
{
    let index = CharIndex::new(text);
    let mut occurrences = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref();
        if keyword.is_empty() {
            debug!("Skipping empty keyword");
            continue;
        }
        let keyword_length = keyword.chars().count();
        for (byte_position, _) in text.match_indices(keyword) {
            let begin = index.char_position(byte_position);
            occurrences.push(Offset::new(
                begin as OffsetSize,
                (begin + keyword_length) as OffsetSize,
            ));
        }
    }
    occurrences
}

fn can_merge(top: &Offset, next: &Offset) -> bool {
    (top.begin <= next.begin && next.begin <= top.end) || top.end + 1 == next.begin
}

fn merge_pass(mut offsets: Vec<Offset>) -> Vec<Offset> {
    offsets.sort_by_key(|offset| (offset.begin, offset.end));
    let mut stack: Vec<Offset> = Vec::with_capacity(offsets.len());
    for offset in offsets {
        match stack.last_mut() {
            Some(top) if can_merge(top, &offset) => {
                top.end = max(top.end, offset.end);
            }
            _ => stack.push(offset),
        }
    }
    stack
}

/// Merges overlapping, touching or one-character-apart offsets into maximal spans.
///
/// Passes are repeated until the number of spans no longer decreases.
///
/// # Arguments
///
/// * `offsets` - occurrences to merge, in any order. Must not be empty.
///
/// # Returns
///
/// * `Vec<Offset>` merged spans, sorted by start and pairwise separated by at least two
///   characters
pub fn merge(offsets: Vec<Offset>) -> Result<Vec<Offset>, DashboardError> {
    if offsets.is_empty() {
        return Err(DashboardError::ValueError(
            "Cannot merge an empty list of offsets".to_string(),
        ));
    }
    let mut merged = merge_pass(offsets);
    let mut passes = 1;
    loop {
        let span_count = merged.len();
        merged = merge_pass(merged);
        passes += 1;
        if merged.len() == span_count {
            break;
        }
    }
    debug!(passes, spans = merged.len(), "Merged keyword occurrences");
    Ok(merged)
}

/// Slices a text along sorted, non-overlapping spans, highlighting every span with `style`.
pub fn segment(text: &str, spans: &[Offset], style: &AnnotationStyle) -> Vec<Segment> {
    build_segments(text, spans.iter().map(|span| (*span, style)))
}

/// Slices a text along sorted spans that each carry their own style.
///
/// Text between spans is emitted as plain segments, empty plain runs are omitted. Spans that
/// are empty or start before the end of the previous span are left out of the annotation.
pub fn build_segments<'s, I>(text: &str, spans: I) -> Vec<Segment>
where
    I: IntoIterator<Item = (Offset, &'s AnnotationStyle)>,
{
    let index = CharIndex::new(text);
    let text_length = index.char_len();
    let mut segments = Vec::new();
    let mut cursor = 0usize;
    for (span, style) in spans {
        let begin = span.begin as usize;
        let end = min(span.end as usize, text_length);
        if begin < cursor || begin >= end {
            debug!(begin, end, cursor, "Dropping empty or overlapping span");
            continue;
        }
        if begin > cursor {
            segments.push(Segment::Plain(index.slice(cursor, begin).to_string()));
        }
        segments.push(Segment::annotated(index.slice(begin, end), style));
        cursor = end;
    }
    if cursor < text_length {
        segments.push(Segment::Plain(index.slice(cursor, text_length).to_string()));
    }
    segments
}

/// # Keyword annotator
/// Runs the locate, merge and segment steps with a fixed annotation style.
#[derive(Debug, Clone, Default)]
pub struct SpanAnnotator {
    style: AnnotationStyle,
}

impl SpanAnnotator {
    /// Build a new `SpanAnnotator`
    ///
    /// # Arguments
    ///
    /// * `style` - `AnnotationStyle` attached to every highlighted segment
    pub fn new(style: AnnotationStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Annotates the keywords found in a text.
    ///
    /// # Arguments
    ///
    /// * `text` - text to annotate
    /// * `keywords` - literal substrings to highlight
    ///
    /// # Returns
    ///
    /// * `Some(Vec<Segment>)` reconstructing `text`, an empty list for an empty text
    /// * `None` if no keyword occurs in the text, the host should display the text as is
    pub fn annotate<S>(
        &self,
        text: &str,
        keywords: &[S],
    ) -> Result<Option<Vec<Segment>>, DashboardError>
    where
        S: AsRef<str>,
    {
        if text.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let occurrences = locate(text, keywords);
        if occurrences.is_empty() {
            debug!("No keyword occurrence found, skipping annotation");
            return Ok(None);
        }
        let spans = merge(occurrences)?;
        Ok(Some(segment(text, &spans, &self.style)))
    }

    /// Same as `annotate`, falling back to a single plain segment when nothing matches.
    pub fn annotate_or_plain<S>(
        &self,
        text: &str,
        keywords: &[S],
    ) -> Result<Vec<Segment>, DashboardError>
    where
        S: AsRef<str>,
    {
        Ok(self
            .annotate(text, keywords)?
            .unwrap_or_else(|| vec![Segment::Plain(text.to_string())]))
    }
}
