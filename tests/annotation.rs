use nlp_dashboard::pipelines::annotation::{
    locate, merge, reconstruct, segment, AnnotationStyle, Segment, SpanAnnotator,
};
use nlp_dashboard::DashboardError;
use proptest::prelude::*;
use rust_tokenizers::Offset;

fn ranges(offsets: &[Offset]) -> Vec<(u32, u32)> {
    offsets.iter().map(|o| (o.begin, o.end)).collect()
}

fn keyword(text: &str) -> Segment {
    Segment::Annotated {
        text: text.to_string(),
        label: "KEY".to_string(),
        color: "#26aaef".to_string(),
    }
}

#[test]
fn single_keyword() -> anyhow::Result<()> {
    let annotator = SpanAnnotator::default();
    let annotation = annotator.annotate("the quick fox", &["quick"])?;
    assert_eq!(
        annotation,
        Some(vec![
            Segment::Plain("the ".to_string()),
            keyword("quick"),
            Segment::Plain(" fox".to_string()),
        ])
    );
    Ok(())
}

#[test]
fn no_match_returns_sentinel() -> anyhow::Result<()> {
    let annotator = SpanAnnotator::default();
    assert_eq!(annotator.annotate("hello world", &["xyz"])?, None);
    assert_eq!(
        annotator.annotate_or_plain("hello world", &["xyz"])?,
        vec![Segment::Plain("hello world".to_string())]
    );
    Ok(())
}

#[test]
fn adjacent_keywords_form_one_span() -> anyhow::Result<()> {
    let spans = merge(locate("New York", &["New", "York"]))?;
    assert_eq!(ranges(&spans), vec![(0, 8)]);

    let annotation = SpanAnnotator::default().annotate("New York", &["York", "New"])?;
    assert_eq!(annotation, Some(vec![keyword("New York")]));
    Ok(())
}

#[test]
fn multibyte_separator_merges() -> anyhow::Result<()> {
    let spans = merge(locate("New🙂York", &["New", "York"]))?;
    assert_eq!(ranges(&spans), vec![(0, 8)]);

    let annotation = SpanAnnotator::default().annotate("New🙂York", &["New", "York"])?;
    assert_eq!(annotation, Some(vec![keyword("New🙂York")]));
    Ok(())
}

#[test]
fn non_ascii_text_is_segmented_on_characters() -> anyhow::Result<()> {
    let annotation = SpanAnnotator::default().annotate("Amélie lives in Paris", &["Paris"])?;
    assert_eq!(
        annotation,
        Some(vec![
            Segment::Plain("Amélie lives in ".to_string()),
            keyword("Paris"),
        ])
    );
    Ok(())
}

#[test]
fn overlapping_ranges_merge() -> anyhow::Result<()> {
    let spans = merge(vec![Offset::new(2, 6), Offset::new(4, 9)])?;
    assert_eq!(ranges(&spans), vec![(2, 9)]);
    Ok(())
}

#[test]
fn empty_merge_is_rejected() {
    assert!(matches!(merge(vec![]), Err(DashboardError::ValueError(_))));
}

#[test]
fn repeated_keyword_occurrences_are_all_highlighted() -> anyhow::Result<()> {
    let text = "Rust is fast. I like Rust.";
    let annotation = SpanAnnotator::default()
        .annotate(text, &["Rust"])?
        .unwrap();
    assert_eq!(annotation.iter().filter(|s| s.is_annotated()).count(), 2);
    assert_eq!(reconstruct(&annotation), text);
    Ok(())
}

#[test]
fn custom_style_is_carried() {
    let style = AnnotationStyle::new("ORG", "#faa");
    let segments = segment("Hugging Face rocks", &[Offset::new(0, 12)], &style);
    assert_eq!(
        segments[0],
        Segment::Annotated {
            text: "Hugging Face".to_string(),
            label: "ORG".to_string(),
            color: "#faa".to_string(),
        }
    );
}

#[test]
fn segments_serialize_for_rendering() -> anyhow::Result<()> {
    let annotation = SpanAnnotator::default()
        .annotate("the quick fox", &["quick"])?
        .unwrap();
    assert_eq!(
        serde_json::to_string(&annotation)?,
        r##"["the ",{"text":"quick","label":"KEY","color":"#26aaef"}," fox"]"##
    );
    Ok(())
}

fn offsets_strategy() -> impl Strategy<Value = Vec<Offset>> {
    prop::collection::vec((0u32..50, 0u32..6), 1..20).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(begin, length)| Offset::new(begin, begin + length))
            .collect()
    })
}

proptest! {
    #[test]
    fn annotation_reconstructs_text(
        text in "[aé🙂 ]{0,40}",
        keywords in prop::collection::vec("[aé🙂 ]{1,3}", 1..4),
    ) {
        let annotation = SpanAnnotator::default().annotate(&text, &keywords).unwrap();
        match annotation {
            Some(segments) => {
                prop_assert_eq!(reconstruct(&segments), text.clone());
                for pair in segments.windows(2) {
                    prop_assert!(!(pair[0].is_annotated() && pair[1].is_annotated()));
                }
                for triple in segments.windows(3) {
                    if triple[0].is_annotated() && triple[2].is_annotated() {
                        prop_assert!(triple[1].text().chars().count() >= 2);
                    }
                }
            }
            None => {
                prop_assert!(!text.is_empty());
                prop_assert!(!keywords.iter().any(|keyword| text.contains(keyword.as_str())));
            }
        }
    }

    #[test]
    fn merged_spans_are_separated(offsets in offsets_strategy()) {
        let merged = merge(offsets).unwrap();
        for pair in merged.windows(2) {
            prop_assert!(pair[0].end + 1 < pair[1].begin);
        }
    }

    #[test]
    fn merge_is_idempotent(offsets in offsets_strategy()) {
        let merged = merge(offsets).unwrap();
        let merged_twice = merge(merged.clone()).unwrap();
        prop_assert_eq!(ranges(&merged), ranges(&merged_twice));
    }

    #[test]
    fn merge_ignores_input_order(offsets in offsets_strategy()) {
        let mut reversed = offsets.clone();
        reversed.reverse();
        prop_assert_eq!(ranges(&merge(offsets).unwrap()), ranges(&merge(reversed).unwrap()));
    }
}
