#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use nlp_dashboard::pipelines::annotation::{locate, merge, SpanAnnotator};
use nlp_dashboard::pipelines::keywords_extraction::KeywordExtractionModel;
use rust_tokenizers::Offset;

const PARAGRAPH: &str = "Rust is a multi-paradigm, general-purpose programming language. \
Rust emphasizes performance, type safety, and concurrency. Rust enforces memory safety, that \
is, that all references point to valid memory, without requiring the use of a garbage \
collector or reference counting present in other memory-safe languages. ";

fn create_document(num_paragraphs: usize) -> String {
    PARAGRAPH.repeat(num_paragraphs)
}

fn bench_annotation(c: &mut Criterion) {
    //    Define input
    let document = create_document(200);
    let keywords = ["Rust", "memory safety", "memory", "safety", "type safety", "garbage"];
    let annotator = SpanAnnotator::default();
    let occurrences = locate(&document, &keywords);
    let chained = (0..10_000u32)
        .rev()
        .map(|position| Offset::new(position * 3, position * 3 + 2))
        .collect::<Vec<Offset>>();

    c.bench_function("Locate keywords", |b| {
        b.iter(|| locate(black_box(&document), black_box(&keywords)))
    });
    c.bench_function("Merge occurrences", |b| {
        b.iter(|| merge(black_box(occurrences.clone())))
    });
    c.bench_function("Merge chained ranges", |b| {
        b.iter(|| merge(black_box(chained.clone())))
    });
    c.bench_function("Annotate document", |b| {
        b.iter(|| annotator.annotate(black_box(&document), black_box(&keywords)))
    });
}

fn bench_keyword_extraction(c: &mut Criterion) {
    let model = KeywordExtractionModel::new(Default::default()).unwrap();
    let document = create_document(20);

    c.bench_function("Generate keywords", |b| {
        b.iter(|| model.generate(black_box(&document), 5))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_annotation, bench_keyword_extraction
}

criterion_main!(benches);
