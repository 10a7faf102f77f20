//! Benchmarks for keyword routing.
//!
//! Classification runs on every send, so it should stay far below
//! anything a user could notice. Worst case is text that matches no rule
//! and scans every keyword before falling back.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use legalaid_chat::{CategoryClassifier, ScenarioCategoryMapper, TOPIC_CARDS};

/// A question of a few sentences. The keyword depends on `index`, and
/// every fourth question matches nothing.
fn generate_question(index: usize) -> String {
    let subject = match index % 4 {
        0 => "my landlord",
        1 => "the job I had",
        2 => "a refund for the blender",
        _ => "the custody arrangement",
    };

    format!(
        "Hello, I need some advice about {subject}. It started about three \
         months ago and I have tried to sort it out myself by phone and in \
         writing, but nobody has given me a clear answer. I kept copies of \
         everything. What are my options and what should I do first? \
         Reference {index}."
    )
}

fn bench_classify(c: &mut Criterion) {
    let classifier = CategoryClassifier::new();
    let questions: Vec<String> = (0..1000).map(generate_question).collect();
    let unmatched: Vec<&String> = questions.iter().skip(3).step_by(4).collect();

    let mut group = c.benchmark_group("classifier");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("mixed_questions", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let category = classifier.classify(black_box(&questions[idx % questions.len()]));
            idx += 1;
            category
        });
    });

    // Falls through every rule to the default.
    group.bench_function("unmatched_question", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let category = classifier.classify(black_box(unmatched[idx % unmatched.len()]));
            idx += 1;
            category
        });
    });

    group.bench_function("card_titles", |b| {
        let mapper = ScenarioCategoryMapper::new();
        b.iter(|| {
            TOPIC_CARDS
                .iter()
                .map(|card| mapper.map_title(black_box(card.title)))
                .collect::<Vec<_>>()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
